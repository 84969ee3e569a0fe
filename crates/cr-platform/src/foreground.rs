//! Identifier of the application that owns input focus, used for the
//! exclusion set. Bundle id on macOS, executable name on Windows, X11 window
//! class on Linux.

use cr_core::ports::ForegroundAppPort;
use tracing::trace;

pub struct SystemForegroundApp;

impl SystemForegroundApp {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemForegroundApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundAppPort for SystemForegroundApp {
    fn frontmost_app_id(&self) -> Option<String> {
        let id = frontmost_app_id();
        trace!(app_id = ?id, "Resolved foreground application");
        id
    }
}

#[cfg(target_os = "macos")]
fn frontmost_app_id() -> Option<String> {
    use cocoa::base::{id, nil};
    use cocoa::foundation::NSString;
    use objc::{class, msg_send, sel, sel_impl};

    // SAFETY: read-only getters on the shared workspace; every object is
    // checked for nil before use.
    unsafe {
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let front_app: id = msg_send![workspace, frontmostApplication];
        if front_app == nil {
            return None;
        }
        let bundle_id: id = msg_send![front_app, bundleIdentifier];
        if bundle_id == nil {
            return None;
        }
        let utf8 = NSString::UTF8String(bundle_id);
        if utf8.is_null() {
            return None;
        }
        Some(std::ffi::CStr::from_ptr(utf8).to_string_lossy().into_owned())
    }
}

#[cfg(target_os = "windows")]
fn frontmost_app_id() -> Option<String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::path::Path;
    use winapi::shared::minwindef::{DWORD, FALSE};
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winbase::QueryFullProcessImageNameW;
    use winapi::um::winnt::PROCESS_QUERY_LIMITED_INFORMATION;
    use winapi::um::winuser::{GetForegroundWindow, GetWindowThreadProcessId};

    // SAFETY: the process handle is closed on every path after it is opened;
    // the buffer length passed matches the buffer.
    unsafe {
        let hwnd = GetForegroundWindow();
        if hwnd.is_null() {
            return None;
        }
        let mut pid: DWORD = 0;
        GetWindowThreadProcessId(hwnd, &mut pid);
        if pid == 0 {
            return None;
        }
        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid);
        if process.is_null() {
            return None;
        }
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as DWORD;
        let ok = QueryFullProcessImageNameW(process, 0, buf.as_mut_ptr(), &mut len);
        CloseHandle(process);
        if ok == 0 {
            return None;
        }
        let full = OsString::from_wide(&buf[..len as usize]);
        Path::new(&full)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

#[cfg(target_os = "linux")]
fn frontmost_app_id() -> Option<String> {
    let output = std::process::Command::new("xdotool")
        .args(["getactivewindow", "getwindowclassname"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let class = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!class.is_empty()).then_some(class)
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
fn frontmost_app_id() -> Option<String> {
    None
}
