//! Paste through an automation facility: AppleScript via `osascript` on
//! macOS (gated by the accessibility grant), `xdotool` on Linux.

use anyhow::{bail, Context, Result};
use cr_core::ports::ScriptPastePort;
use std::process::Command;
use tracing::debug;

fn run(program: &str, args: &[&str]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("spawn {program} failed"))?;
    if !output.status.success() {
        bail!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[cfg(target_os = "macos")]
pub struct SystemScriptPaste;

#[cfg(target_os = "macos")]
impl ScriptPastePort for SystemScriptPaste {
    fn has_permission(&self) -> bool {
        #[link(name = "ApplicationServices", kind = "framework")]
        extern "C" {
            fn AXIsProcessTrusted() -> bool;
        }
        // SAFETY: argument-less query of the process's accessibility state.
        unsafe { AXIsProcessTrusted() }
    }

    fn run_paste(&self) -> Result<()> {
        run(
            "osascript",
            &[
                "-e",
                r#"tell application "System Events" to keystroke "v" using command down"#,
            ],
        )?;
        debug!("Pasted via System Events");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
pub struct SystemScriptPaste;

#[cfg(target_os = "linux")]
impl ScriptPastePort for SystemScriptPaste {
    fn has_permission(&self) -> bool {
        Command::new("xdotool")
            .arg("version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn run_paste(&self) -> Result<()> {
        run("xdotool", &["key", "--clearmodifiers", "ctrl+v"])?;
        debug!("Pasted via xdotool");
        Ok(())
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub struct SystemScriptPaste;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl ScriptPastePort for SystemScriptPaste {
    fn has_permission(&self) -> bool {
        false
    }

    fn run_paste(&self) -> Result<()> {
        bail!("scripted paste is not available on this platform")
    }
}
