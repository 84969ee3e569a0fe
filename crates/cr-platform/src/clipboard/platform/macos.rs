use super::super::common::CommonClipboardImpl;
use anyhow::{anyhow, Result};
use clipboard_rs::ClipboardContext;
use cr_core::clipboard::{ChangeCount, ClipFormat, ClipboardSnapshot};
use cr_core::ports::{FormatPayload, SystemClipboardPort};
use objc::runtime::Object;
use objc::{class, msg_send, sel, sel_impl};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, debug_span};

/// macOS clipboard implementation using clipboard-rs, with the change
/// counter read from `NSPasteboard`.
pub struct MacOSClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl MacOSClipboard {
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new()
            .map_err(|e| anyhow!("Failed to create clipboard context: {}", e))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
        })
    }

    fn ctx(&self) -> Result<MutexGuard<'_, ClipboardContext>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("clipboard context lock poisoned"))
    }
}

impl SystemClipboardPort for MacOSClipboard {
    fn change_count(&self) -> Result<ChangeCount> {
        // SAFETY: generalPasteboard is a process-wide singleton and
        // changeCount is a plain NSInteger getter.
        let count: isize = unsafe {
            let pasteboard: *mut Object = msg_send![class!(NSPasteboard), generalPasteboard];
            if pasteboard.is_null() {
                return Err(anyhow!("NSPasteboard unavailable"));
            }
            msg_send![pasteboard, changeCount]
        };
        Ok(ChangeCount(count as u64))
    }

    fn available_formats(&self) -> Result<Vec<ClipFormat>> {
        CommonClipboardImpl::available_formats(&*self.ctx()?)
    }

    fn read_format(&self, format: ClipFormat) -> Result<Option<FormatPayload>> {
        let span = debug_span!("platform.macos.read_clipboard", format = %format);
        span.in_scope(|| CommonClipboardImpl::read_format(&*self.ctx()?, format))
    }

    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> Result<()> {
        let span = debug_span!(
            "platform.macos.write_clipboard",
            formats = snapshot.formats().len(),
        );
        span.in_scope(|| {
            CommonClipboardImpl::write_snapshot(&*self.ctx()?, snapshot)?;
            debug!("Wrote clipboard snapshot to system");
            Ok(())
        })
    }
}
