use super::super::common::CommonClipboardImpl;
use anyhow::{anyhow, Result};
use clipboard_rs::ClipboardContext;
use cr_core::clipboard::{ChangeCount, ClipFormat, ClipboardSnapshot};
use cr_core::ports::{FormatPayload, SystemClipboardPort};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, debug_span};

/// Windows clipboard implementation using clipboard-rs, with the change
/// counter from `GetClipboardSequenceNumber`.
pub struct WindowsClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl WindowsClipboard {
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

impl SystemClipboardPort for WindowsClipboard {
    fn change_count(&self) -> Result<ChangeCount> {
        // SAFETY: no arguments, no clipboard ownership required.
        let sequence = unsafe { winapi::um::winuser::GetClipboardSequenceNumber() };
        Ok(ChangeCount(u64::from(sequence)))
    }

    fn available_formats(&self) -> Result<Vec<ClipFormat>> {
        CommonClipboardImpl::available_formats(&*self.ctx()?)
    }

    fn read_format(&self, format: ClipFormat) -> Result<Option<FormatPayload>> {
        let span = debug_span!("platform.windows.read_clipboard", format = %format);
        span.in_scope(|| CommonClipboardImpl::read_format(&*self.ctx()?, format))
    }

    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> Result<()> {
        let span = debug_span!(
            "platform.windows.write_clipboard",
            formats = snapshot.formats().len(),
        );
        span.in_scope(|| {
            CommonClipboardImpl::write_snapshot(&*self.ctx()?, snapshot)?;
            debug!("Wrote clipboard snapshot to system");
            Ok(())
        })
    }
}
