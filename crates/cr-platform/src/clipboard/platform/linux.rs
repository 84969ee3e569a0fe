use super::super::change_count::FingerprintChangeCounter;
use super::super::common::CommonClipboardImpl;
use anyhow::{anyhow, Result};
use clipboard_rs::ClipboardContext;
use cr_core::clipboard::{ChangeCount, ClipFormat, ClipboardSnapshot};
use cr_core::ports::{FormatPayload, SystemClipboardPort};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, debug_span};

/// X11/Wayland clipboard implementation using clipboard-rs.
///
/// Neither display server exposes a change counter, so one is emulated
/// from content fingerprints.
pub struct LinuxClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
    counter: FingerprintChangeCounter,
}

impl LinuxClipboard {
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new()
            .map_err(|e| anyhow!("Failed to create clipboard context: {}", e))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
            counter: FingerprintChangeCounter::new(),
        })
    }

    fn ctx(&self) -> Result<MutexGuard<'_, ClipboardContext>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("clipboard context lock poisoned"))
    }
}

impl SystemClipboardPort for LinuxClipboard {
    fn change_count(&self) -> Result<ChangeCount> {
        let fingerprint = CommonClipboardImpl::fingerprint(&*self.ctx()?)?;
        Ok(self.counter.observe(fingerprint))
    }

    fn available_formats(&self) -> Result<Vec<ClipFormat>> {
        CommonClipboardImpl::available_formats(&*self.ctx()?)
    }

    fn read_format(&self, format: ClipFormat) -> Result<Option<FormatPayload>> {
        let span = debug_span!("platform.linux.read_clipboard", format = %format);
        span.in_scope(|| CommonClipboardImpl::read_format(&*self.ctx()?, format))
    }

    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> Result<()> {
        let span = debug_span!(
            "platform.linux.write_clipboard",
            formats = snapshot.formats().len(),
        );
        span.in_scope(|| {
            CommonClipboardImpl::write_snapshot(&*self.ctx()?, snapshot)?;
            debug!("Wrote clipboard snapshot to system");
            Ok(())
        })
    }
}
