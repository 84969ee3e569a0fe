use anyhow::Result;

use crate::clipboard::{ChangeCount, ClipFormat, ClipboardSnapshot};

/// Raw value of a single clipboard format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatPayload {
    Text(String),
    Bytes(Vec<u8>),
    Files(Vec<String>),
}

/// System clipboard facility.
///
/// 系统剪贴板端口。
///
/// Reads are side effect free. `write_snapshot` replaces the whole clipboard.
pub trait SystemClipboardPort: Send + Sync {
    /// Opaque counter that differs whenever the clipboard contents changed.
    fn change_count(&self) -> Result<ChangeCount>;

    /// Supported formats the clipboard currently advertises.
    fn available_formats(&self) -> Result<Vec<ClipFormat>>;

    /// Read one format. `Ok(None)` when the format vanished between listing
    /// and reading.
    fn read_format(&self, format: ClipFormat) -> Result<Option<FormatPayload>>;

    /// Clear the clipboard and write every format present in `snapshot`.
    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> Result<()>;
}

/// Identifier of the application that currently has input focus.
pub trait ForegroundAppPort: Send + Sync {
    /// `None` when the platform cannot tell.
    fn frontmost_app_id(&self) -> Option<String>;
}
