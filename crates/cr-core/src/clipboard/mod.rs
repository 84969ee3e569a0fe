//! Clipboard domain: formats, snapshots, records and capture.

mod capture;
mod change_count;
mod format;
mod hash;
mod record;
mod snapshot;

pub use capture::{capture_snapshot, CapturePolicy, MAX_IMAGE_BYTES};
pub use change_count::ChangeCount;
pub use format::ClipFormat;
pub use hash::{ContentHash, ContentHashParseError, HashAlgorithm};
pub use record::{derive_title, is_color_code, ClipIndexEntry, ClipRecord, StoredContent};
pub use snapshot::{frame_file_list, ClipboardSnapshot};
