mod change_count;
mod common;
pub mod platform;

pub use change_count::FingerprintChangeCounter;
pub use common::{CommonClipboardImpl, PDF_FORMAT};
#[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
pub use platform::LocalClipboard;
