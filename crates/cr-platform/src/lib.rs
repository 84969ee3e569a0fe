//! # cr-platform
//!
//! Platform-specific implementations for ClipRecall.
//!
//! Adapters for the ports in `cr-core` that talk to the operating system:
//! the system clipboard, the foreground application, synthetic input and
//! desktop notifications.

pub mod app_dirs;
pub mod clipboard;
pub mod foreground;
pub mod paste;

pub use app_dirs::DirsAppDirsAdapter;
pub use foreground::SystemForegroundApp;
pub use paste::{SystemKeyChord, SystemNotifier, SystemScriptPaste};
