//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. Adapters live in `cr-infra`
//! (filesystem, codec) and `cr-platform` (OS clipboard, input injection).

pub mod app_dirs;
mod clipboard;
mod clock;
mod content_codec;
pub mod errors;
mod index;
mod paste;
pub mod settings;
mod snippets;
mod thumbnail;
pub mod watcher_control;

pub use app_dirs::AppDirsPort;
pub use clipboard::{ForegroundAppPort, FormatPayload, SystemClipboardPort};
pub use clock::ClockPort;
pub use content_codec::ContentCodecPort;
pub use errors::AppDirsError;
pub use index::ClipIndexPort;
pub use paste::{
    ChordTiming, EventTap, KeyChordError, KeyChordPort, ManualPasteNotifierPort, ScriptPastePort,
};
pub use settings::{SettingsMigrationPort, SettingsPort};
pub use snippets::SnippetRepositoryPort;
pub use thumbnail::{GeneratedThumbnail, ThumbnailGeneratorPort};
pub use watcher_control::{WatcherControlError, WatcherControlPort};
