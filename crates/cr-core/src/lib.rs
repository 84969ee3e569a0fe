//! # cr-core
//!
//! Core domain models and ports for ClipRecall.
//!
//! This crate contains pure domain logic without any infrastructure dependencies.

pub mod app_dirs;
pub mod clipboard;
pub mod events;
pub mod ids;
pub mod ports;
pub mod settings;
pub mod snippet;

pub use clipboard::{ClipFormat, ClipRecord, ClipboardSnapshot, ContentHash};
pub use events::CoreEvent;
pub use ids::{ClipId, FolderId, SnippetId};
