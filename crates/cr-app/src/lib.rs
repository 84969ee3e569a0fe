//! # cr-app
//!
//! Application layer for ClipRecall: the history store, the pasteboard
//! watcher, paste injection and the snippet library, orchestrated through
//! ports defined in `cr-core`.

pub mod app_paths;
pub mod deps;
pub mod engine;
pub mod paste;
pub mod snippets;
pub mod store;
pub mod watcher;

pub use app_paths::AppPaths;
pub use deps::EngineDeps;
pub use engine::ClipEngine;
pub use paste::{PasteError, PasteInjector, PasteReport};
pub use snippets::{SnippetService, SnippetServiceError};
pub use store::ClipStore;
pub use watcher::{PasteboardWatcher, TickOutcome, WatchPolicy};
