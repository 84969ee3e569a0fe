pub mod codec;
pub mod fs;
pub mod index;
pub mod settings;
pub mod snippets;
pub mod thumbnail;
pub mod time;

pub use fs::FsContentStore;
pub use index::FileClipIndexRepository;
pub use settings::FileSettingsRepository;
pub use snippets::FileSnippetRepository;
pub use thumbnail::ImageThumbnailGenerator;
pub use time::SystemClock;
