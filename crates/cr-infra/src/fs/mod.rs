pub mod atomic;
pub mod content_store;

pub use content_store::FsContentStore;
