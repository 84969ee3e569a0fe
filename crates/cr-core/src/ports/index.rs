use anyhow::Result;
use async_trait::async_trait;

use crate::clipboard::ClipIndexEntry;

/// Lightweight record metadata persisted for fast restart.
#[async_trait]
pub trait ClipIndexPort: Send + Sync {
    /// Entries newest first. A missing index is an empty history.
    async fn load(&self) -> Result<Vec<ClipIndexEntry>>;

    async fn save(&self, entries: &[ClipIndexEntry]) -> Result<()>;
}
