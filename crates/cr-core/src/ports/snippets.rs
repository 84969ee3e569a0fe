use anyhow::Result;
use async_trait::async_trait;

use crate::snippet::SnippetLibrary;

#[async_trait]
pub trait SnippetRepositoryPort: Send + Sync {
    /// A missing file loads as an empty library.
    async fn load(&self) -> Result<SnippetLibrary>;
    async fn save(&self, library: &SnippetLibrary) -> Result<()>;
}
