use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cr_core::ports::SnippetRepositoryPort;
use cr_core::snippet::SnippetLibrary;

use crate::fs::atomic::{atomic_write, read_optional};

/// `snippets.json`: folder and snippet definitions.
pub struct FileSnippetRepository {
    path: PathBuf,
}

impl FileSnippetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnippetRepositoryPort for FileSnippetRepository {
    async fn load(&self) -> Result<SnippetLibrary> {
        let Some(bytes) = read_optional(&self.path).await? else {
            return Ok(SnippetLibrary::default());
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse snippets failed: {}", self.path.display()))
    }

    async fn save(&self, library: &SnippetLibrary) -> Result<()> {
        let content = serde_json::to_vec_pretty(library).context("serialize snippets failed")?;
        atomic_write(&self.path, &content).await
    }
}
