//! Snippet library service: in-memory folders persisted to the snippet file.

use std::sync::Arc;

use cr_core::events::CoreEvent;
use cr_core::ids::{FolderId, SnippetId};
use cr_core::ports::SnippetRepositoryPort;
use cr_core::snippet::{Snippet, SnippetError, SnippetFolder, SnippetLibrary};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SnippetServiceError {
    #[error(transparent)]
    Library(#[from] SnippetError),

    #[error("failed to save snippets: {0}")]
    Persist(#[source] anyhow::Error),
}

/// 片段库服务。每次修改都会写回文件并广播 `SnippetsChanged`。
pub struct SnippetService {
    repo: Arc<dyn SnippetRepositoryPort>,
    library: Mutex<SnippetLibrary>,
    events: broadcast::Sender<CoreEvent>,
}

impl SnippetService {
    pub fn new(repo: Arc<dyn SnippetRepositoryPort>, events: broadcast::Sender<CoreEvent>) -> Self {
        Self {
            repo,
            library: Mutex::new(SnippetLibrary::with_default_folder()),
            events,
        }
    }

    /// Read the snippet file. An unreadable file leaves the default library.
    pub async fn load(&self) {
        let mut library = match self.repo.load().await {
            Ok(library) => library,
            Err(err) => {
                warn!(error = %err, "Snippet file unreadable, using default folder");
                SnippetLibrary::default()
            }
        };
        library.normalize();
        info!(folders = library.folders.len(), "Loaded snippets");
        *self.library.lock().await = library;
    }

    pub async fn folders(&self) -> Vec<SnippetFolder> {
        self.library.lock().await.folders.clone()
    }

    pub async fn snippet(&self, id: &SnippetId) -> Option<Snippet> {
        self.library.lock().await.snippet(id).cloned()
    }

    pub async fn enabled_snippets(&self) -> Vec<Snippet> {
        self.library.lock().await.enabled_snippets()
    }

    pub async fn create_folder(&self, title: &str) -> Result<FolderId, SnippetServiceError> {
        self.mutate(|lib| Ok(lib.create_folder(title))).await
    }

    pub async fn rename_folder(
        &self,
        id: &FolderId,
        title: &str,
    ) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.rename_folder(id, title)).await
    }

    pub async fn set_folder_enabled(
        &self,
        id: &FolderId,
        enabled: bool,
    ) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.set_folder_enabled(id, enabled)).await
    }

    pub async fn delete_folder(&self, id: &FolderId) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.delete_folder(id).map(|_| ())).await
    }

    pub async fn add_snippet(
        &self,
        folder: &FolderId,
        title: &str,
        content: &str,
    ) -> Result<SnippetId, SnippetServiceError> {
        self.mutate(|lib| lib.add_snippet(folder, title, content)).await
    }

    pub async fn update_snippet(
        &self,
        id: &SnippetId,
        title: &str,
        content: &str,
    ) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.update_snippet(id, title, content)).await
    }

    pub async fn set_snippet_enabled(
        &self,
        id: &SnippetId,
        enabled: bool,
    ) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.set_snippet_enabled(id, enabled)).await
    }

    pub async fn delete_snippet(&self, id: &SnippetId) -> Result<(), SnippetServiceError> {
        self.mutate(|lib| lib.delete_snippet(id).map(|_| ())).await
    }

    /// Apply `op` to a copy; the copy replaces the library only once saved.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut SnippetLibrary) -> Result<T, SnippetError>,
    ) -> Result<T, SnippetServiceError> {
        let mut library = self.library.lock().await;
        let mut next = library.clone();
        let value = op(&mut next)?;
        self.repo
            .save(&next)
            .await
            .map_err(SnippetServiceError::Persist)?;
        *library = next;
        drop(library);

        let _ = self.events.send(CoreEvent::SnippetsChanged);
        Ok(value)
    }
}
