//! Snippet folders: user-defined text fragments that can be pasted like
//! history records.

use serde::{Deserialize, Serialize};

use crate::ids::{FolderId, SnippetId};

pub const DEFAULT_FOLDER_TITLE: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    pub enabled: bool,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetFolder {
    pub id: FolderId,
    pub title: String,
    pub enabled: bool,
    pub index: usize,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

impl SnippetFolder {
    pub fn new(title: impl Into<String>, index: usize) -> Self {
        Self {
            id: FolderId::new(),
            title: title.into(),
            enabled: true,
            index,
            snippets: Vec::new(),
        }
    }

    fn reindex(&mut self) {
        self.snippets.sort_by_key(|s| s.index);
        for (i, snippet) in self.snippets.iter_mut().enumerate() {
            snippet.index = i;
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnippetError {
    #[error("snippet folder not found: {0}")]
    FolderNotFound(FolderId),

    #[error("snippet not found: {0}")]
    SnippetNotFound(SnippetId),
}

/// Every folder with its snippets, ordered by `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetLibrary {
    pub folders: Vec<SnippetFolder>,
}

impl SnippetLibrary {
    /// Library holding a single enabled `Default` folder.
    pub fn with_default_folder() -> Self {
        Self {
            folders: vec![SnippetFolder::new(DEFAULT_FOLDER_TITLE, 0)],
        }
    }

    /// Sort folders and snippets by index and make indices contiguous from 0.
    /// An empty library gets the default folder.
    pub fn normalize(&mut self) {
        if self.folders.is_empty() {
            *self = Self::with_default_folder();
            return;
        }
        self.folders.sort_by_key(|f| f.index);
        for (i, folder) in self.folders.iter_mut().enumerate() {
            folder.index = i;
            folder.reindex();
        }
    }

    pub fn folder(&self, id: &FolderId) -> Option<&SnippetFolder> {
        self.folders.iter().find(|f| &f.id == id)
    }

    fn folder_mut(&mut self, id: &FolderId) -> Result<&mut SnippetFolder, SnippetError> {
        self.folders
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| SnippetError::FolderNotFound(id.clone()))
    }

    fn snippet_mut(&mut self, id: &SnippetId) -> Result<&mut Snippet, SnippetError> {
        self.folders
            .iter_mut()
            .flat_map(|f| f.snippets.iter_mut())
            .find(|s| &s.id == id)
            .ok_or_else(|| SnippetError::SnippetNotFound(id.clone()))
    }

    pub fn snippet(&self, id: &SnippetId) -> Option<&Snippet> {
        self.folders
            .iter()
            .flat_map(|f| f.snippets.iter())
            .find(|s| &s.id == id)
    }

    pub fn create_folder(&mut self, title: impl Into<String>) -> FolderId {
        let folder = SnippetFolder::new(title, self.folders.len());
        let id = folder.id.clone();
        self.folders.push(folder);
        id
    }

    pub fn rename_folder(
        &mut self,
        id: &FolderId,
        title: impl Into<String>,
    ) -> Result<(), SnippetError> {
        self.folder_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_folder_enabled(&mut self, id: &FolderId, enabled: bool) -> Result<(), SnippetError> {
        self.folder_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn delete_folder(&mut self, id: &FolderId) -> Result<SnippetFolder, SnippetError> {
        let pos = self
            .folders
            .iter()
            .position(|f| &f.id == id)
            .ok_or_else(|| SnippetError::FolderNotFound(id.clone()))?;
        let removed = self.folders.remove(pos);
        self.normalize();
        Ok(removed)
    }

    pub fn add_snippet(
        &mut self,
        folder_id: &FolderId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<SnippetId, SnippetError> {
        let folder = self.folder_mut(folder_id)?;
        let snippet = Snippet {
            id: SnippetId::new(),
            title: title.into(),
            content: content.into(),
            enabled: true,
            index: folder.snippets.len(),
        };
        let id = snippet.id.clone();
        folder.snippets.push(snippet);
        Ok(id)
    }

    pub fn update_snippet(
        &mut self,
        id: &SnippetId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), SnippetError> {
        let snippet = self.snippet_mut(id)?;
        snippet.title = title.into();
        snippet.content = content.into();
        Ok(())
    }

    pub fn set_snippet_enabled(
        &mut self,
        id: &SnippetId,
        enabled: bool,
    ) -> Result<(), SnippetError> {
        self.snippet_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn delete_snippet(&mut self, id: &SnippetId) -> Result<Snippet, SnippetError> {
        for folder in &mut self.folders {
            if let Some(pos) = folder.snippets.iter().position(|s| &s.id == id) {
                let removed = folder.snippets.remove(pos);
                folder.reindex();
                return Ok(removed);
            }
        }
        Err(SnippetError::SnippetNotFound(id.clone()))
    }

    /// Enabled snippets of enabled folders, folder order first.
    pub fn enabled_snippets(&self) -> Vec<Snippet> {
        let mut folders: Vec<&SnippetFolder> = self.folders.iter().filter(|f| f.enabled).collect();
        folders.sort_by_key(|f| f.index);
        folders
            .into_iter()
            .flat_map(|f| {
                let mut snippets: Vec<&Snippet> = f.snippets.iter().filter(|s| s.enabled).collect();
                snippets.sort_by_key(|s| s.index);
                snippets.into_iter().cloned()
            })
            .collect()
    }
}
