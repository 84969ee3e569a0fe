use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClipFormat, ClipboardSnapshot, ContentHash};
use crate::ids::ClipId;

const TITLE_MAX_CHARS: usize = 20;
const ELLIPSIS: &str = "...";

/// Files backing one record on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub blob_path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
}

/// A persisted, deduplicated history entry.
///
/// 一条已持久化、已去重的剪贴板历史记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRecord {
    pub id: ClipId,
    /// Derived once at creation, never recomputed from the blob.
    pub title: String,
    pub content_hash: ContentHash,
    pub primary_type: ClipFormat,
    pub created_at: DateTime<Utc>,
    pub blob_path: PathBuf,
    /// Present only for image-primary records.
    pub thumbnail_path: Option<PathBuf>,
    pub is_color_reference: bool,
}

impl ClipRecord {
    pub fn from_snapshot(
        id: ClipId,
        snapshot: &ClipboardSnapshot,
        created_at: DateTime<Utc>,
        stored: StoredContent,
    ) -> Self {
        let primary_type = snapshot.primary_type();
        Self {
            id,
            title: derive_title(snapshot),
            content_hash: snapshot.content_hash(),
            primary_type,
            created_at,
            blob_path: stored.blob_path,
            thumbnail_path: stored
                .thumbnail_path
                .filter(|_| primary_type == ClipFormat::Image),
            is_color_reference: snapshot.text.as_deref().is_some_and(is_color_code),
        }
    }

    pub fn stored_content(&self) -> StoredContent {
        StoredContent {
            blob_path: self.blob_path.clone(),
            thumbnail_path: self.thumbnail_path.clone(),
        }
    }

    pub fn index_entry(&self) -> ClipIndexEntry {
        ClipIndexEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            content_hash: self.content_hash.clone(),
            primary_type: self.primary_type,
            created_at: self.created_at,
            is_color_reference: self.is_color_reference,
        }
    }

    /// Title shortened for menu display, counted in characters.
    pub fn display_title(&self, max_len: usize) -> String {
        truncate_chars(&self.title, max_len)
    }
}

/// Record metadata as written to the index file. Carries no payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipIndexEntry {
    pub id: ClipId,
    pub title: String,
    pub content_hash: ContentHash,
    pub primary_type: ClipFormat,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_color_reference: bool,
}

/// First line of text as-is, else "Image", else the first file name,
/// else a generic label. An empty first line counts as no text.
pub fn derive_title(snapshot: &ClipboardSnapshot) -> String {
    if let Some(line) = snapshot
        .text
        .as_deref()
        .and_then(|t| t.split(['\n', '\r']).next())
        .filter(|l| !l.is_empty())
    {
        return truncate_chars(line, TITLE_MAX_CHARS);
    }

    if snapshot.image.is_some() {
        return "Image".to_string();
    }

    if let Some(files) = &snapshot.files {
        let name = files
            .first()
            .and_then(|f| Path::new(f).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "File".to_string());
        return truncate_chars(&name, TITLE_MAX_CHARS);
    }

    "Clipboard Item".to_string()
}

/// `#RRGGBB` after trimming.
pub fn is_color_code(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str(ELLIPSIS);
    out
}
