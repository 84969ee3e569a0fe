use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cr_core::clipboard::ClipIndexEntry;
use cr_core::ports::ClipIndexPort;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fs::atomic::{atomic_write, read_optional};

pub const INDEX_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct IndexDocument<'a> {
    schema_version: u32,
    records: &'a [ClipIndexEntry],
}

/// Records stay untyped until each one is checked on its own.
#[derive(Debug, Deserialize)]
struct RawIndexDocument {
    #[serde(default)]
    schema_version: u32,
    records: Vec<serde_json::Value>,
}

/// `clips.json`: record metadata, newest first, no payload bytes.
pub struct FileClipIndexRepository {
    path: PathBuf,
}

impl FileClipIndexRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ClipIndexPort for FileClipIndexRepository {
    async fn load(&self) -> Result<Vec<ClipIndexEntry>> {
        let Some(bytes) = read_optional(&self.path).await? else {
            return Ok(Vec::new());
        };
        let document: RawIndexDocument = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse index failed: {}", self.path.display()))?;
        if document.schema_version > INDEX_SCHEMA_VERSION {
            warn!(
                schema_version = document.schema_version,
                "Index written by a newer version, reading known fields only"
            );
        }

        let total = document.records.len();
        let entries: Vec<ClipIndexEntry> = document
            .records
            .into_iter()
            .enumerate()
            .filter_map(|(position, raw)| match serde_json::from_value(raw) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(position, error = %err, "Skipping malformed index entry");
                    None
                }
            })
            .collect();
        if entries.len() != total {
            warn!(
                kept = entries.len(),
                dropped = total - entries.len(),
                "Index had malformed entries"
            );
        }
        Ok(entries)
    }

    async fn save(&self, entries: &[ClipIndexEntry]) -> Result<()> {
        let document = IndexDocument {
            schema_version: INDEX_SCHEMA_VERSION,
            records: entries,
        };
        let content = serde_json::to_vec_pretty(&document).context("serialize index failed")?;
        atomic_write(&self.path, &content).await
    }
}
