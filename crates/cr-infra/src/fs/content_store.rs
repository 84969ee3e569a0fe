use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cr_core::clipboard::{ClipFormat, ClipboardSnapshot, StoredContent};
use cr_core::ids::ClipId;
use cr_core::ports::{ContentCodecPort, ThumbnailGeneratorPort};
use tokio::fs;
use tracing::{debug, info, warn};

use super::atomic::{atomic_write, read_optional, remove_if_exists};
use crate::codec::blob;

const BLOB_EXT: &str = ".data";
const THUMB_SUFFIX: &str = "_thumb.png";
const TMP_EXT: &str = ".tmp";

/// Stores one `<id>.data` blob and, for image-primary snapshots, one
/// `<id>_thumb.png` preview per record in a flat directory.
pub struct FsContentStore {
    dir: PathBuf,
    thumbnails: Arc<dyn ThumbnailGeneratorPort>,
}

impl FsContentStore {
    pub fn new(dir: impl Into<PathBuf>, thumbnails: Arc<dyn ThumbnailGeneratorPort>) -> Self {
        Self {
            dir: dir.into(),
            thumbnails,
        }
    }

    pub fn blob_path(&self, id: &ClipId) -> PathBuf {
        self.dir.join(format!("{id}{BLOB_EXT}"))
    }

    pub fn thumbnail_path(&self, id: &ClipId) -> PathBuf {
        self.dir.join(format!("{id}{THUMB_SUFFIX}"))
    }

    async fn write_thumbnail(&self, id: &ClipId, image: &[u8]) -> Option<PathBuf> {
        let thumbnail = match self.thumbnails.generate_thumbnail(image).await {
            Ok(t) => t,
            Err(err) => {
                warn!(record_id = %id, error = %err, "Thumbnail generation failed");
                return None;
            }
        };

        let path = self.thumbnail_path(id);
        match atomic_write(&path, &thumbnail.thumbnail_bytes).await {
            Ok(()) => Some(path),
            Err(err) => {
                warn!(record_id = %id, error = %err, "Thumbnail write failed");
                None
            }
        }
    }
}

/// Record id owning a file in the content directory, if the name is ours.
fn owner_of(file_name: &str) -> Option<&str> {
    let name = file_name.strip_suffix(TMP_EXT).unwrap_or(file_name);
    name.strip_suffix(THUMB_SUFFIX)
        .or_else(|| name.strip_suffix(BLOB_EXT))
}

#[async_trait]
impl ContentCodecPort for FsContentStore {
    async fn persist(&self, id: &ClipId, snapshot: &ClipboardSnapshot) -> Result<StoredContent> {
        let blob_path = self.blob_path(id);
        let encoded = blob::encode(snapshot);
        atomic_write(&blob_path, &encoded)
            .await
            .with_context(|| format!("persist blob for record {id}"))?;

        let thumbnail_path = match (&snapshot.image, snapshot.primary_type()) {
            (Some(image), ClipFormat::Image) => self.write_thumbnail(id, image).await,
            _ => None,
        };

        debug!(
            record_id = %id,
            blob_bytes = encoded.len(),
            has_thumbnail = thumbnail_path.is_some(),
            "Persisted clip content"
        );

        Ok(StoredContent {
            blob_path,
            thumbnail_path,
        })
    }

    async fn load(&self, blob_path: &Path) -> Option<ClipboardSnapshot> {
        let bytes = match read_optional(blob_path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(path = %blob_path.display(), "Blob file missing");
                return None;
            }
            Err(err) => {
                warn!(path = %blob_path.display(), error = %err, "Blob file unreadable");
                return None;
            }
        };

        match blob::decode(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(path = %blob_path.display(), error = %err, "Blob file corrupt, skipping");
                None
            }
        }
    }

    async fn remove(&self, content: &StoredContent) -> Result<()> {
        remove_if_exists(&content.blob_path).await?;
        if let Some(thumb) = &content.thumbnail_path {
            remove_if_exists(thumb).await?;
        }
        Ok(())
    }

    async fn locate(&self, id: &ClipId) -> StoredContent {
        let thumb = self.thumbnail_path(id);
        let thumbnail_path = match fs::try_exists(&thumb).await {
            Ok(true) => Some(thumb),
            _ => None,
        };
        StoredContent {
            blob_path: self.blob_path(id),
            thumbnail_path,
        }
    }

    async fn sweep_orphans(&self, keep: &HashSet<ClipId>) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("list content dir failed: {}", self.dir.display()))
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(owner) = owner_of(name) else {
                continue;
            };
            let is_temp = name.ends_with(TMP_EXT);
            if !is_temp && keep.contains(&ClipId::from(owner)) {
                continue;
            }
            if remove_if_exists(&entry.path()).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, dir = %self.dir.display(), "Removed orphaned content files");
        }
        Ok(removed)
    }
}
