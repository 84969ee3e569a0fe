use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::clipboard::{ClipboardSnapshot, StoredContent};
use crate::ids::ClipId;

/// Durable storage for snapshot payloads: one blob per record plus an
/// optional thumbnail.
///
/// 快照内容的持久化端口：每条记录一个 blob 文件，外加可选缩略图。
#[async_trait]
pub trait ContentCodecPort: Send + Sync {
    /// Write the blob (and a thumbnail for image-primary snapshots).
    async fn persist(&self, id: &ClipId, snapshot: &ClipboardSnapshot) -> Result<StoredContent>;

    /// Decode a blob. `None` if missing, truncated, corrupt or of an unknown
    /// version. Never an error.
    async fn load(&self, blob_path: &Path) -> Option<ClipboardSnapshot>;

    /// Delete the blob and thumbnail. Missing files are not an error.
    async fn remove(&self, content: &StoredContent) -> Result<()>;

    /// Where the files of `id` live; the thumbnail only if it exists.
    async fn locate(&self, id: &ClipId) -> StoredContent;

    /// Delete stored files that belong to none of `keep`. Returns the number
    /// of files removed.
    async fn sweep_orphans(&self, keep: &HashSet<ClipId>) -> Result<usize>;
}
