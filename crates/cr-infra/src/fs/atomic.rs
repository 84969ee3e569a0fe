use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// Write `content` next to `path` and rename it into place, so readers see
/// either the old file or the complete new one.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create dir failed: {}", dir.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    fs::write(&tmp_path, content)
        .await
        .with_context(|| format!("write temp file failed: {}", tmp_path.display()))?;

    // TODO: Windows 上 rename 覆盖可能不一致；macOS/Linux OK。
    fs::rename(&tmp_path, path).await.with_context(|| {
        format!(
            "rename temp file to target failed: {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Read a file, mapping "not found" to `None`.
pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read failed: {}", path.display())),
    }
}

/// Delete a file, treating "not found" as success.
pub async fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("remove failed: {}", path.display())),
    }
}
