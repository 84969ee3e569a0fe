use std::path::PathBuf;

use cr_core::app_dirs::AppDirs;

/// Concrete file locations under the app data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `<id>.data` blobs and `<id>_thumb.png` previews.
    pub content_dir: PathBuf,
    pub index_path: PathBuf,
    pub snippets_path: PathBuf,
    pub settings_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl AppPaths {
    pub fn from_app_dirs(dirs: &AppDirs) -> Self {
        Self {
            content_dir: dirs.app_data_root.join("content"),
            index_path: dirs.app_data_root.join("clips.json"),
            snippets_path: dirs.app_data_root.join("snippets.json"),
            settings_path: dirs.app_data_root.join("settings.json"),
            logs_dir: dirs.app_data_root.join("logs"),
        }
    }
}
