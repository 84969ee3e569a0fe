//! # Dependency Injection / 依赖注入模块
//!
//! The only place that depends on `cr-infra`, `cr-platform` and `cr-app`
//! at once. It assembles adapters into [`EngineDeps`] and makes no
//! decisions of its own.
//! 仅负责组装，不包含业务逻辑。

use std::sync::Arc;

use cr_app::{AppPaths, EngineDeps};
use cr_core::app_dirs::AppDirs;
use cr_core::ports::AppDirsPort;
use cr_infra::{
    FileClipIndexRepository, FileSettingsRepository, FileSnippetRepository, FsContentStore,
    ImageThumbnailGenerator, SystemClock,
};
use cr_platform::clipboard::LocalClipboard;
use cr_platform::{
    DirsAppDirsAdapter, SystemForegroundApp, SystemKeyChord, SystemNotifier, SystemScriptPaste,
};

pub type WiringResult<T> = Result<T, WiringError>;

/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("App directory resolution failed: {0}")]
    AppDirs(String),

    #[error("Clipboard initialization failed: {0}")]
    ClipboardInit(String),
}

/// Resolve the app data root and the file locations under it.
pub fn resolve_paths() -> WiringResult<(AppDirs, AppPaths)> {
    let dirs = DirsAppDirsAdapter::new()
        .get_app_dirs()
        .map_err(|e| WiringError::AppDirs(e.to_string()))?;
    let paths = AppPaths::from_app_dirs(&dirs);
    Ok((dirs, paths))
}

/// Build every adapter the engine needs.
pub fn wire_dependencies(paths: &AppPaths) -> WiringResult<EngineDeps> {
    let clipboard = LocalClipboard::new().map_err(|e| WiringError::ClipboardInit(e.to_string()))?;

    Ok(EngineDeps {
        clipboard: Arc::new(clipboard),
        foreground: Arc::new(SystemForegroundApp::new()),
        codec: Arc::new(FsContentStore::new(
            paths.content_dir.clone(),
            Arc::new(ImageThumbnailGenerator::default()),
        )),
        index: Arc::new(FileClipIndexRepository::new(paths.index_path.clone())),
        snippets: Arc::new(FileSnippetRepository::new(paths.snippets_path.clone())),
        settings: Arc::new(FileSettingsRepository::new(paths.settings_path.clone())),
        key_chord: Arc::new(SystemKeyChord::new()),
        script: Arc::new(SystemScriptPaste),
        notifier: Arc::new(SystemNotifier),
        clock: Arc::new(SystemClock),
    })
}
