//! # Engine Dependencies / 引擎依赖
//!
//! Parameter grouping for [`crate::ClipEngine::bootstrap`]. Not a builder:
//! every port is required and nothing has a default.
//! 仅用于参数打包，所有端口都是必需的。

use std::sync::Arc;

use cr_core::ports::*;

pub struct EngineDeps {
    // Clipboard / 剪贴板
    pub clipboard: Arc<dyn SystemClipboardPort>,
    pub foreground: Arc<dyn ForegroundAppPort>,

    // Storage / 存储
    pub codec: Arc<dyn ContentCodecPort>,
    pub index: Arc<dyn ClipIndexPort>,
    pub snippets: Arc<dyn SnippetRepositoryPort>,
    pub settings: Arc<dyn SettingsPort>,

    // Paste injection / 粘贴注入
    pub key_chord: Arc<dyn KeyChordPort>,
    pub script: Arc<dyn ScriptPastePort>,
    pub notifier: Arc<dyn ManualPasteNotifierPort>,

    // System / 系统
    pub clock: Arc<dyn ClockPort>,
}
