use std::time::Duration;

use async_trait::async_trait;

/// Port for controlling the clipboard watcher lifecycle.
///
/// 剪贴板监控器生命周期控制端口。
///
/// # Behavior / 行为
/// - `start_watcher()` is idempotent: a running watcher keeps its baseline.
/// - `stop_watcher()` is idempotent and returns once an in-flight poll has
///   finished.
///
/// - `start_watcher()` 应当具备幂等性。
/// - `stop_watcher()` 应当具备幂等性，并等待进行中的轮询结束后返回。
#[async_trait]
pub trait WatcherControlPort: Send + Sync {
    async fn start_watcher(&self, interval: Duration) -> Result<(), WatcherControlError>;

    async fn stop_watcher(&self) -> Result<(), WatcherControlError>;

    fn is_monitoring(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum WatcherControlError {
    #[error("failed to read clipboard change counter: {0}")]
    BaselineUnavailable(String),

    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}
