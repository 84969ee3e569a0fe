//! Change-counter polling that feeds new clipboard snapshots to the store.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use cr_core::clipboard::{
    capture_snapshot, CapturePolicy, ChangeCount, ClipRecord, ClipboardSnapshot,
};
use cr_core::ports::{
    ForegroundAppPort, SystemClipboardPort, WatcherControlError, WatcherControlPort,
};
use cr_core::settings::HistorySettings;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::store::ClipStore;

/// What the watcher filters on. Swapped atomically when settings change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchPolicy {
    pub excluded_application_identifiers: BTreeSet<String>,
    pub capture: CapturePolicy,
}

impl From<&HistorySettings> for WatchPolicy {
    fn from(history: &HistorySettings) -> Self {
        Self {
            excluded_application_identifiers: history.excluded_application_identifiers.clone(),
            capture: history.capture_policy(),
        }
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Counter equals the baseline.
    Unchanged,
    /// Counter moved but the foreground app is excluded. Baseline advanced.
    Excluded { app_id: String },
    /// Counter moved but no supported format was present.
    NothingToCapture,
    /// The store declined the snapshot: duplicate content or a blob that
    /// could not be written.
    NotRecorded,
    Recorded(ClipRecord),
    /// The change counter could not be read; baseline untouched.
    CounterUnavailable,
}

/// What one blocking read of the foreground app and clipboard produced.
enum Capture {
    Excluded(String),
    Snapshot(ClipboardSnapshot),
}

struct WatcherInner {
    clipboard: Arc<dyn SystemClipboardPort>,
    foreground: Arc<dyn ForegroundAppPort>,
    store: Arc<ClipStore>,
    policy: RwLock<WatchPolicy>,
    baseline: Mutex<Option<ChangeCount>>,
}

/// Two states: idle (no task) and monitoring (periodic task running).
///
/// 两种状态：空闲（无任务）与监控中（周期任务运行）。
///
/// Each tick runs to completion before the next one is scheduled; ticks that
/// fall due meanwhile are skipped. Stopping is only observed between ticks,
/// so a change being recorded is never cut off halfway.
pub struct PasteboardWatcher {
    inner: Arc<WatcherInner>,
    task: Mutex<Option<PollLoop>>,
}

/// The running poll task and the switch that ends it.
struct PollLoop {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl PollLoop {
    fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl PasteboardWatcher {
    pub fn new(
        clipboard: Arc<dyn SystemClipboardPort>,
        foreground: Arc<dyn ForegroundAppPort>,
        store: Arc<ClipStore>,
        policy: WatchPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                clipboard,
                foreground,
                store,
                policy: RwLock::new(policy),
                baseline: Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn set_policy(&self, policy: WatchPolicy) {
        match self.inner.policy.write() {
            Ok(mut guard) => *guard = policy,
            Err(poisoned) => *poisoned.into_inner() = policy,
        }
    }

    pub fn baseline(&self) -> Option<ChangeCount> {
        self.inner.baseline_value()
    }

    /// Record the current change counter as the baseline.
    pub fn record_baseline(&self) -> Result<ChangeCount, WatcherControlError> {
        let current = self
            .inner
            .clipboard
            .change_count()
            .map_err(|e| WatcherControlError::BaselineUnavailable(e.to_string()))?;
        self.inner.set_baseline(current);
        Ok(current)
    }

    /// Run one poll now.
    pub async fn tick(&self) -> TickOutcome {
        self.inner.tick().await
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<PollLoop>> {
        match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for PasteboardWatcher {
    /// Signals only. The loop finishes its current tick and exits on its own.
    fn drop(&mut self) {
        if let Some(poll) = self.lock_task().take() {
            let _ = poll.shutdown.send(true);
        }
    }
}

#[async_trait]
impl WatcherControlPort for PasteboardWatcher {
    async fn start_watcher(&self, interval: Duration) -> Result<(), WatcherControlError> {
        if interval.is_zero() {
            return Err(WatcherControlError::InvalidInterval);
        }

        let mut task = self.lock_task();
        if task.as_ref().is_some_and(PollLoop::is_running) {
            debug!("Watcher already monitoring");
            return Ok(());
        }

        let baseline = self.record_baseline()?;
        let inner = Arc::clone(&self.inner);
        let (shutdown, mut stop_requested) = watch::channel(false);
        let handle = tokio::spawn(
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first tick completes immediately.
                ticker.tick().await;
                loop {
                    // A dropped sender ends the loop too.
                    tokio::select! {
                        biased;
                        _ = stop_requested.changed() => break,
                        _ = ticker.tick() => {}
                    }
                    inner.tick().await;
                }
                debug!("Poll loop exited");
            }
            .instrument(info_span!("watcher.poll_loop")),
        );
        *task = Some(PollLoop { handle, shutdown });

        info!(
            interval_ms = interval.as_millis() as u64,
            baseline = %baseline,
            "Clipboard monitoring started"
        );
        Ok(())
    }

    /// Waits for an in-flight tick to finish before returning.
    async fn stop_watcher(&self) -> Result<(), WatcherControlError> {
        let running = self.lock_task().take();
        let Some(poll) = running else {
            return Ok(());
        };
        let _ = poll.shutdown.send(true);
        if let Err(err) = poll.handle.await {
            warn!(error = %err, "Poll loop ended abnormally");
        }
        info!("Clipboard monitoring stopped");
        Ok(())
    }

    fn is_monitoring(&self) -> bool {
        self.lock_task().as_ref().is_some_and(PollLoop::is_running)
    }
}

impl WatcherInner {
    fn baseline_value(&self) -> Option<ChangeCount> {
        match self.baseline.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_baseline(&self, value: ChangeCount) {
        match self.baseline.lock() {
            Ok(mut guard) => *guard = Some(value),
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }

    fn policy(&self) -> WatchPolicy {
        match self.policy.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn tick(&self) -> TickOutcome {
        // Counter reads and capture can block (Linux fingerprints the whole
        // clipboard), so both run off the async workers.
        let clipboard = Arc::clone(&self.clipboard);
        let current = match tokio::task::spawn_blocking(move || clipboard.change_count()).await {
            Ok(Ok(count)) => count,
            Ok(Err(err)) => {
                warn!(error = %err, "Failed to read clipboard change counter");
                return TickOutcome::CounterUnavailable;
            }
            Err(err) => {
                warn!(error = %err, "Change counter task failed");
                return TickOutcome::CounterUnavailable;
            }
        };

        if self.baseline_value() == Some(current) {
            return TickOutcome::Unchanged;
        }
        // Advance first so an excluded or failed capture is not retried.
        self.set_baseline(current);
        debug!(change_count = %current, "Clipboard change detected");

        let policy = self.policy();
        let clipboard = Arc::clone(&self.clipboard);
        let foreground = Arc::clone(&self.foreground);
        let captured = tokio::task::spawn_blocking(move || {
            if let Some(app_id) = foreground.frontmost_app_id() {
                if policy.excluded_application_identifiers.contains(&app_id) {
                    return Capture::Excluded(app_id);
                }
            }
            Capture::Snapshot(capture_snapshot(clipboard.as_ref(), &policy.capture))
        })
        .await;

        let snapshot = match captured {
            Ok(Capture::Snapshot(snapshot)) => snapshot,
            Ok(Capture::Excluded(app_id)) => {
                debug!(app_id = %app_id, "Change from excluded application, ignoring");
                return TickOutcome::Excluded { app_id };
            }
            Err(err) => {
                warn!(error = %err, "Clipboard capture task failed");
                return TickOutcome::NothingToCapture;
            }
        };

        if snapshot.is_empty() {
            return TickOutcome::NothingToCapture;
        }

        match self.store.record_change(&snapshot).await {
            Some(record) => TickOutcome::Recorded(record),
            None => TickOutcome::NotRecorded,
        }
    }
}
