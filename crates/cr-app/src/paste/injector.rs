use std::sync::Arc;
use std::time::Duration;

use cr_core::clipboard::{ClipFormat, ClipboardSnapshot};
use cr_core::events::CoreEvent;
use cr_core::ids::ClipId;
use cr_core::ports::{FormatPayload, ManualPasteNotifierPort, SystemClipboardPort};
use cr_core::settings::PasteSettings;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use super::strategy::{PasteStrategy, StrategyOutcome};

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("another paste is in progress")]
    Busy,

    #[error("record not found: {0}")]
    RecordNotFound(ClipId),

    #[error("content of record {0} is unavailable")]
    ContentUnavailable(ClipId),

    #[error("nothing to paste")]
    NothingToPaste,

    #[error("failed to stage clipboard: {0}")]
    Staging(String),

    #[error("clipboard verification failed for {0}")]
    VerificationFailed(ClipFormat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    pub outcome: StrategyOutcome,
}

/// What happened during one paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteReport {
    pub attempts: Vec<StrategyAttempt>,
    /// First strategy that issued the command, if any.
    pub delivered_by: Option<&'static str>,
    /// The chain was exhausted and the user was asked to paste by hand.
    pub manual_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectorTiming {
    pub settle: Duration,
    pub inter_strategy: Duration,
}

impl From<&PasteSettings> for InjectorTiming {
    fn from(settings: &PasteSettings) -> Self {
        Self {
            settle: Duration::from_millis(settings.settle_delay_ms),
            inter_strategy: Duration::from_millis(settings.inter_strategy_delay_ms),
        }
    }
}

/// Stages content on the clipboard and delivers a paste command through an
/// ordered strategy chain, ending in a manual-paste notification.
///
/// 将内容写入剪贴板，并按顺序尝试各粘贴策略；
/// 全部失败时提示用户手动粘贴。
///
/// One paste runs at a time; a concurrent call fails with [`PasteError::Busy`].
pub struct PasteInjector {
    clipboard: Arc<dyn SystemClipboardPort>,
    strategies: Vec<Box<dyn PasteStrategy>>,
    notifier: Arc<dyn ManualPasteNotifierPort>,
    events: broadcast::Sender<CoreEvent>,
    timing: InjectorTiming,
    in_flight: Mutex<()>,
}

impl PasteInjector {
    pub fn new(
        clipboard: Arc<dyn SystemClipboardPort>,
        strategies: Vec<Box<dyn PasteStrategy>>,
        notifier: Arc<dyn ManualPasteNotifierPort>,
        events: broadcast::Sender<CoreEvent>,
        timing: InjectorTiming,
    ) -> Self {
        Self {
            clipboard,
            strategies,
            notifier,
            events,
            timing,
            in_flight: Mutex::new(()),
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether a paste currently holds the in-flight slot.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    #[tracing::instrument(
        name = "paste.inject",
        skip(self, snapshot),
        fields(primary_type = %snapshot.primary_type())
    )]
    pub async fn paste(
        &self,
        title: &str,
        snapshot: &ClipboardSnapshot,
    ) -> Result<PasteReport, PasteError> {
        let _guard = self.in_flight.try_lock().map_err(|_| PasteError::Busy)?;

        if snapshot.is_empty() {
            return Err(PasteError::NothingToPaste);
        }

        self.stage(snapshot).await?;
        tokio::time::sleep(self.timing.settle).await;

        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut delivered_by = None;
        for (i, strategy) in self.strategies.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.timing.inter_strategy).await;
            }
            let outcome = strategy.attempt().await;
            debug!(strategy = strategy.name(), ?outcome, "Paste strategy finished");
            let attempted = outcome == StrategyOutcome::Attempted;
            attempts.push(StrategyAttempt {
                strategy: strategy.name(),
                outcome,
            });
            if attempted {
                delivered_by = Some(strategy.name());
                break;
            }
        }

        let manual_fallback = delivered_by.is_none();
        if manual_fallback {
            self.request_manual_paste(title).await;
        } else {
            info!(strategy = delivered_by, "Paste command issued");
        }

        Ok(PasteReport {
            attempts,
            delivered_by,
            manual_fallback,
        })
    }

    /// Write the snapshot and read its primary format back.
    async fn stage(&self, snapshot: &ClipboardSnapshot) -> Result<(), PasteError> {
        let clipboard = Arc::clone(&self.clipboard);
        let staged = snapshot.clone();
        let primary = snapshot.primary_type();

        let read_back = tokio::task::spawn_blocking(move || {
            clipboard.write_snapshot(&staged)?;
            clipboard.read_format(primary)
        })
        .await
        .map_err(|e| PasteError::Staging(e.to_string()))?
        .map_err(|e| PasteError::Staging(e.to_string()))?;

        if !matches_primary(snapshot, primary, read_back.as_ref()) {
            warn!(format = %primary, "Clipboard content differs from staged content");
            return Err(PasteError::VerificationFailed(primary));
        }
        debug!(format = %primary, "Clipboard staged and verified");
        Ok(())
    }

    async fn request_manual_paste(&self, title: &str) {
        warn!(title, "All paste strategies exhausted, falling back to manual paste");
        let _ = self.events.send(CoreEvent::ManualPasteRequired {
            title: title.to_string(),
        });

        let notifier = Arc::clone(&self.notifier);
        let title = title.to_string();
        let shown =
            tokio::task::spawn_blocking(move || notifier.notify_manual_paste(&title)).await;
        match shown {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "Failed to show manual paste notification"),
            Err(err) => warn!(error = %err, "Manual paste notification task failed"),
        }
    }
}

fn matches_primary(
    snapshot: &ClipboardSnapshot,
    primary: ClipFormat,
    read_back: Option<&FormatPayload>,
) -> bool {
    match (primary, read_back) {
        (ClipFormat::PlainText, Some(FormatPayload::Text(text))) => {
            snapshot.text.as_deref() == Some(text.as_str())
        }
        (ClipFormat::RichText, Some(FormatPayload::Text(rtf))) => {
            snapshot.rich_text.as_deref() == Some(rtf.as_str())
        }
        (ClipFormat::Pdf, Some(FormatPayload::Bytes(pdf))) => snapshot.pdf.as_ref() == Some(pdf),
        // Images are re-encoded by the OS; presence is all that can be checked.
        (ClipFormat::Image, Some(FormatPayload::Bytes(image))) => !image.is_empty(),
        (ClipFormat::FileList, Some(FormatPayload::Files(files))) => {
            let expected = snapshot.files.as_deref().unwrap_or_default();
            expected.len() == files.len()
                && expected
                    .iter()
                    .zip(files)
                    .all(|(a, b)| normalize_file(a) == normalize_file(b))
        }
        _ => false,
    }
}

fn normalize_file(path: &str) -> &str {
    path.strip_prefix("file://").unwrap_or(path)
}
