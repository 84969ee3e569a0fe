use std::sync::Arc;

use async_trait::async_trait;
use cr_core::ports::{ChordTiming, EventTap, KeyChordPort, ScriptPastePort};
use cr_core::settings::PasteSettings;
use tracing::debug;

/// Result of invoking one delivery strategy.
///
/// `Attempted` means the paste command was issued without error. Whether the
/// target application received it cannot be observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Attempted,
    CouldNotAttempt(String),
}

/// One way of delivering a paste command to the focused application.
#[async_trait]
pub trait PasteStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self) -> StrategyOutcome;
}

/// Paste via the automation facility. Skipped without the permission grant.
pub struct ScriptedPaste {
    script: Arc<dyn ScriptPastePort>,
}

impl ScriptedPaste {
    pub fn new(script: Arc<dyn ScriptPastePort>) -> Self {
        Self { script }
    }
}

#[async_trait]
impl PasteStrategy for ScriptedPaste {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn attempt(&self) -> StrategyOutcome {
        let script = Arc::clone(&self.script);
        let result = tokio::task::spawn_blocking(move || {
            if !script.has_permission() {
                return Err("automation permission not granted".to_string());
            }
            script.run_paste().map_err(|e| e.to_string())
        })
        .await;

        match result {
            Ok(Ok(())) => StrategyOutcome::Attempted,
            Ok(Err(reason)) => StrategyOutcome::CouldNotAttempt(reason),
            Err(join_err) => StrategyOutcome::CouldNotAttempt(join_err.to_string()),
        }
    }
}

/// Paste key chord posted at one or more event taps.
///
/// Counts as attempted when at least one tap accepted the events.
pub struct KeyChordPaste {
    name: &'static str,
    chord: Arc<dyn KeyChordPort>,
    taps: Vec<EventTap>,
    timing: ChordTiming,
}

impl KeyChordPaste {
    pub fn new(
        name: &'static str,
        chord: Arc<dyn KeyChordPort>,
        taps: Vec<EventTap>,
        timing: ChordTiming,
    ) -> Self {
        Self {
            name,
            chord,
            taps,
            timing,
        }
    }
}

#[async_trait]
impl PasteStrategy for KeyChordPaste {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self) -> StrategyOutcome {
        let chord = Arc::clone(&self.chord);
        let taps = self.taps.clone();
        let timing = self.timing;
        let name = self.name;

        let result = tokio::task::spawn_blocking(move || {
            let mut posted = 0usize;
            let mut failures = Vec::new();
            for tap in taps {
                match chord.post_paste_chord(tap, timing) {
                    Ok(()) => posted += 1,
                    Err(err) => {
                        debug!(strategy = name, ?tap, error = %err, "Key chord not posted");
                        failures.push(err.to_string());
                    }
                }
            }
            if posted > 0 {
                Ok(())
            } else {
                Err(failures.join("; "))
            }
        })
        .await;

        match result {
            Ok(Ok(())) => StrategyOutcome::Attempted,
            Ok(Err(reason)) => StrategyOutcome::CouldNotAttempt(reason),
            Err(join_err) => StrategyOutcome::CouldNotAttempt(join_err.to_string()),
        }
    }
}

/// Scripted paste, then the key chord at the primary tap, then redundantly at
/// every tap, then at the primary tap with slow timing.
pub fn default_chain(
    script: Arc<dyn ScriptPastePort>,
    chord: Arc<dyn KeyChordPort>,
    settings: &PasteSettings,
) -> Vec<Box<dyn PasteStrategy>> {
    let standard = ChordTiming::from_millis(settings.standard_chord_delay_ms);
    let slow = ChordTiming::from_millis(settings.slow_chord_delay_ms);

    vec![
        Box::new(ScriptedPaste::new(script)),
        Box::new(KeyChordPaste::new(
            "key_chord.primary",
            Arc::clone(&chord),
            vec![EventTap::Hid],
            standard,
        )),
        Box::new(KeyChordPaste::new(
            "key_chord.redundant",
            Arc::clone(&chord),
            vec![EventTap::Hid, EventTap::Session, EventTap::AnnotatedSession],
            standard,
        )),
        Box::new(KeyChordPaste::new(
            "key_chord.slow",
            chord,
            vec![EventTap::Hid],
            slow,
        )),
    ]
}
