//! PasteInjector staging, verification and the strategy chain.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use cr_app::paste::{
    default_chain, InjectorTiming, PasteError, PasteInjector, PasteStrategy, StrategyOutcome,
};
use cr_core::clipboard::{ClipFormat, ClipboardSnapshot};
use cr_core::events::CoreEvent;
use cr_core::ports::{EventTap, KeyChordError};
use cr_core::settings::PasteSettings;
use mockall::predicate::eq;
use tokio::sync::broadcast;

const NO_DELAY: InjectorTiming = InjectorTiming {
    settle: Duration::ZERO,
    inter_strategy: Duration::ZERO,
};

fn script_without_permission() -> MockScript {
    let mut script = MockScript::new();
    script.expect_has_permission().return_const(false);
    script.expect_run_paste().never();
    script
}

fn injector(
    clipboard: Arc<FakeClipboard>,
    script: MockScript,
    chord: MockKeyChord,
    notifier: MockNotifier,
) -> (PasteInjector, broadcast::Receiver<CoreEvent>) {
    let (events, rx) = broadcast::channel(16);
    let strategies = default_chain(Arc::new(script), Arc::new(chord), &PasteSettings::default());
    let injector = PasteInjector::new(clipboard, strategies, Arc::new(notifier), events, NO_DELAY);
    (injector, rx)
}

#[tokio::test]
async fn scripted_paste_wins_when_permitted() {
    init_tracing();
    let clipboard = FakeClipboard::new();
    let mut script = MockScript::new();
    script.expect_has_permission().return_const(true);
    script.expect_run_paste().times(1).returning(|| Ok(()));
    let mut chord = MockKeyChord::new();
    chord.expect_post_paste_chord().never();
    let mut notifier = MockNotifier::new();
    notifier.expect_notify_manual_paste().never();

    let (injector, _rx) = injector(clipboard.clone(), script, chord, notifier);
    let report = injector
        .paste("Hello", &ClipboardSnapshot::from_text("Hello"))
        .await
        .unwrap();

    assert_eq!(report.delivered_by, Some("scripted"));
    assert_eq!(report.attempts.len(), 1);
    assert!(!report.manual_fallback);
    assert_eq!(clipboard.content(), ClipboardSnapshot::from_text("Hello"));
}

#[tokio::test]
async fn key_chord_at_primary_tap_follows_missing_permission() {
    let clipboard = FakeClipboard::new();
    let mut chord = MockKeyChord::new();
    chord
        .expect_post_paste_chord()
        .withf(|tap, _| *tap == EventTap::Hid)
        .times(1)
        .returning(|_, _| Ok(()));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify_manual_paste().never();

    let (injector, _rx) = injector(clipboard, script_without_permission(), chord, notifier);
    let report = injector
        .paste("x", &ClipboardSnapshot::from_text("x"))
        .await
        .unwrap();

    assert_eq!(report.delivered_by, Some("key_chord.primary"));
    assert!(matches!(
        report.attempts[0].outcome,
        StrategyOutcome::CouldNotAttempt(_)
    ));
    assert_eq!(report.attempts[1].outcome, StrategyOutcome::Attempted);
}

#[tokio::test]
async fn redundant_taps_count_if_any_tap_accepts() {
    let clipboard = FakeClipboard::new();
    let mut chord = MockKeyChord::new();
    chord
        .expect_post_paste_chord()
        .with(eq(EventTap::Hid), mockall::predicate::always())
        .returning(|tap, _| Err(KeyChordError::UnsupportedTap(tap)));
    chord
        .expect_post_paste_chord()
        .with(eq(EventTap::Session), mockall::predicate::always())
        .times(1)
        .returning(|_, _| Ok(()));
    chord
        .expect_post_paste_chord()
        .with(eq(EventTap::AnnotatedSession), mockall::predicate::always())
        .times(1)
        .returning(|tap, _| Err(KeyChordError::UnsupportedTap(tap)));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify_manual_paste().never();

    let (injector, _rx) = injector(clipboard, script_without_permission(), chord, notifier);
    let report = injector
        .paste("x", &ClipboardSnapshot::from_text("x"))
        .await
        .unwrap();

    assert_eq!(report.delivered_by, Some("key_chord.redundant"));
}

#[tokio::test]
async fn exhausted_chain_falls_back_to_manual_paste() {
    let clipboard = FakeClipboard::new();
    let mut chord = MockKeyChord::new();
    chord
        .expect_post_paste_chord()
        .returning(|_, _| Err(KeyChordError::EventConstruction("no event source".into())));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify_manual_paste()
        .with(eq("Invoice"))
        .times(1)
        .returning(|_| Ok(()));

    let (injector, mut rx) =
        injector(clipboard.clone(), script_without_permission(), chord, notifier);
    let report = injector
        .paste("Invoice", &ClipboardSnapshot::from_text("Invoice 42"))
        .await
        .unwrap();

    assert!(report.manual_fallback);
    assert_eq!(report.delivered_by, None);
    assert_eq!(
        report.attempts.iter().map(|a| a.strategy).collect::<Vec<_>>(),
        vec!["scripted", "key_chord.primary", "key_chord.redundant", "key_chord.slow"]
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        CoreEvent::ManualPasteRequired {
            title: "Invoice".into()
        }
    );
    // Content stays staged for the manual paste.
    assert_eq!(clipboard.content().text.as_deref(), Some("Invoice 42"));
}

#[tokio::test]
async fn failed_verification_aborts_before_any_strategy() {
    let clipboard = FakeClipboard::new();
    clipboard.overwrite_after_write(ClipboardSnapshot::from_text("someone else"));
    let mut script = MockScript::new();
    script.expect_has_permission().never();
    let mut chord = MockKeyChord::new();
    chord.expect_post_paste_chord().never();
    let mut notifier = MockNotifier::new();
    notifier.expect_notify_manual_paste().never();

    let (injector, _rx) = injector(clipboard, script, chord, notifier);
    let err = injector
        .paste("mine", &ClipboardSnapshot::from_text("mine"))
        .await
        .unwrap_err();

    assert!(matches!(err, PasteError::VerificationFailed(ClipFormat::PlainText)));
}

#[tokio::test]
async fn empty_snapshot_is_refused_without_touching_the_clipboard() {
    let clipboard = FakeClipboard::new();
    let (injector, _rx) = injector(
        clipboard.clone(),
        MockScript::new(),
        MockKeyChord::new(),
        MockNotifier::new(),
    );

    let err = injector.paste("", &ClipboardSnapshot::empty()).await.unwrap_err();

    assert!(matches!(err, PasteError::NothingToPaste));
    assert_eq!(clipboard.writes(), 0);
}

/// Strategy that holds the paste open until released.
struct Gate(Arc<tokio::sync::Notify>);

#[async_trait::async_trait]
impl PasteStrategy for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    async fn attempt(&self) -> StrategyOutcome {
        self.0.notified().await;
        StrategyOutcome::Attempted
    }
}

#[tokio::test]
async fn second_paste_while_one_is_in_flight_is_busy() {
    let clipboard = FakeClipboard::new();
    let gate = Arc::new(tokio::sync::Notify::new());
    let (events, _rx) = broadcast::channel(4);
    let injector = Arc::new(PasteInjector::new(
        clipboard,
        vec![Box::new(Gate(Arc::clone(&gate)))],
        Arc::new(MockNotifier::new()),
        events,
        NO_DELAY,
    ));

    let first = {
        let injector = Arc::clone(&injector);
        tokio::spawn(async move {
            injector
                .paste("first", &ClipboardSnapshot::from_text("first"))
                .await
        })
    };
    while !injector.is_busy() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let second = injector
        .paste("second", &ClipboardSnapshot::from_text("second"))
        .await;
    assert!(matches!(second, Err(PasteError::Busy)));

    gate.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.delivered_by, Some("gate"));
}
