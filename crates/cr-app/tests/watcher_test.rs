//! PasteboardWatcher change detection, exclusion and lifecycle.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use common::*;
use cr_app::{PasteboardWatcher, TickOutcome, WatchPolicy};
use cr_core::clipboard::{
    CapturePolicy, ChangeCount, ClipFormat, ClipboardSnapshot, MAX_IMAGE_BYTES,
};
use cr_core::ports::{
    ClipIndexPort, ForegroundAppPort, FormatPayload, SystemClipboardPort, WatcherControlError,
    WatcherControlPort,
};
use tokio::sync::mpsc as async_mpsc;

struct Rig {
    _dir: tempfile::TempDir,
    clipboard: Arc<FakeClipboard>,
    foreground: Arc<FakeForeground>,
    store: Arc<cr_app::ClipStore>,
    watcher: PasteboardWatcher,
}

fn rig(policy: WatchPolicy) -> Rig {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clipboard = FakeClipboard::new();
    let foreground = FakeForeground::new();
    let (store, _rx) = store_in(dir.path(), 20, SteppingClock::new(0));
    let watcher = PasteboardWatcher::new(
        clipboard.clone(),
        foreground.clone(),
        Arc::clone(&store),
        policy,
    );
    Rig {
        _dir: dir,
        clipboard,
        foreground,
        store,
        watcher,
    }
}

fn excluding(app_id: &str) -> WatchPolicy {
    WatchPolicy {
        excluded_application_identifiers: [app_id.to_string()].into_iter().collect(),
        capture: CapturePolicy::default(),
    }
}

#[tokio::test]
async fn unchanged_counter_does_nothing() {
    let rig = rig(WatchPolicy::default());
    rig.clipboard.copy_text("before start");
    rig.watcher.record_baseline().unwrap();

    assert_eq!(rig.watcher.tick().await, TickOutcome::Unchanged);
    assert!(rig.store.is_empty().await);
}

#[tokio::test]
async fn change_after_baseline_is_recorded() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.record_baseline().unwrap();

    rig.clipboard.copy_text("Hello");
    let outcome = rig.watcher.tick().await;

    assert!(matches!(outcome, TickOutcome::Recorded(ref r) if r.title == "Hello"));
    assert_eq!(rig.watcher.baseline(), Some(ChangeCount(1)));
    assert_eq!(rig.watcher.tick().await, TickOutcome::Unchanged);
}

#[tokio::test]
async fn recopying_same_text_is_not_recorded_twice() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.record_baseline().unwrap();

    rig.clipboard.copy_text("Hello");
    rig.watcher.tick().await;
    rig.clipboard.copy_text("Hello");

    assert_eq!(rig.watcher.tick().await, TickOutcome::NotRecorded);
    assert_eq!(rig.store.len().await, 1);
}

#[tokio::test]
async fn excluded_app_advances_baseline_without_recording() {
    let rig = rig(excluding("com.example.vault"));
    rig.watcher.record_baseline().unwrap();

    rig.foreground.focus(Some("com.example.vault"));
    rig.clipboard.copy_text("secret");
    assert_eq!(
        rig.watcher.tick().await,
        TickOutcome::Excluded {
            app_id: "com.example.vault".into()
        }
    );
    assert!(rig.store.is_empty().await);
    // The excluded change is not retried once focus moves away.
    rig.foreground.focus(Some("com.example.editor"));
    assert_eq!(rig.watcher.tick().await, TickOutcome::Unchanged);

    rig.clipboard.copy_text("public");
    assert!(matches!(rig.watcher.tick().await, TickOutcome::Recorded(_)));
    assert_eq!(rig.store.all_records().await[0].title, "public");
}

#[tokio::test]
async fn oversized_image_alone_captures_nothing() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.record_baseline().unwrap();

    rig.clipboard
        .copy(ClipboardSnapshot::empty().with_image(vec![0u8; MAX_IMAGE_BYTES + 10 * 1024 * 1024]));

    assert_eq!(rig.watcher.tick().await, TickOutcome::NothingToCapture);
    assert!(rig.store.is_empty().await);
}

#[tokio::test]
async fn store_types_filter_formats() {
    let policy = WatchPolicy {
        excluded_application_identifiers: Default::default(),
        capture: CapturePolicy::with_store_types(vec![ClipFormat::PlainText]),
    };
    let rig = rig(policy);
    rig.watcher.record_baseline().unwrap();

    rig.clipboard
        .copy(ClipboardSnapshot::from_text("plain").with_rich_text("{\\rtf1 plain}"));
    let TickOutcome::Recorded(record) = rig.watcher.tick().await else {
        panic!("expected a recorded change");
    };

    let content = rig.store.load_content(&record).await.unwrap();
    assert_eq!(content, ClipboardSnapshot::from_text("plain"));
}

#[tokio::test]
async fn broken_counter_keeps_baseline() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.record_baseline().unwrap();
    rig.clipboard.break_counter();

    assert_eq!(rig.watcher.tick().await, TickOutcome::CounterUnavailable);
    assert_eq!(rig.watcher.baseline(), Some(ChangeCount(0)));
}

#[tokio::test]
async fn start_fails_without_a_readable_counter() {
    let rig = rig(WatchPolicy::default());
    rig.clipboard.break_counter();

    let err = rig
        .watcher
        .start_watcher(Duration::from_millis(10))
        .await
        .unwrap_err();

    assert!(matches!(err, WatcherControlError::BaselineUnavailable(_)));
    assert!(!rig.watcher.is_monitoring());
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let rig = rig(WatchPolicy::default());
    assert!(matches!(
        rig.watcher.start_watcher(Duration::ZERO).await,
        Err(WatcherControlError::InvalidInterval)
    ));
}

#[tokio::test]
async fn monitoring_loop_records_changes_until_stopped() {
    let rig = rig(WatchPolicy::default());
    rig.clipboard.copy_text("already there");

    rig.watcher.start_watcher(Duration::from_millis(20)).await.unwrap();
    assert!(rig.watcher.is_monitoring());

    rig.clipboard.copy_text("copied while monitoring");
    wait_for_len(&rig.store, 1).await;

    rig.watcher.stop_watcher().await.unwrap();
    assert!(!rig.watcher.is_monitoring());

    rig.clipboard.copy_text("copied after stop");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(rig.store.len().await, 1);
    assert_eq!(rig.store.all_records().await[0].title, "copied while monitoring");
}

#[tokio::test]
async fn start_is_idempotent() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.start_watcher(Duration::from_secs(3600)).await.unwrap();
    rig.clipboard.copy_text("moved");
    let baseline = rig.watcher.baseline();

    rig.watcher.start_watcher(Duration::from_secs(3600)).await.unwrap();

    assert_eq!(rig.watcher.baseline(), baseline);
    rig.watcher.stop_watcher().await.unwrap();
    rig.watcher.stop_watcher().await.unwrap();
}

#[tokio::test]
async fn policy_swap_applies_on_next_tick() {
    let rig = rig(WatchPolicy::default());
    rig.watcher.record_baseline().unwrap();
    rig.foreground.focus(Some("com.example.vault"));

    rig.watcher.set_policy(excluding("com.example.vault"));
    rig.clipboard.copy_text("secret");

    assert!(matches!(rig.watcher.tick().await, TickOutcome::Excluded { .. }));
}

#[tokio::test]
async fn stop_lets_the_change_being_recorded_finish() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clipboard = FakeClipboard::new();
    let codec = ControlledCodec::new(dir.path());
    let (store, _rx) = store_with_codec(dir.path(), codec.clone(), 20, SteppingClock::new(0));
    let watcher = Arc::new(PasteboardWatcher::new(
        clipboard.clone(),
        FakeForeground::new(),
        Arc::clone(&store),
        WatchPolicy::default(),
    ));

    watcher.start_watcher(Duration::from_millis(10)).await.unwrap();
    codec.hold_persist();
    clipboard.copy_text("written during stop");
    tokio::time::timeout(Duration::from_secs(5), codec.persist_entered.notified())
        .await
        .expect("poll loop never reached persist");

    let stopping = tokio::spawn({
        let watcher = Arc::clone(&watcher);
        async move { watcher.stop_watcher().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!stopping.is_finished(), "stop returned while a blob was half written");

    codec.persist_release.notify_one();
    stopping.await.unwrap().unwrap();

    assert!(!watcher.is_monitoring());
    let records = store.all_records().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].blob_path.exists());
    let index = index_repo(dir.path()).load().await.unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].id, records[0].id);
}

#[tokio::test]
async fn dropping_the_watcher_does_not_cut_a_tick_short() {
    let dir = tempfile::tempdir().unwrap();
    let clipboard = FakeClipboard::new();
    let codec = ControlledCodec::new(dir.path());
    let (store, _rx) = store_with_codec(dir.path(), codec.clone(), 20, SteppingClock::new(0));
    let watcher = PasteboardWatcher::new(
        clipboard.clone(),
        FakeForeground::new(),
        Arc::clone(&store),
        WatchPolicy::default(),
    );

    watcher.start_watcher(Duration::from_millis(10)).await.unwrap();
    codec.hold_persist();
    clipboard.copy_text("written during drop");
    tokio::time::timeout(Duration::from_secs(5), codec.persist_entered.notified())
        .await
        .expect("poll loop never reached persist");

    drop(watcher);
    codec.persist_release.notify_one();

    let index = index_repo(dir.path());
    for _ in 0..200 {
        if index.load().await.unwrap().len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(index.load().await.unwrap().len(), 1);
    assert!(store.all_records().await[0].blob_path.exists());

    clipboard.copy_text("after drop");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.len().await, 1);
}

/// Sync calls that only return once a task on the test runtime answers.
///
/// On a current-thread runtime the answering task cannot run while the
/// runtime thread itself is blocked, so a call made there times out.
struct RuntimeHandshake {
    requests: async_mpsc::UnboundedSender<()>,
    replies: Mutex<mpsc::Receiver<()>>,
}

impl RuntimeHandshake {
    fn start() -> Arc<Self> {
        let (requests, mut incoming) = async_mpsc::unbounded_channel::<()>();
        let (reply, replies) = mpsc::channel();
        tokio::spawn(async move {
            while incoming.recv().await.is_some() {
                if reply.send(()).is_err() {
                    break;
                }
            }
        });
        Arc::new(Self {
            requests,
            replies: Mutex::new(replies),
        })
    }

    fn answered(&self) -> bool {
        self.requests.send(()).is_ok()
            && self
                .replies
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(2))
                .is_ok()
    }
}

struct HandshakeClipboard {
    inner: Arc<FakeClipboard>,
    handshake: Arc<RuntimeHandshake>,
}

impl SystemClipboardPort for HandshakeClipboard {
    fn change_count(&self) -> anyhow::Result<ChangeCount> {
        if !self.handshake.answered() {
            anyhow::bail!("counter read on the runtime thread");
        }
        self.inner.change_count()
    }

    fn available_formats(&self) -> anyhow::Result<Vec<ClipFormat>> {
        self.inner.available_formats()
    }

    fn read_format(&self, format: ClipFormat) -> anyhow::Result<Option<FormatPayload>> {
        self.inner.read_format(format)
    }

    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> anyhow::Result<()> {
        self.inner.write_snapshot(snapshot)
    }
}

struct HandshakeForeground {
    handshake: Arc<RuntimeHandshake>,
    blocked_runtime: AtomicBool,
}

impl ForegroundAppPort for HandshakeForeground {
    fn frontmost_app_id(&self) -> Option<String> {
        if !self.handshake.answered() {
            self.blocked_runtime.store(true, Ordering::SeqCst);
        }
        Some("com.example.editor".into())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn counter_and_foreground_reads_stay_off_the_runtime_thread() {
    let dir = tempfile::tempdir().unwrap();
    let handshake = RuntimeHandshake::start();
    let fake = FakeClipboard::new();
    let clipboard = Arc::new(HandshakeClipboard {
        inner: Arc::clone(&fake),
        handshake: Arc::clone(&handshake),
    });
    let foreground = Arc::new(HandshakeForeground {
        handshake,
        blocked_runtime: AtomicBool::new(false),
    });
    let (store, _rx) = store_in(dir.path(), 20, SteppingClock::new(0));
    let watcher = PasteboardWatcher::new(
        clipboard,
        foreground.clone(),
        Arc::clone(&store),
        WatchPolicy::default(),
    );

    let outcome = watcher.tick().await;
    assert!(matches!(outcome, TickOutcome::NothingToCapture), "{outcome:?}");

    fake.copy_text("polled");
    let outcome = watcher.tick().await;
    assert!(matches!(outcome, TickOutcome::Recorded(_)), "{outcome:?}");
    assert!(!foreground.blocked_runtime.load(Ordering::SeqCst));
}

/// Poll until the background loop has caught up.
async fn wait_for_len(store: &cr_app::ClipStore, len: usize) {
    for _ in 0..200 {
        if store.len().await == len {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("store never reached {len} records");
}
