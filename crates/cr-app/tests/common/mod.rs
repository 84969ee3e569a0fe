//! Shared fakes for cr-app integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cr_app::ClipStore;
use cr_core::clipboard::{ChangeCount, ClipFormat, ClipboardSnapshot, StoredContent};
use cr_core::events::CoreEvent;
use cr_core::ids::ClipId;
use cr_core::ports::*;
use cr_infra::{FileClipIndexRepository, FsContentStore, ImageThumbnailGenerator};
use mockall::mock;
use tokio::sync::{broadcast, Notify};

/// In-memory clipboard with a change counter bumped on every write.
#[derive(Default)]
pub struct FakeClipboard {
    state: Mutex<ClipboardState>,
}

#[derive(Default)]
struct ClipboardState {
    count: u64,
    content: ClipboardSnapshot,
    counter_broken: bool,
    /// Another application overwrote the clipboard right after our write.
    overwritten_after_write: Option<ClipboardSnapshot>,
    writes: usize,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulates another application copying `snapshot`.
    pub fn copy(&self, snapshot: ClipboardSnapshot) {
        let mut state = self.state.lock().unwrap();
        state.count += 1;
        state.content = snapshot;
    }

    pub fn copy_text(&self, text: &str) {
        self.copy(ClipboardSnapshot::from_text(text));
    }

    pub fn content(&self) -> ClipboardSnapshot {
        self.state.lock().unwrap().content.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn break_counter(&self) {
        self.state.lock().unwrap().counter_broken = true;
    }

    pub fn overwrite_after_write(&self, snapshot: ClipboardSnapshot) {
        self.state.lock().unwrap().overwritten_after_write = Some(snapshot);
    }
}

impl SystemClipboardPort for FakeClipboard {
    fn change_count(&self) -> anyhow::Result<ChangeCount> {
        let state = self.state.lock().unwrap();
        if state.counter_broken {
            anyhow::bail!("pasteboard server unavailable");
        }
        Ok(ChangeCount(state.count))
    }

    fn available_formats(&self) -> anyhow::Result<Vec<ClipFormat>> {
        Ok(self.state.lock().unwrap().content.formats())
    }

    fn read_format(&self, format: ClipFormat) -> anyhow::Result<Option<FormatPayload>> {
        let state = self.state.lock().unwrap();
        let content = &state.content;
        Ok(match format {
            ClipFormat::PlainText => content.text.clone().map(FormatPayload::Text),
            ClipFormat::RichText => content.rich_text.clone().map(FormatPayload::Text),
            ClipFormat::Pdf => content.pdf.clone().map(FormatPayload::Bytes),
            ClipFormat::Image => content.image.clone().map(FormatPayload::Bytes),
            ClipFormat::FileList => content.files.clone().map(FormatPayload::Files),
        })
    }

    fn write_snapshot(&self, snapshot: &ClipboardSnapshot) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.count += 1;
        state.writes += 1;
        state.content = match state.overwritten_after_write.take() {
            Some(other) => other,
            None => snapshot.clone(),
        };
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeForeground {
    app: Mutex<Option<String>>,
}

impl FakeForeground {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn focus(&self, app_id: Option<&str>) {
        *self.app.lock().unwrap() = app_id.map(str::to_string);
    }
}

impl ForegroundAppPort for FakeForeground {
    fn frontmost_app_id(&self) -> Option<String> {
        self.app.lock().unwrap().clone()
    }
}

/// Clock that advances one second per reading.
pub struct SteppingClock {
    now: AtomicI64,
}

impl SteppingClock {
    pub fn new(start_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(start_ms),
        })
    }
}

impl ClockPort for SteppingClock {
    fn now_ms(&self) -> i64 {
        self.now.fetch_add(1_000, Ordering::SeqCst)
    }
}

/// Clock stuck at one instant.
pub struct FrozenClock(pub i64);

impl ClockPort for FrozenClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

mock! {
    pub KeyChord {}

    impl KeyChordPort for KeyChord {
        fn post_paste_chord(&self, tap: EventTap, timing: ChordTiming) -> Result<(), KeyChordError>;
    }
}

mock! {
    pub Script {}

    impl ScriptPastePort for Script {
        fn has_permission(&self) -> bool;
        fn run_paste(&self) -> anyhow::Result<()>;
    }
}

mock! {
    pub Notifier {}

    impl ManualPasteNotifierPort for Notifier {
        fn notify_manual_paste(&self, title: &str) -> anyhow::Result<()>;
    }
}

pub fn content_store(dir: &Path) -> Arc<FsContentStore> {
    Arc::new(FsContentStore::new(
        dir.join("content"),
        Arc::new(ImageThumbnailGenerator::default()),
    ))
}

pub fn index_repo(dir: &Path) -> Arc<FileClipIndexRepository> {
    Arc::new(FileClipIndexRepository::new(dir.join("clips.json")))
}

/// Store over real files in `dir`, with its event receiver.
pub fn store_in(
    dir: &Path,
    max_history_size: usize,
    clock: Arc<dyn ClockPort>,
) -> (Arc<ClipStore>, broadcast::Receiver<CoreEvent>) {
    store_with_codec(dir, content_store(dir), max_history_size, clock)
}

pub fn store_with_codec(
    dir: &Path,
    codec: Arc<dyn ContentCodecPort>,
    max_history_size: usize,
    clock: Arc<dyn ClockPort>,
) -> (Arc<ClipStore>, broadcast::Receiver<CoreEvent>) {
    let (events, rx) = broadcast::channel(64);
    let store = ClipStore::new(codec, index_repo(dir), clock, max_history_size, events);
    (Arc::new(store), rx)
}

/// Real content store that can stall `persist` and fail `remove` on demand.
pub struct ControlledCodec {
    inner: Arc<FsContentStore>,
    hold_persist: AtomicBool,
    pub persist_entered: Notify,
    pub persist_release: Notify,
    remove_failures: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl ControlledCodec {
    pub fn new(dir: &Path) -> Arc<Self> {
        Arc::new(Self {
            inner: content_store(dir),
            hold_persist: AtomicBool::new(false),
            persist_entered: Notify::new(),
            persist_release: Notify::new(),
            remove_failures: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        })
    }

    /// Every following `persist` waits for `persist_release`.
    pub fn hold_persist(&self) {
        self.hold_persist.store(true, Ordering::SeqCst);
    }

    /// The next `count` calls to `remove` fail without touching the disk.
    pub fn fail_removes(&self, count: usize) {
        self.remove_failures.store(count, Ordering::SeqCst);
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentCodecPort for ControlledCodec {
    async fn persist(
        &self,
        id: &ClipId,
        snapshot: &ClipboardSnapshot,
    ) -> anyhow::Result<StoredContent> {
        if self.hold_persist.load(Ordering::SeqCst) {
            self.persist_entered.notify_one();
            self.persist_release.notified().await;
        }
        self.inner.persist(id, snapshot).await
    }

    async fn load(&self, blob_path: &Path) -> Option<ClipboardSnapshot> {
        self.inner.load(blob_path).await
    }

    async fn remove(&self, content: &StoredContent) -> anyhow::Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .remove_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            anyhow::bail!("device busy");
        }
        self.inner.remove(content).await
    }

    async fn locate(&self, id: &ClipId) -> StoredContent {
        self.inner.locate(id).await
    }

    async fn sweep_orphans(&self, keep: &HashSet<ClipId>) -> anyhow::Result<usize> {
        self.inner.sweep_orphans(keep).await
    }
}

/// A small valid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Route logs to the test harness. `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
