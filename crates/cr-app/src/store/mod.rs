//! Ordered, deduplicated, bounded clip history.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cr_core::clipboard::{ClipRecord, ClipboardSnapshot};
use cr_core::events::CoreEvent;
use cr_core::ids::ClipId;
use cr_core::ports::{ClipIndexPort, ClockPort, ContentCodecPort};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

/// In-memory history backed by a content codec and an index file.
///
/// 剪贴板历史：内存中的有序列表，由内容编解码器与索引文件持久化。
///
/// # Invariants / 不变量
/// - Records are strictly newest first by `created_at`.
/// - At most one record per content hash.
/// - Never more than `max_history_size` records after an insertion.
/// - A record's blob exists for as long as the record is in the list.
///
/// Every mutation holds the list lock for its whole duration, including
/// file I/O, so two mutations never interleave. Reads return copies.
pub struct ClipStore {
    records: Mutex<Vec<ClipRecord>>,
    codec: Arc<dyn ContentCodecPort>,
    index: Arc<dyn ClipIndexPort>,
    clock: Arc<dyn ClockPort>,
    max_history_size: AtomicUsize,
    events: broadcast::Sender<CoreEvent>,
}

impl ClipStore {
    pub fn new(
        codec: Arc<dyn ContentCodecPort>,
        index: Arc<dyn ClipIndexPort>,
        clock: Arc<dyn ClockPort>,
        max_history_size: usize,
        events: broadcast::Sender<CoreEvent>,
    ) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            codec,
            index,
            clock,
            max_history_size: AtomicUsize::new(max_history_size.max(1)),
            events,
        }
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size.load(Ordering::Relaxed)
    }

    /// Takes effect on the next insertion; existing records are not evicted.
    pub fn set_max_history_size(&self, max: usize) {
        self.max_history_size.store(max.max(1), Ordering::Relaxed);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Replace the in-memory list with what the index and blobs on disk
    /// describe. Returns the number of records loaded.
    ///
    /// Entries whose blob is missing or corrupt, and entries repeating an
    /// earlier content hash, are skipped. Files that belong to no loaded
    /// record are deleted afterwards, but only when the index itself was
    /// readable: an unreadable index leaves every file on disk untouched.
    pub async fn load(&self) -> usize {
        let span = info_span!("store.load");
        async {
            let (entries, index_readable) = match self.index.load().await {
                Ok(entries) => (entries, true),
                Err(err) => {
                    warn!(error = %err, "Index unreadable, starting with empty history");
                    (Vec::new(), false)
                }
            };
            let total = entries.len();

            let mut seen = HashSet::new();
            let mut loaded = Vec::with_capacity(total);
            for entry in entries {
                let stored = self.codec.locate(&entry.id).await;
                let Some(snapshot) = self.codec.load(&stored.blob_path).await else {
                    info!(record_id = %entry.id, "Skipping index entry without a readable blob");
                    continue;
                };

                let mut record =
                    ClipRecord::from_snapshot(entry.id, &snapshot, entry.created_at, stored);
                record.title = entry.title;

                if !seen.insert(record.content_hash.clone()) {
                    info!(record_id = %record.id, "Skipping duplicate index entry");
                    continue;
                }
                loaded.push(record);
            }
            loaded.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            if index_readable {
                let keep: HashSet<ClipId> = loaded.iter().map(|r| r.id.clone()).collect();
                if let Err(err) = self.codec.sweep_orphans(&keep).await {
                    warn!(error = %err, "Failed to sweep orphaned content files");
                }
            } else {
                warn!("Keeping content files on disk until the index is readable again");
            }

            let mut records = self.records.lock().await;
            *records = loaded;
            let count = records.len();
            if index_readable && count != total {
                self.persist_index(&records).await;
            }
            drop(records);

            info!(loaded = count, skipped = total - count, "Loaded clip history");
            self.notify();
            count
        }
        .instrument(span)
        .await
    }

    /// Insert a new snapshot at the front of the history.
    ///
    /// Returns `None` when the snapshot is empty, when a record with the same
    /// content hash already exists (order is left untouched), or when its blob
    /// could not be written.
    pub async fn record_change(&self, snapshot: &ClipboardSnapshot) -> Option<ClipRecord> {
        if snapshot.is_empty() {
            debug!("Empty snapshot, nothing to record");
            return None;
        }

        let hash = snapshot.content_hash();
        let span = info_span!("store.record_change", content_hash = %hash);
        async {
            let mut records = self.records.lock().await;
            if records.iter().any(|r| r.content_hash == hash) {
                debug!("Duplicate content, ignoring");
                return None;
            }

            let id = ClipId::new();
            let stored = match self.codec.persist(&id, snapshot).await {
                Ok(stored) => stored,
                Err(err) => {
                    warn!(
                        record_id = %id,
                        error = %err,
                        "Failed to persist clip content, dropping"
                    );
                    return None;
                }
            };

            let created_at = self.next_timestamp(records.first());
            let record = ClipRecord::from_snapshot(id, snapshot, created_at, stored);
            records.insert(0, record.clone());

            let capacity = self.max_history_size();
            while records.len() > capacity {
                if let Some(evicted) = records.pop() {
                    self.evict_files(&evicted).await;
                    debug!(record_id = %evicted.id, "Evicted oldest record");
                }
            }

            self.persist_index(&records).await;
            drop(records);

            info!(
                record_id = %record.id,
                primary_type = %record.primary_type,
                "Recorded clipboard change"
            );
            self.notify();
            Some(record)
        }
        .instrument(span)
        .await
    }

    /// Copy of the history, newest first.
    pub async fn all_records(&self) -> Vec<ClipRecord> {
        self.records.lock().await.clone()
    }

    pub async fn get(&self, id: &ClipId) -> Option<ClipRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Decode the payload of a record.
    pub async fn load_content(&self, record: &ClipRecord) -> Option<ClipboardSnapshot> {
        self.codec.load(&record.blob_path).await
    }

    /// Returns `false` if no record has this id.
    pub async fn delete(&self, id: &ClipId) -> bool {
        let mut records = self.records.lock().await;
        let Some(pos) = records.iter().position(|r| &r.id == id) else {
            return false;
        };
        let removed = records.remove(pos);
        self.remove_files(&removed).await;
        self.persist_index(&records).await;
        drop(records);

        info!(record_id = %id, "Deleted record");
        self.notify();
        true
    }

    pub async fn clear(&self) {
        let mut records = self.records.lock().await;
        if records.is_empty() {
            return;
        }
        let removed: Vec<ClipRecord> = records.drain(..).collect();
        for record in &removed {
            self.remove_files(record).await;
        }
        self.persist_index(&records).await;
        drop(records);

        info!(removed = removed.len(), "Cleared history");
        self.notify();
    }

    fn next_timestamp(&self, newest: Option<&ClipRecord>) -> DateTime<Utc> {
        let now_ms = self.clock.now_ms();
        let ms = match newest {
            Some(front) => now_ms.max(front.created_at.timestamp_millis() + 1),
            None => now_ms,
        };
        DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
    }

    async fn remove_files(&self, record: &ClipRecord) {
        if let Err(err) = self.codec.remove(&record.stored_content()).await {
            warn!(record_id = %record.id, error = %err, "Failed to delete record files");
        }
    }

    /// The record leaves the list whether or not its files go with it.
    /// Files left behind after the retry are orphans for the next load's sweep.
    async fn evict_files(&self, record: &ClipRecord) {
        let stored = record.stored_content();
        let Err(first) = self.codec.remove(&stored).await else {
            return;
        };
        debug!(record_id = %record.id, error = %first, "Retrying file removal");
        if let Err(err) = self.codec.remove(&stored).await {
            warn!(
                record_id = %record.id,
                error = %err,
                "Failed to delete evicted record files, left for the orphan sweep"
            );
        }
    }

    async fn persist_index(&self, records: &[ClipRecord]) {
        let entries: Vec<_> = records.iter().map(ClipRecord::index_entry).collect();
        if let Err(err) = self.index.save(&entries).await {
            warn!(error = %err, "Failed to save index, in-memory history stays authoritative");
        }
    }

    fn notify(&self) {
        // No receivers is fine.
        let _ = self.events.send(CoreEvent::HistoryChanged);
    }
}
