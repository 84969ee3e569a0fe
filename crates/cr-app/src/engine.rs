//! Facade the presentation layer talks to.

use std::sync::Arc;
use std::time::Duration;

use cr_core::clipboard::{ClipRecord, ClipboardSnapshot};
use cr_core::events::CoreEvent;
use cr_core::ids::{ClipId, SnippetId};
use cr_core::ports::{SettingsPort, WatcherControlError, WatcherControlPort};
use cr_core::settings::Settings;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::deps::EngineDeps;
use crate::paste::{default_chain, InjectorTiming, PasteError, PasteInjector, PasteReport};
use crate::snippets::SnippetService;
use crate::store::ClipStore;
use crate::watcher::{PasteboardWatcher, WatchPolicy};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// ClipRecall engine: history store, watcher, paste injector and snippets
/// wired together.
///
/// 剪贴板引擎门面：组合历史存储、监视器、粘贴注入器与片段库。
pub struct ClipEngine {
    store: Arc<ClipStore>,
    watcher: PasteboardWatcher,
    injector: PasteInjector,
    snippets: SnippetService,
    settings_repo: Arc<dyn SettingsPort>,
    settings: RwLock<Settings>,
    events: broadcast::Sender<CoreEvent>,
}

impl ClipEngine {
    /// Load settings, history and snippets from disk and assemble the engine.
    /// Monitoring is not started.
    #[tracing::instrument(name = "engine.bootstrap", skip(deps))]
    pub async fn bootstrap(deps: EngineDeps) -> Self {
        let settings = match deps.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Settings unreadable, using defaults");
                Settings::default()
            }
        };

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let store = Arc::new(ClipStore::new(
            deps.codec,
            deps.index,
            deps.clock,
            settings.history.max_history_size,
            events.clone(),
        ));
        store.load().await;

        let snippets = SnippetService::new(deps.snippets, events.clone());
        snippets.load().await;

        let watcher = PasteboardWatcher::new(
            Arc::clone(&deps.clipboard),
            deps.foreground,
            Arc::clone(&store),
            WatchPolicy::from(&settings.history),
        );

        let injector = PasteInjector::new(
            deps.clipboard,
            default_chain(deps.script, deps.key_chord, &settings.paste),
            deps.notifier,
            events.clone(),
            InjectorTiming::from(&settings.paste),
        );

        info!(
            records = store.len().await,
            max_history_size = store.max_history_size(),
            strategies = ?injector.strategy_names(),
            "Engine ready"
        );

        Self {
            store,
            watcher,
            injector,
            snippets,
            settings_repo: deps.settings,
            settings: RwLock::new(settings),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub async fn start_monitoring(&self, interval: Duration) -> Result<(), WatcherControlError> {
        self.watcher.start_watcher(interval).await
    }

    /// Start polling at the configured interval.
    pub async fn start_monitoring_default(&self) -> Result<(), WatcherControlError> {
        let interval = self.settings.read().await.history.poll_interval();
        self.start_monitoring(interval).await
    }

    pub async fn stop_monitoring(&self) -> Result<(), WatcherControlError> {
        self.watcher.stop_watcher().await
    }

    pub fn is_monitoring(&self) -> bool {
        self.watcher.is_monitoring()
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    pub fn watcher(&self) -> &PasteboardWatcher {
        &self.watcher
    }

    pub fn snippets(&self) -> &SnippetService {
        &self.snippets
    }

    pub async fn all_records(&self) -> Vec<ClipRecord> {
        self.store.all_records().await
    }

    /// Records with titles truncated for a menu.
    pub async fn menu_titles(&self) -> Vec<(ClipId, String)> {
        let max = self.settings.read().await.display.max_menu_item_title_length;
        self.store
            .all_records()
            .await
            .iter()
            .map(|r| (r.id.clone(), r.display_title(max)))
            .collect()
    }

    #[tracing::instrument(
        name = "usecase.delete_record.execute",
        skip(self),
        fields(record_id = %id)
    )]
    pub async fn delete(&self, id: &ClipId) -> bool {
        self.store.delete(id).await
    }

    #[tracing::instrument(name = "usecase.clear_history.execute", skip(self))]
    pub async fn clear_all(&self) {
        self.store.clear().await
    }

    #[tracing::instrument(
        name = "usecase.paste_record.execute",
        skip(self),
        fields(record_id = %id)
    )]
    pub async fn paste_record(&self, id: &ClipId) -> Result<PasteReport, PasteError> {
        let record = self
            .store
            .get(id)
            .await
            .ok_or_else(|| PasteError::RecordNotFound(id.clone()))?;
        let snapshot = self
            .store
            .load_content(&record)
            .await
            .ok_or_else(|| PasteError::ContentUnavailable(id.clone()))?;
        self.injector.paste(&record.title, &snapshot).await
    }

    #[tracing::instrument(name = "usecase.paste_text.execute", skip(self, text))]
    pub async fn paste_text(&self, text: &str) -> Result<PasteReport, PasteError> {
        if text.is_empty() {
            return Err(PasteError::NothingToPaste);
        }
        let snapshot = ClipboardSnapshot::from_text(text);
        let title = cr_core::clipboard::derive_title(&snapshot);
        self.injector.paste(&title, &snapshot).await
    }

    /// Paste a snippet's content. Disabled snippets paste like any other.
    #[tracing::instrument(
        name = "usecase.paste_snippet.execute",
        skip(self),
        fields(snippet_id = %id)
    )]
    pub async fn paste_snippet(&self, id: &SnippetId) -> Result<PasteReport, PasteError> {
        let snippet = self.snippets.snippet(id).await.ok_or(PasteError::NothingToPaste)?;
        if snippet.content.is_empty() {
            return Err(PasteError::NothingToPaste);
        }
        let snapshot = ClipboardSnapshot::from_text(snippet.content);
        self.injector.paste(&snippet.title, &snapshot).await
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Persist `settings` and apply them.
    ///
    /// Capacity applies on the next insertion and the watch policy on the
    /// next tick. A changed poll interval restarts a running watcher. Paste
    /// delays are read at bootstrap only.
    #[tracing::instrument(name = "usecase.update_settings.execute", skip(self, settings))]
    pub async fn update_settings(&self, settings: Settings) -> anyhow::Result<()> {
        self.settings_repo.save(&settings).await?;

        let mut current = self.settings.write().await;
        let interval_changed =
            current.history.poll_interval_ms != settings.history.poll_interval_ms;

        self.store
            .set_max_history_size(settings.history.max_history_size);
        self.watcher
            .set_policy(WatchPolicy::from(&settings.history));

        if interval_changed && self.watcher.is_monitoring() {
            self.watcher.stop_watcher().await?;
            self.watcher
                .start_watcher(settings.history.poll_interval())
                .await?;
        }
        *current = settings;
        info!("Settings updated");
        Ok(())
    }
}
