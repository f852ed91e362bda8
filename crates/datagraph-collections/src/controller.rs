//! Headless controller behind the collection list view
//!
//! Owns the list state for one folder of one dataset and coordinates the
//! requests that change it: paginated fetches, debounced search, background
//! polling while training or syncing is in progress, and mutations that
//! refetch the current page once they succeed.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::{Mutex, RwLock};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::{
    client::CollectionApi,
    errors::{CollectionError, CollectionResult},
    model::{
        Collection, CollectionType, CreateCollection, DatasetDetail, ListQuery, PathItem,
        SyncResult, UpdateCollection,
    },
    notify::{Notifier, Toast},
    view::CollectionRow,
};

/// Timing and paging for the list view
#[derive(Debug, Clone)]
pub struct ListViewConfig {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub poll_interval: Duration,
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_debounce: Duration::from_millis(300),
            poll_interval: Duration::from_secs(6),
        }
    }
}

impl ListViewConfig {
    /// Reads `COLLECTION_PAGE_SIZE`, `COLLECTION_SEARCH_DEBOUNCE_MS` and
    /// `COLLECTION_POLL_INTERVAL_SECS` over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(size) = env_number("COLLECTION_PAGE_SIZE") {
            config.page_size = size as u32;
        }
        if let Some(ms) = env_number("COLLECTION_SEARCH_DEBOUNCE_MS") {
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = env_number("COLLECTION_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(secs);
        }
        config
    }
}

fn env_number(key: &str) -> Option<u64> {
    let value = std::env::var(key).ok()?;
    match value.parse::<u64>() {
        Ok(n) if n > 0 && n <= u64::from(u32::MAX) => Some(n),
        _ => {
            warn!("Invalid {} value: {}", key, value);
            None
        }
    }
}

/// Snapshot of everything the view renders.
#[derive(Debug, Clone)]
pub struct ListState {
    pub dataset: DatasetDetail,
    pub parent_id: String,
    pub paths: Vec<PathItem>,
    pub collections: Vec<Collection>,
    pub total: u64,
    pub page_num: u32,
    pub search_text: String,
    pub is_getting: bool,
}

#[derive(Default)]
struct Tasks {
    debounce: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
}

struct Inner {
    api: Arc<dyn CollectionApi>,
    notifier: Arc<dyn Notifier>,
    config: ListViewConfig,
    state: RwLock<ListState>,
    last_search: Mutex<String>,
    generation: AtomicU64,
    pending_mutations: AtomicUsize,
    tasks: Mutex<Tasks>,
}

/// Decrements the in-flight mutation count when dropped.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller for one collection list. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CollectionListController {
    inner: Arc<Inner>,
}

impl CollectionListController {
    pub fn new(
        api: Arc<dyn CollectionApi>,
        notifier: Arc<dyn Notifier>,
        dataset: DatasetDetail,
        parent_id: impl Into<String>,
        config: ListViewConfig,
    ) -> Self {
        let state = ListState {
            dataset,
            parent_id: parent_id.into(),
            paths: Vec::new(),
            collections: Vec::new(),
            total: 0,
            page_num: 1,
            search_text: String::new(),
            is_getting: false,
        };
        Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                config,
                state: RwLock::new(state),
                last_search: Mutex::new(String::new()),
                generation: AtomicU64::new(0),
                pending_mutations: AtomicUsize::new(0),
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    pub fn config(&self) -> &ListViewConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> ListState {
        self.inner.state.read().clone()
    }

    /// Table rows for the current page
    pub fn rows(&self) -> Vec<CollectionRow> {
        self.inner
            .state
            .read()
            .collections
            .iter()
            .cloned()
            .map(CollectionRow::new)
            .collect()
    }

    /// The pager is only shown when there is more than one page
    pub fn show_pagination(&self) -> bool {
        self.inner.state.read().total > u64::from(self.inner.config.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.read().total == 0
    }

    /// True while a mutation runs, or while the first page is loading
    pub fn is_loading(&self) -> bool {
        if self.inner.pending_mutations.load(Ordering::SeqCst) > 0 {
            return true;
        }
        let state = self.inner.state.read();
        state.is_getting && state.collections.is_empty()
    }

    /// Polling is only useful while some row is training or the dataset is syncing
    pub fn should_poll(&self) -> bool {
        let state = self.inner.state.read();
        state.dataset.is_syncing() || state.collections.iter().any(Collection::has_pending_training)
    }

    /// Fetches one page with the current search text.
    ///
    /// Fetches are sequenced: if another fetch starts before this one
    /// resolves, this response is discarded.
    #[instrument(skip(self))]
    pub async fn get_data(&self, page_num: u32) -> CollectionResult<()> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let mut state = self.inner.state.write();
            state.is_getting = true;
            ListQuery {
                dataset_id: state.dataset.id.clone(),
                parent_id: state.parent_id.clone(),
                search_text: state.search_text.clone(),
                page_num,
                page_size: self.inner.config.page_size,
            }
        };

        let result = self.inner.api.list(query).await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale collection page");
            return Ok(());
        }

        let mut state = self.inner.state.write();
        state.is_getting = false;
        match result {
            Ok(page) => {
                debug!(count = page.list.len(), total = page.total, "Loaded collection page");
                state.collections = page.list;
                state.total = page.total;
                state.page_num = page_num;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load collections: {}", e);
                Err(e)
            }
        }
    }

    /// Refetches the page currently shown
    pub async fn refresh(&self) -> CollectionResult<()> {
        let page_num = self.inner.state.read().page_num;
        self.get_data(page_num).await
    }

    /// Loads the breadcrumb path of the current folder
    pub async fn load_path(&self) -> CollectionResult<Vec<PathItem>> {
        let parent_id = self.inner.state.read().parent_id.clone();
        let paths = self.inner.api.get_path(&parent_id).await?;
        self.inner.state.write().paths = paths.clone();
        Ok(paths)
    }

    /// Reloads the dataset detail, which carries its sync status
    pub async fn reload_dataset(&self) -> CollectionResult<DatasetDetail> {
        let dataset_id = self.inner.state.read().dataset.id.clone();
        let dataset = self.inner.api.dataset_detail(&dataset_id).await?;
        self.inner.state.write().dataset = dataset.clone();
        Ok(dataset)
    }

    // ---- search ----

    /// Records new search text and schedules a debounced refetch of page 1.
    /// Each call restarts the debounce window.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.inner.state.write().search_text = text.into();

        let controller = self.clone();
        let delay = self.inner.config.search_debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = controller.run_search().await {
                debug!("Debounced search failed: {}", e);
            }
        });

        if let Some(previous) = self.inner.tasks.lock().debounce.replace(handle) {
            previous.abort();
        }
    }

    /// Enter key in the search box
    pub async fn submit_search(&self) -> CollectionResult<bool> {
        self.search_now().await
    }

    /// Search box lost focus
    pub async fn blur_search(&self) -> CollectionResult<bool> {
        self.search_now().await
    }

    /// Refetches page 1 immediately if the text changed since the last
    /// search, cancelling any pending debounced search. Returns whether a
    /// fetch was issued.
    async fn search_now(&self) -> CollectionResult<bool> {
        let search_text = self.inner.state.read().search_text.clone();
        if *self.inner.last_search.lock() == search_text {
            return Ok(false);
        }
        if let Some(pending) = self.inner.tasks.lock().debounce.take() {
            pending.abort();
        }
        self.run_search().await?;
        Ok(true)
    }

    async fn run_search(&self) -> CollectionResult<()> {
        let search_text = self.inner.state.read().search_text.clone();
        *self.inner.last_search.lock() = search_text;
        self.get_data(1).await
    }

    // ---- polling ----

    /// Starts the background poller. A running poller is replaced.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_polling(&self) {
        let controller = self.clone();
        let period = self.inner.config.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                controller.poll_once().await;
            }
        });

        if let Some(previous) = self.inner.tasks.lock().poller.replace(handle) {
            previous.abort();
        }
    }

    /// One poll tick: refetch page 1, and reload the dataset while it syncs.
    pub async fn poll_once(&self) {
        if !self.should_poll() {
            return;
        }
        if let Err(e) = self.get_data(1).await {
            debug!("Polling refetch failed: {}", e);
        }
        let syncing = self.inner.state.read().dataset.is_syncing();
        if syncing {
            if let Err(e) = self.reload_dataset().await {
                debug!("Polling dataset reload failed: {}", e);
            }
        }
    }

    /// Cancels background work and discards any fetch still in flight.
    pub fn shutdown(&self) {
        let mut tasks = self.inner.tasks.lock();
        if let Some(handle) = tasks.debounce.take() {
            handle.abort();
        }
        if let Some(handle) = tasks.poller.take() {
            handle.abort();
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        info!("Collection list controller shut down");
    }

    // ---- mutations ----

    /// Runs a mutation, toasts its outcome and refetches the current page on success.
    async fn mutate<T, Fut>(
        &self,
        operation: Fut,
        success_title: impl FnOnce(&T) -> Option<String>,
        error_title: &str,
    ) -> CollectionResult<T>
    where
        Fut: Future<Output = CollectionResult<T>>,
    {
        let result = {
            let _pending = PendingGuard::enter(&self.inner.pending_mutations);
            operation.await
        };

        match result {
            Ok(value) => {
                if let Some(title) = success_title(&value) {
                    self.inner.notifier.toast(Toast::success(title));
                }
                if let Err(e) = self.refresh().await {
                    warn!("Refetch after mutation failed: {}", e);
                }
                Ok(value)
            }
            Err(e) => {
                warn!("{}: {}", error_title, e);
                self.inner.notifier.toast(Toast::error(error_title));
                Err(e)
            }
        }
    }

    /// Enable switch: an enabled collection is one that is not forbidden.
    #[instrument(skip(self))]
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> CollectionResult<()> {
        let request = UpdateCollection {
            id: id.to_string(),
            forbid: Some(!enabled),
            ..Default::default()
        };
        self.mutate(
            self.inner.api.update(request),
            |_| Some("Update Success".to_string()),
            "Update Failed",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> CollectionResult<()> {
        self.mutate(
            self.inner.api.delete(id),
            |_| Some("Delete Success".to_string()),
            "Delete Failed",
        )
        .await
    }

    /// Triggers an external sync; the success toast names the sync result.
    #[instrument(skip(self))]
    pub async fn sync(&self, id: &str) -> CollectionResult<SyncResult> {
        self.mutate(
            self.inner.api.sync(id),
            |result: &SyncResult| Some(result.label().to_string()),
            "Start Sync Failed",
        )
        .await
    }

    /// Moves a collection under another folder.
    #[instrument(skip(self))]
    pub async fn move_to(&self, id: &str, parent_id: &str) -> CollectionResult<()> {
        let request = UpdateCollection {
            id: id.to_string(),
            parent_id: Some(parent_id.to_string()),
            ..Default::default()
        };
        self.mutate(
            self.inner.api.update(request),
            |_| Some("Move Success".to_string()),
            "Move Failed",
        )
        .await
    }

    /// Drag-and-drop of `drag_id` onto the row `target_id`.
    pub async fn drop_onto(&self, drag_id: &str, target_id: &str) -> CollectionResult<()> {
        if drag_id == target_id {
            return Err(CollectionError::Validation(
                "A collection cannot be moved into itself".to_string(),
            ));
        }
        self.move_to(drag_id, target_id).await
    }

    /// Renames a folder in place.
    #[instrument(skip(self))]
    pub async fn rename(&self, id: &str, name: &str) -> CollectionResult<()> {
        let request = UpdateCollection {
            id: id.to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.mutate(
            self.inner.api.update(request),
            |_| Some("Update Success".to_string()),
            "Update Failed",
        )
        .await
    }

    /// Creates a collection in the current folder and returns its id.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        collection_type: CollectionType,
    ) -> CollectionResult<String> {
        let request = {
            let state = self.inner.state.read();
            CreateCollection {
                dataset_id: state.dataset.id.clone(),
                parent_id: state.parent_id.clone(),
                name: name.to_string(),
                collection_type,
                training_type: None,
                raw_link: None,
                chunk_size: None,
            }
        };
        self.mutate(
            self.inner.api.create(request),
            |_| Some("Create Success".to_string()),
            "Create Failed",
        )
        .await
    }

    pub async fn create_folder(&self, name: &str) -> CollectionResult<String> {
        self.create(name, CollectionType::Folder).await
    }
}
