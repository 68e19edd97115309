//! # Currency Store
//!
//! The single owner of the currency collection and its loading/error flags.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Currency Store Lifecycle                             │
//! │                                                                         │
//! │  CurrencyStore::new()                                                  │
//! │    currencies=[]  loading=true  hydrated=false  revision=0             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate().await ──► storage.get_item(key)                             │
//! │       │                                                                 │
//! │       ├── found + valid ──► currencies = stored   (Restored)           │
//! │       ├── absent ─────────► currencies = []       (Empty)              │
//! │       ├── unreadable ─────► currencies = [], entry removed             │
//! │       │                                           (DiscardedCorrupt)   │
//! │       └── read failed ────► error = "...", Err(StoreError)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    loading=false  hydrated=true   (exactly once, never reverts)        │
//! │                                                                         │
//! │  set_currencies(list) / clear_currencies()                             │
//! │       │                                                                 │
//! │       ├──► new snapshot: currencies=list, error=None, revision+1       │
//! │       │    (published to every subscriber immediately)                 │
//! │       │                                                                 │
//! │       └──► PersistTask ──► background write of the same collection     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Ordering
//! Every write carries the revision of the collection it saves. Writes take
//! an async lock and skip themselves if a newer revision already reached
//! storage, so the stored block never goes back to an older collection.
//!
//! ## Sharing
//! `CurrencyStore` is a cheap handle (`Arc` inside). The application root
//! creates one and hands clones to whatever needs it. Readers get immutable
//! `Arc<CurrencyState>` snapshots and can never change the shared list.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use coinshelf_core::{
    decode_currencies, encode_currencies, CurrencyRecord, SearchQuery, DEFAULT_STORAGE_KEY,
};
use coinshelf_db::KeyValueStorage;

use crate::error::{StoreError, StoreResult};
use crate::state::search::FilteredCurrencies;

// =============================================================================
// Snapshot
// =============================================================================

/// One immutable view of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyState {
    /// The full, unfiltered collection in insertion order.
    pub currencies: Arc<[CurrencyRecord]>,

    /// True until the first hydration attempt finishes.
    pub loading: bool,

    /// Last reported error, cleared by every collection replacement.
    pub error: Option<String>,

    /// Set once hydration has been attempted.
    pub hydrated: bool,

    /// Bumped on every collection replacement.
    pub revision: u64,
}

impl CurrencyState {
    fn initial() -> Self {
        CurrencyState {
            currencies: Arc::from(Vec::new()),
            loading: true,
            error: None,
            hydrated: false,
            revision: 0,
        }
    }

    /// Number of records in the unfiltered collection.
    pub fn total_count(&self) -> usize {
        self.currencies.len()
    }
}

// =============================================================================
// Options & Outcomes
// =============================================================================

/// Store settings, usually derived from `AppConfig`.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Key the collection is persisted under.
    pub storage_key: String,

    /// Whether failed writes are routed into the state's `error` field.
    pub report_persist_failures: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            report_persist_failures: true,
        }
    }
}

impl StoreOptions {
    /// Sets the storage key.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets whether persist failures are shown to the user.
    pub fn report_persist_failures(mut self, report: bool) -> Self {
        self.report_persist_failures = report;
        self
    }
}

/// Result of a background write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The collection at `revision` is now in storage.
    Written { revision: u64, bytes: usize },

    /// A newer collection was already stored; nothing was written.
    Superseded { revision: u64 },
}

/// Result of [`CurrencyStore::hydrate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Stored collection adopted. `migrated` means it was rewritten in the
    /// current envelope format.
    Restored { count: usize, migrated: bool },

    /// Nothing stored under the key.
    Empty,

    /// Stored block could not be read and was removed.
    DiscardedCorrupt { reason: String },

    /// The collection was replaced before hydration finished; the local
    /// collection was kept.
    KeptLocalChanges,

    /// Hydration had already run.
    AlreadyHydrated,
}

/// Handle to the write scheduled by a mutation.
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PersistTask {
    revision: u64,
    handle: JoinHandle<StoreResult<PersistOutcome>>,
}

impl PersistTask {
    /// Revision of the collection this task writes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the write to finish.
    pub async fn wait(self) -> StoreResult<PersistOutcome> {
        self.handle
            .await
            .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

// =============================================================================
// Currency Store
// =============================================================================

/// Shared handle to the currency collection.
///
/// ## Example
/// ```rust,ignore
/// let store = CurrencyStore::new(Arc::new(db.key_values()), StoreOptions::default())?;
/// store.hydrate().await?;
///
/// store.set_currencies(reference::crypto_list()); // write runs in background
///
/// let (state, visible) = store.filtered(&SearchQuery::new("bit"));
/// ```
#[derive(Clone)]
pub struct CurrencyStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state_tx: watch::Sender<Arc<CurrencyState>>,
    storage: Arc<dyn KeyValueStorage>,
    options: StoreOptions,
    runtime: Handle,
    hydration_started: AtomicBool,
    /// Revision of the newest collection known to be in storage.
    persisted_revision: Mutex<u64>,
    filter_memo: StdMutex<FilteredCurrencies>,
}

impl std::fmt::Debug for CurrencyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.snapshot();
        f.debug_struct("CurrencyStore")
            .field("storage_key", &self.inner.options.storage_key)
            .field("revision", &state.revision)
            .field("count", &state.total_count())
            .field("hydrated", &state.hydrated)
            .finish()
    }
}

impl CurrencyStore {
    /// Creates an empty, not-yet-hydrated store.
    ///
    /// Must be called from within a Tokio runtime; background writes are
    /// spawned on it.
    pub fn new(storage: Arc<dyn KeyValueStorage>, options: StoreOptions) -> StoreResult<Self> {
        let runtime = Handle::try_current().map_err(|_| StoreError::RuntimeUnavailable)?;
        let (state_tx, _) = watch::channel(Arc::new(CurrencyState::initial()));

        debug!(key = %options.storage_key, "Currency store created");

        Ok(CurrencyStore {
            inner: Arc::new(StoreInner {
                state_tx,
                storage,
                options,
                runtime,
                hydration_started: AtomicBool::new(false),
                persisted_revision: Mutex::new(0),
                filter_memo: StdMutex::new(FilteredCurrencies::new()),
            }),
        })
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<CurrencyState> {
        Arc::clone(&*self.inner.state_tx.borrow())
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CurrencyState>> {
        self.inner.state_tx.subscribe()
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.options.storage_key
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Replaces the whole collection and clears `error`.
    ///
    /// Returns immediately; the durable write runs in the background and can
    /// be observed through the returned task.
    pub fn set_currencies(&self, currencies: Vec<CurrencyRecord>) -> PersistTask {
        let currencies: Arc<[CurrencyRecord]> = Arc::from(currencies);
        let mut revision = 0;

        self.inner.state_tx.send_modify(|state| {
            let mut next = CurrencyState::clone(state);
            next.currencies = Arc::clone(&currencies);
            next.error = None;
            next.revision += 1;
            revision = next.revision;
            *state = Arc::new(next);
        });

        info!(count = currencies.len(), revision, "Currencies replaced");
        self.schedule_persist(currencies, revision)
    }

    /// Empties the collection and clears `error`.
    pub fn clear_currencies(&self) -> PersistTask {
        self.set_currencies(Vec::new())
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state_tx.send_if_modified(|state| {
            if state.loading == loading {
                return false;
            }
            let mut next = CurrencyState::clone(state);
            next.loading = loading;
            *state = Arc::new(next);
            true
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.inner.state_tx.send_modify(|state| {
            let mut next = CurrencyState::clone(state);
            next.error = error;
            *state = Arc::new(next);
        });
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    /// Restores the persisted collection. Runs at most once per store.
    ///
    /// A call made while another is still reading waits for that one to
    /// finish, so `AlreadyHydrated` always means `hydrated` is set.
    ///
    /// ## Returns
    /// * `Ok(HydrationOutcome)` - store is hydrated, see the variant for what
    ///   was found
    /// * `Err(StoreError)` - storage read failed; the store is still marked
    ///   hydrated and the message is in `error`
    pub async fn hydrate(&self) -> StoreResult<HydrationOutcome> {
        if self.inner.hydration_started.swap(true, Ordering::SeqCst) {
            debug!("Hydration already started, waiting for it");
            // The sender lives in `inner`, so this only ends once hydrated.
            let _ = self.subscribe().wait_for(|state| state.hydrated).await;
            return Ok(HydrationOutcome::AlreadyHydrated);
        }

        let key = self.storage_key();
        info!(key = %key, "Restoring currencies from storage");

        let raw = match self.inner.storage.get_item(key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to read persisted currencies");
                self.finish_hydration(None, Some(format!("Failed to load saved currencies: {e}")));
                return Err(StoreError::Storage(e));
            }
        };

        let Some(raw) = raw else {
            self.finish_hydration(None, None);
            info!("No persisted currencies found");
            return Ok(HydrationOutcome::Empty);
        };

        match decode_currencies(&raw) {
            Ok(persisted) => {
                let count = persisted.currencies.len();
                let migrated = persisted.needs_upgrade();
                let from_version = persisted.version;

                let Some((revision, currencies)) =
                    self.finish_hydration(Some(persisted.currencies), None)
                else {
                    info!("Collection replaced during hydration, keeping local changes");
                    return Ok(HydrationOutcome::KeptLocalChanges);
                };

                if migrated {
                    info!(from_version, "Upgrading persisted currencies to current format");
                    if let Err(e) = self.schedule_persist(currencies, revision).wait().await {
                        warn!(error = %e, "Failed to rewrite persisted currencies");
                    }
                }

                info!(count, "Currencies restored");
                Ok(HydrationOutcome::Restored { count, migrated })
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable persisted currencies");
                self.discard_corrupt_entry().await;
                self.finish_hydration(None, None);
                Ok(HydrationOutcome::DiscardedCorrupt {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Marks the store hydrated, adopting `restored` unless the collection
    /// was already replaced locally. Returns the adopted revision.
    fn finish_hydration(
        &self,
        restored: Option<Vec<CurrencyRecord>>,
        error: Option<String>,
    ) -> Option<(u64, Arc<[CurrencyRecord]>)> {
        let mut adopted = None;

        self.inner.state_tx.send_modify(|state| {
            let mut next = CurrencyState::clone(state);
            if let Some(list) = restored {
                if next.revision == 0 {
                    next.currencies = Arc::from(list);
                    next.revision = 1;
                    adopted = Some((next.revision, Arc::clone(&next.currencies)));
                }
            }
            if error.is_some() {
                next.error = error;
            }
            next.hydrated = true;
            next.loading = false;
            *state = Arc::new(next);
        });

        adopted
    }

    async fn discard_corrupt_entry(&self) {
        // Holding the write lock keeps a concurrent mutation's write from
        // landing between the check and the delete.
        let persisted = self.inner.persisted_revision.lock().await;
        if *persisted > 0 || self.snapshot().revision > 0 {
            return;
        }

        if let Err(e) = self.inner.storage.remove_item(self.storage_key()).await {
            warn!(error = %e, "Failed to remove unreadable persisted currencies");
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Returns the current snapshot together with its records matching
    /// `query`.
    ///
    /// Both halves come from the same snapshot, so the filtered list always
    /// agrees with the returned `loading`, `error` and `revision`.
    ///
    /// Results are cached per (revision, query); asking again without a
    /// change returns the same `Arc`. An empty query returns the snapshot's
    /// own collection.
    pub fn filtered(&self, query: &SearchQuery) -> (Arc<CurrencyState>, Arc<[CurrencyRecord]>) {
        let state = self.snapshot();
        let mut memo = self
            .inner
            .filter_memo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let matched = memo.compute(&state, query);
        (state, matched)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    fn schedule_persist(&self, currencies: Arc<[CurrencyRecord]>, revision: u64) -> PersistTask {
        let inner = Arc::clone(&self.inner);
        let handle = self
            .inner
            .runtime
            .spawn(async move { inner.write_through(currencies, revision).await });

        PersistTask { revision, handle }
    }
}

impl StoreInner {
    async fn write_through(
        &self,
        currencies: Arc<[CurrencyRecord]>,
        revision: u64,
    ) -> StoreResult<PersistOutcome> {
        let mut persisted = self.persisted_revision.lock().await;

        if revision <= *persisted {
            debug!(revision, persisted = *persisted, "Skipping superseded write");
            return Ok(PersistOutcome::Superseded { revision });
        }

        let result = match encode_currencies(&currencies) {
            Ok(payload) => self
                .storage
                .set_item(&self.options.storage_key, &payload)
                .await
                .map(|()| payload.len())
                .map_err(StoreError::from),
            Err(e) => Err(StoreError::from(e)),
        };

        match result {
            Ok(bytes) => {
                *persisted = revision;
                debug!(revision, bytes, count = currencies.len(), "Currencies persisted");
                Ok(PersistOutcome::Written { revision, bytes })
            }
            Err(e) => {
                warn!(revision, error = %e, "Failed to persist currencies");
                self.report_persist_failure(revision, &e);
                Err(e)
            }
        }
    }

    /// Routes a failed write into `error` if it belongs to the collection
    /// currently shown.
    fn report_persist_failure(&self, revision: u64, err: &StoreError) {
        if !self.options.report_persist_failures {
            return;
        }

        let message = format!("Failed to save currencies: {err}");
        self.state_tx.send_if_modified(|state| {
            if state.revision != revision {
                return false;
            }
            let mut next = CurrencyState::clone(state);
            next.error = Some(message);
            *state = Arc::new(next);
            true
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coinshelf_core::reference::{crypto_list, fiat_list};
    use coinshelf_db::{DbError, DbResult, MemoryStorage};

    /// Storage whose reads and/or writes always fail.
    #[derive(Default)]
    struct FailingStorage {
        fail_reads: bool,
        fail_writes: bool,
    }

    #[async_trait]
    impl KeyValueStorage for FailingStorage {
        async fn get_item(&self, _key: &str) -> DbResult<Option<String>> {
            if self.fail_reads {
                return Err(DbError::Unavailable("read refused".into()));
            }
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: &str) -> DbResult<()> {
            if self.fail_writes {
                return Err(DbError::Unavailable("disk full".into()));
            }
            Ok(())
        }

        async fn remove_item(&self, _key: &str) -> DbResult<()> {
            Ok(())
        }
    }

    /// Storage whose reads take a while to come back.
    struct SlowStorage {
        inner: MemoryStorage,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl KeyValueStorage for SlowStorage {
        async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> DbResult<()> {
            self.inner.remove_item(key).await
        }
    }

    fn memory_store() -> (Arc<MemoryStorage>, CurrencyStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CurrencyStore::new(storage.clone(), StoreOptions::default()).unwrap();
        (storage, store)
    }

    fn store_with_entry(value: &str) -> (Arc<MemoryStorage>, CurrencyStore) {
        let storage = Arc::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, value));
        let store = CurrencyStore::new(storage.clone(), StoreOptions::default()).unwrap();
        (storage, store)
    }

    async fn stored(storage: &MemoryStorage) -> Vec<CurrencyRecord> {
        let raw = storage.snapshot(DEFAULT_STORAGE_KEY).await.unwrap();
        decode_currencies(&raw).unwrap().currencies
    }

    #[test]
    fn test_new_outside_runtime() {
        let result = CurrencyStore::new(Arc::new(MemoryStorage::new()), StoreOptions::default());
        assert!(matches!(result, Err(StoreError::RuntimeUnavailable)));
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (_, store) = memory_store();
        let state = store.snapshot();

        assert!(state.currencies.is_empty());
        assert!(state.loading);
        assert!(!state.hydrated);
        assert_eq!(state.error, None);
        assert_eq!(state.revision, 0);
    }

    #[tokio::test]
    async fn test_set_currencies_replaces_and_persists() {
        let (storage, store) = memory_store();
        store.set_error(Some("old failure".into()));

        let task = store.set_currencies(crypto_list());
        let state = store.snapshot();
        assert_eq!(&state.currencies[..], crypto_list().as_slice());
        assert_eq!(state.error, None);

        let outcome = task.wait().await.unwrap();
        assert!(matches!(outcome, PersistOutcome::Written { revision: 1, .. }));
        assert_eq!(stored(&storage).await, crypto_list());
    }

    #[tokio::test]
    async fn test_clear_currencies() {
        let (storage, store) = memory_store();
        store.set_currencies(fiat_list()).wait().await.unwrap();

        store.clear_currencies().wait().await.unwrap();

        assert!(store.snapshot().currencies.is_empty());
        assert!(stored(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_last_replacement_wins() {
        let (storage, store) = memory_store();

        let tasks = vec![
            store.clear_currencies(),
            store.set_currencies(fiat_list()),
            store.set_currencies(crypto_list()),
        ];
        for task in tasks {
            task.wait().await.unwrap();
        }

        assert_eq!(&store.snapshot().currencies[..], crypto_list().as_slice());
        assert_eq!(stored(&storage).await, crypto_list());
    }

    #[tokio::test]
    async fn test_stale_write_is_skipped() {
        let (storage, store) = memory_store();
        let older: Arc<[CurrencyRecord]> = Arc::from(fiat_list());
        let newer: Arc<[CurrencyRecord]> = Arc::from(crypto_list());

        let first = store.inner.write_through(newer, 2).await.unwrap();
        let second = store.inner.write_through(older, 1).await.unwrap();

        assert!(matches!(first, PersistOutcome::Written { revision: 2, .. }));
        assert_eq!(second, PersistOutcome::Superseded { revision: 1 });
        assert_eq!(stored(&storage).await, crypto_list());
    }

    #[tokio::test]
    async fn test_dropped_task_still_writes() {
        let (storage, store) = memory_store();

        drop(store.set_currencies(crypto_list()));

        for _ in 0..100 {
            if storage.snapshot(DEFAULT_STORAGE_KEY).await.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(stored(&storage).await, crypto_list());
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshot() {
        let (_, store) = memory_store();
        let mut rx = store.subscribe();

        let _ = store.set_currencies(crypto_list());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_count(), crypto_list().len());
    }

    #[tokio::test]
    async fn test_set_loading_and_error() {
        let (_, store) = memory_store();

        store.set_loading(false);
        store.set_error(Some("boom".into()));
        assert!(!store.snapshot().loading);
        assert_eq!(store.snapshot().error.as_deref(), Some("boom"));

        store.set_error(None);
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_hydrate_restores_collection() {
        let (_, store) = store_with_entry(&encode_currencies(&fiat_list()).unwrap());

        let outcome = store.hydrate().await.unwrap();

        assert_eq!(
            outcome,
            HydrationOutcome::Restored {
                count: fiat_list().len(),
                migrated: false
            }
        );
        let state = store.snapshot();
        assert!(state.hydrated);
        assert!(!state.loading);
        assert_eq!(&state.currencies[..], fiat_list().as_slice());
    }

    #[tokio::test]
    async fn test_hydrate_empty_storage() {
        let (_, store) = memory_store();

        assert_eq!(store.hydrate().await.unwrap(), HydrationOutcome::Empty);
        let state = store.snapshot();
        assert!(state.hydrated);
        assert!(!state.loading);
        assert!(state.currencies.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_runs_once() {
        let (_, store) = memory_store();

        store.hydrate().await.unwrap();
        assert_eq!(store.hydrate().await.unwrap(), HydrationOutcome::AlreadyHydrated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_hydrate_waits_for_first() {
        let raw = encode_currencies(&fiat_list()).unwrap();
        let storage = Arc::new(SlowStorage {
            inner: MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, raw),
            delay: std::time::Duration::from_millis(200),
        });
        let store = CurrencyStore::new(storage, StoreOptions::default()).unwrap();

        let (first, (second, seen)) = tokio::join!(store.hydrate(), async {
            let outcome = store.hydrate().await.unwrap();
            (outcome, store.snapshot())
        });

        assert!(matches!(first.unwrap(), HydrationOutcome::Restored { .. }));
        assert_eq!(second, HydrationOutcome::AlreadyHydrated);
        assert!(seen.hydrated);
        assert_eq!(seen.currencies.to_vec(), fiat_list());
    }

    #[tokio::test]
    async fn test_hydrate_discards_corrupt_entry() {
        let (storage, store) = store_with_entry("{\"currencies\": [tru");

        let outcome = store.hydrate().await.unwrap();

        assert!(matches!(outcome, HydrationOutcome::DiscardedCorrupt { .. }));
        let state = store.snapshot();
        assert!(state.hydrated);
        assert!(state.currencies.is_empty());
        assert_eq!(state.error, None);
        assert_eq!(storage.snapshot(DEFAULT_STORAGE_KEY).await, None);
    }

    #[tokio::test]
    async fn test_hydrate_upgrades_legacy_envelope() {
        let legacy = r#"{"state":{"currencies":[{"id":"BTC","name":"Bitcoin","symbol":"BTC"}]},"version":0}"#;
        let (storage, store) = store_with_entry(legacy);

        let outcome = store.hydrate().await.unwrap();

        assert_eq!(outcome, HydrationOutcome::Restored { count: 1, migrated: true });
        let raw = storage.snapshot(DEFAULT_STORAGE_KEY).await.unwrap();
        assert_eq!(decode_currencies(&raw).unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_mutation_before_hydration_wins() {
        let (_, store) = store_with_entry(&encode_currencies(&crypto_list()).unwrap());

        let _ = store.set_currencies(fiat_list());
        let outcome = store.hydrate().await.unwrap();

        assert_eq!(outcome, HydrationOutcome::KeptLocalChanges);
        let state = store.snapshot();
        assert!(state.hydrated);
        assert_eq!(&state.currencies[..], fiat_list().as_slice());
    }

    #[tokio::test]
    async fn test_hydrate_read_failure() {
        let storage = Arc::new(FailingStorage {
            fail_reads: true,
            ..Default::default()
        });
        let store = CurrencyStore::new(storage, StoreOptions::default()).unwrap();

        let result = store.hydrate().await;

        assert!(matches!(result, Err(StoreError::Storage(_))));
        let state = store.snapshot();
        assert!(state.hydrated);
        assert!(!state.loading);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_and_reports() {
        let storage = Arc::new(FailingStorage {
            fail_writes: true,
            ..Default::default()
        });
        let store = CurrencyStore::new(storage, StoreOptions::default()).unwrap();

        let result = store.set_currencies(crypto_list()).wait().await;

        assert!(matches!(result, Err(StoreError::Storage(_))));
        let state = store.snapshot();
        assert_eq!(&state.currencies[..], crypto_list().as_slice());
        assert!(state.error.as_deref().unwrap().starts_with("Failed to save currencies"));
    }

    #[tokio::test]
    async fn test_write_failure_silent_when_not_reported() {
        let storage = Arc::new(FailingStorage {
            fail_writes: true,
            ..Default::default()
        });
        let options = StoreOptions::default().report_persist_failures(false);
        let store = CurrencyStore::new(storage, options).unwrap();

        assert!(store.set_currencies(crypto_list()).wait().await.is_err());
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        let options = StoreOptions::default().storage_key("other-key");
        let store = CurrencyStore::new(storage.clone(), options).unwrap();

        store.set_currencies(crypto_list()).wait().await.unwrap();

        assert!(storage.snapshot("other-key").await.is_some());
        assert_eq!(storage.snapshot(DEFAULT_STORAGE_KEY).await, None);
    }

    #[tokio::test]
    async fn test_filtered_is_memoized() {
        let (_, store) = memory_store();
        let _ = store.set_currencies(crypto_list());

        let query = SearchQuery::new("bit");
        let (_, first) = store.filtered(&query);
        let (_, second) = store.filtered(&query);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2); // Bitcoin, Bitcoin Cash

        let (state, all) = store.filtered(&SearchQuery::new("  "));
        assert!(Arc::ptr_eq(&all, &state.currencies));

        let _ = store.set_currencies(fiat_list());
        let (state, none) = store.filtered(&query);
        assert!(none.is_empty());
        assert_eq!(state.revision, 2);
    }
}
