//! # Currency Commands
//!
//! The read and write surface a list screen talks to.
//!
//! ## Read Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Currency List Flow                                   │
//! │                                                                         │
//! │  User types "bit"                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueryDebouncer settles after 300ms                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_currencies(store, Some("bit"))                                    │
//! │       │  store.filtered(query): one snapshot + its memoized matches    │
//! │       │  loading / error / totalCount read from that same snapshot     │
//! │       ▼                                                                 │
//! │  CurrenciesResponse ──► list_view() ──► Loading | Error | Empty | Rows │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Flow
//! Each insert/clear replaces the whole collection. The new list is visible
//! to readers immediately; the returned [`PersistTask`] completes when the
//! durable write does.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use coinshelf_core::reference::{combined_list, crypto_list, fiat_list};
use coinshelf_core::{CurrencyKind, CurrencyRecord, SearchQuery};

use crate::error::ApiError;
use crate::state::{CurrencyStore, PersistOutcome, PersistTask};

/// Shown while hydration is in progress.
pub const LOADING_MESSAGE: &str = "Loading currencies...";

/// Shown when the list is empty while the search box has text.
pub const NO_MATCHES_MESSAGE: &str = "No currencies found matching your search";

/// Shown when the collection itself is empty.
pub const NO_CURRENCIES_MESSAGE: &str = "No currencies available";

// =============================================================================
// DTOs
// =============================================================================

/// What a list screen reads.
///
/// ## Serialization
/// ```json
/// {
///   "currencies": [{ "id": "BTC", "name": "Bitcoin", "symbol": "BTC" }],
///   "loading": false,
///   "error": null,
///   "totalCount": 23
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrenciesResponse {
    /// Records matching the query, in collection order.
    pub currencies: Arc<[CurrencyRecord]>,
    pub loading: bool,
    pub error: Option<String>,

    /// Size of the unfiltered collection.
    pub total_count: usize,
}

/// One rendered row: avatar initial, name and the code shown beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRowDto {
    pub id: String,
    pub name: String,
    pub display_code: String,
    pub initial: Option<String>,
    pub kind: CurrencyKind,
}

impl From<&CurrencyRecord> for CurrencyRowDto {
    fn from(record: &CurrencyRecord) -> Self {
        CurrencyRowDto {
            id: record.id().to_string(),
            name: record.name().to_string(),
            display_code: record.display_code().to_string(),
            initial: record.avatar_initial(),
            kind: record.kind(),
        }
    }
}

/// Which state the list should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ListView {
    Loading,
    Error { message: String },
    Empty { message: String },
    Rows { rows: Vec<CurrencyRowDto> },
}

// =============================================================================
// Read
// =============================================================================

/// Returns the visible currencies for an optional raw query.
///
/// ## Arguments
/// * `query` - Search box contents. `None`, empty or whitespace means no
///   filter.
///
/// ## Returns
/// The filtered list plus the store's loading/error flags.
pub fn get_currencies(store: &CurrencyStore, query: Option<&str>) -> CurrenciesResponse {
    let query = SearchQuery::new(query.unwrap_or_default());
    let (state, currencies) = store.filtered(&query);

    debug!(
        query = %query,
        matched = currencies.len(),
        total = state.total_count(),
        "get_currencies command"
    );

    CurrenciesResponse {
        currencies,
        loading: state.loading,
        error: state.error.clone(),
        total_count: state.total_count(),
    }
}

/// Classifies a response into the view a list screen renders.
///
/// Loading wins over an error, and an error wins over an empty list.
pub fn list_view(response: &CurrenciesResponse, query: Option<&str>) -> ListView {
    if response.loading {
        return ListView::Loading;
    }

    if let Some(message) = &response.error {
        return ListView::Error {
            message: message.clone(),
        };
    }

    if response.currencies.is_empty() {
        // Any typed text counts, even whitespace the filter ignores.
        let searching = query.is_some_and(|q| !q.is_empty());
        let message = if searching {
            NO_MATCHES_MESSAGE
        } else {
            NO_CURRENCIES_MESSAGE
        };
        return ListView::Empty {
            message: message.to_string(),
        };
    }

    ListView::Rows {
        rows: response.currencies.iter().map(CurrencyRowDto::from).collect(),
    }
}

// =============================================================================
// Write
// =============================================================================

/// Replaces the collection with the crypto reference list.
pub fn insert_crypto_data(store: &CurrencyStore) -> PersistTask {
    info!("Inserting crypto reference data");
    store.set_currencies(crypto_list())
}

/// Replaces the collection with the fiat reference list.
pub fn insert_fiat_data(store: &CurrencyStore) -> PersistTask {
    info!("Inserting fiat reference data");
    store.set_currencies(fiat_list())
}

/// Replaces the collection with crypto followed by fiat.
pub fn insert_both_data(store: &CurrencyStore) -> PersistTask {
    info!("Inserting crypto and fiat reference data");
    store.set_currencies(combined_list())
}

/// Empties the collection.
pub fn clear_data(store: &CurrencyStore) -> PersistTask {
    info!("Clearing currency data");
    store.clear_currencies()
}

/// Waits for a mutation's durable write.
pub async fn await_persist(task: PersistTask) -> Result<PersistOutcome, ApiError> {
    Ok(task.wait().await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HydrationOutcome, StoreOptions};
    use coinshelf_db::{Database, DbConfig, KeyValueStorage, MemoryStorage};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn store() -> CurrencyStore {
        CurrencyStore::new(Arc::new(MemoryStorage::new()), StoreOptions::default()).unwrap()
    }

    fn response(currencies: Vec<CurrencyRecord>) -> CurrenciesResponse {
        CurrenciesResponse {
            total_count: currencies.len(),
            currencies: Arc::from(currencies),
            loading: false,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_clear_then_fiat_then_crypto() {
        let store = store();
        store.hydrate().await.unwrap();

        clear_data(&store);
        insert_fiat_data(&store);
        let last = insert_crypto_data(&store);
        await_persist(last).await.unwrap();

        let response = get_currencies(&store, None);
        assert_eq!(response.currencies.to_vec(), crypto_list());
        assert_eq!(response.total_count, crypto_list().len());
    }

    #[tokio::test]
    async fn test_insert_both_is_crypto_then_fiat() {
        let store = store();
        store.hydrate().await.unwrap();

        await_persist(insert_both_data(&store)).await.unwrap();

        let response = get_currencies(&store, Some("   "));
        let crypto = crypto_list();
        assert_eq!(response.currencies.len(), crypto.len() + fiat_list().len());
        assert_eq!(&response.currencies[..crypto.len()], crypto.as_slice());
        assert!(response.currencies[crypto.len()..].iter().all(|c| c.is_fiat()));
    }

    #[tokio::test]
    async fn test_query_filters_but_total_is_unfiltered() {
        let store = store();
        store.hydrate().await.unwrap();
        insert_both_data(&store);

        let response = get_currencies(&store, Some("Bitcoin"));
        let names: Vec<&str> = response.currencies.iter().map(|c| c.name()).collect();

        assert_eq!(names, vec!["Bitcoin", "Bitcoin Cash"]);
        assert_eq!(response.total_count, combined_list().len());
    }

    #[tokio::test]
    async fn test_loading_before_hydration() {
        let store = store();
        let response = get_currencies(&store, None);

        assert!(response.loading);
        assert_eq!(list_view(&response, None), ListView::Loading);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_response_is_consistent_during_writes() {
        let store = store();
        store.hydrate().await.unwrap();
        insert_crypto_data(&store);

        let stop = Arc::new(AtomicBool::new(false));
        let writer = {
            let store = store.clone();
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    store.set_currencies(crypto_list());
                    store.set_currencies(fiat_list());
                }
            })
        };

        for _ in 0..20_000 {
            let response = get_currencies(&store, None);
            assert_eq!(response.currencies.len(), response.total_count);
        }

        stop.store(true, Ordering::Relaxed);
        writer.join().unwrap();
    }

    #[test]
    fn test_list_view_empty_messages() {
        let empty = response(Vec::new());

        assert_eq!(
            list_view(&empty, Some("zzz")),
            ListView::Empty {
                message: NO_MATCHES_MESSAGE.to_string()
            }
        );
        assert_eq!(
            list_view(&empty, Some("  ")),
            ListView::Empty {
                message: NO_MATCHES_MESSAGE.to_string()
            }
        );
        assert_eq!(
            list_view(&empty, Some("")),
            ListView::Empty {
                message: NO_CURRENCIES_MESSAGE.to_string()
            }
        );
        assert_eq!(
            list_view(&empty, None),
            ListView::Empty {
                message: NO_CURRENCIES_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn test_list_view_error_and_rows() {
        let mut failed = response(crypto_list());
        failed.error = Some("disk full".to_string());
        assert_eq!(
            list_view(&failed, None),
            ListView::Error {
                message: "disk full".to_string()
            }
        );

        let ok = response(vec![CurrencyRecord::fiat("USD", "United States Dollar", "$", "USD")]);
        let ListView::Rows { rows } = list_view(&ok, None) else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].initial.as_deref(), Some("U"));
        assert_eq!(rows[0].display_code, "USD");
        assert_eq!(rows[0].kind, CurrencyKind::Fiat);
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(response(Vec::new())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currencies": [],
                "loading": false,
                "error": null,
                "totalCount": 0
            })
        );

        let view = serde_json::to_value(ListView::Loading).unwrap();
        assert_eq!(view, serde_json::json!({ "view": "loading" }));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_stores() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage: Arc<dyn KeyValueStorage> = Arc::new(db.key_values());

        let first = CurrencyStore::new(Arc::clone(&storage), StoreOptions::default()).unwrap();
        first.hydrate().await.unwrap();
        let outcome = await_persist(insert_fiat_data(&first)).await.unwrap();
        assert!(matches!(outcome, PersistOutcome::Written { revision: 1, .. }));

        let second = CurrencyStore::new(storage, StoreOptions::default()).unwrap();
        let hydrated = second.hydrate().await.unwrap();
        assert_eq!(
            hydrated,
            HydrationOutcome::Restored {
                count: fiat_list().len(),
                migrated: false
            }
        );
        assert_eq!(get_currencies(&second, None).currencies.to_vec(), fiat_list());
    }
}
