//! # Search State
//!
//! The reactive side of search: debouncing raw keystrokes and caching the
//! filtered list between renders.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Search Input → Visible Rows                          │
//! │                                                                         │
//! │  keystrokes "b" "bi" "bit"                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueryDebouncer ── quiet for 300ms? ──► settled SearchQuery("bit")     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FilteredCurrencies                                                    │
//! │       │  same (revision, query) as last time? ──► cached Arc           │
//! │       │  otherwise ──► filter_currencies(state.currencies, query)      │
//! │       ▼                                                                 │
//! │  Arc<[CurrencyRecord]> handed to the list                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use coinshelf_core::{filter_currencies, CurrencyRecord, SearchQuery};

use crate::state::currency::CurrencyState;

// =============================================================================
// Memoized Filter
// =============================================================================

/// Caches the last filter result.
///
/// The filter itself is pure; this only avoids recomputing it when neither
/// the collection nor the normalized query changed.
#[derive(Debug, Default)]
pub struct FilteredCurrencies {
    last: Option<Memo>,
}

#[derive(Debug)]
struct Memo {
    revision: u64,
    query: SearchQuery,
    result: Arc<[CurrencyRecord]>,
}

impl FilteredCurrencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records of `state` matching `query`.
    ///
    /// An empty query returns `state.currencies` itself.
    pub fn compute(&mut self, state: &CurrencyState, query: &SearchQuery) -> Arc<[CurrencyRecord]> {
        if query.is_empty() {
            return Arc::clone(&state.currencies);
        }

        if let Some(memo) = &self.last {
            if memo.revision == state.revision && memo.query == *query {
                return Arc::clone(&memo.result);
            }
        }

        let result: Arc<[CurrencyRecord]> = filter_currencies(&state.currencies, query)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            query = %query,
            revision = state.revision,
            matched = result.len(),
            total = state.total_count(),
            "Filtered currencies"
        );

        self.last = Some(Memo {
            revision: state.revision,
            query: query.clone(),
            result: Arc::clone(&result),
        });
        result
    }
}

// =============================================================================
// Query Debouncer
// =============================================================================

/// Turns a stream of raw keystrokes into settled search queries.
///
/// A query settles once no new input has arrived for `delay`. Only changes
/// to the normalized query are published, so typing a trailing space does
/// not trigger a refilter.
///
/// ## Example
/// ```rust,ignore
/// let debouncer = QueryDebouncer::spawn(Duration::from_millis(300));
/// let mut settled = debouncer.subscribe();
///
/// debouncer.push("bit");
/// settled.changed().await?;
/// assert_eq!(settled.borrow().as_str(), "bit");
/// ```
#[derive(Debug)]
pub struct QueryDebouncer {
    raw_tx: watch::Sender<String>,
    settled_rx: watch::Receiver<SearchQuery>,
    task: JoinHandle<()>,
}

impl QueryDebouncer {
    /// Starts the debounce task on the current Tokio runtime.
    pub fn spawn(delay: Duration) -> Self {
        let (raw_tx, raw_rx) = watch::channel(String::new());
        let (settled_tx, settled_rx) = watch::channel(SearchQuery::default());
        let task = tokio::spawn(debounce_loop(raw_rx, settled_tx, delay));

        QueryDebouncer {
            raw_tx,
            settled_rx,
            task,
        }
    }

    /// Records the current contents of the search box.
    pub fn push(&self, raw: impl Into<String>) {
        self.raw_tx.send_replace(raw.into());
    }

    /// The most recently settled query.
    pub fn settled(&self) -> SearchQuery {
        self.settled_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchQuery> {
        self.settled_rx.clone()
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn debounce_loop(
    mut raw_rx: watch::Receiver<String>,
    settled_tx: watch::Sender<SearchQuery>,
    delay: Duration,
) {
    while raw_rx.changed().await.is_ok() {
        // Every new keystroke restarts the quiet period.
        loop {
            tokio::select! {
                changed = raw_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(delay) => break,
            }
        }

        let query = SearchQuery::new(&raw_rx.borrow_and_update());
        settled_tx.send_if_modified(|current| {
            if *current == query {
                return false;
            }
            debug!(query = %query, "Search query settled");
            *current = query;
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
    use coinshelf_core::reference::combined_list;
    use tokio::time::Instant;

    fn state(revision: u64, currencies: Vec<CurrencyRecord>) -> CurrencyState {
        CurrencyState {
            currencies: Arc::from(currencies),
            loading: false,
            error: None,
            hydrated: true,
            revision,
        }
    }

    #[test]
    fn test_memo_reuses_result() {
        let mut filtered = FilteredCurrencies::new();
        let state = state(1, combined_list());
        let query = SearchQuery::new("dollar");

        let first = filtered.compute(&state, &query);
        let second = filtered.compute(&state, &query);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.iter().all(|c| c.name().to_lowercase().contains("dollar")));
    }

    #[test]
    fn test_memo_invalidated_by_revision_and_query() {
        let mut filtered = FilteredCurrencies::new();
        let before = state(1, combined_list());
        let after = state(2, Vec::new());
        let query = SearchQuery::new("euro");

        assert_eq!(filtered.compute(&before, &query).len(), 1);
        assert!(filtered.compute(&after, &query).is_empty());
        assert!(filtered.compute(&after, &SearchQuery::new("usd")).is_empty());
    }

    #[test]
    fn test_empty_query_shares_collection() {
        let mut filtered = FilteredCurrencies::new();
        let state = state(3, combined_list());

        let all = filtered.compute(&state, &SearchQuery::new(""));
        assert!(Arc::ptr_eq(&all, &state.currencies));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_publishes_last_keystroke() {
        let debouncer = QueryDebouncer::spawn(Duration::from_millis(300));
        let mut settled = debouncer.subscribe();
        let start = Instant::now();

        debouncer.push("b");
        debouncer.push("bit");
        debouncer.push("  BITCOIN ");

        settled.changed().await.unwrap();
        assert_eq!(settled.borrow_and_update().as_str(), "bitcoin");
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_extend_quiet_period() {
        let debouncer = QueryDebouncer::spawn(Duration::from_millis(300));

        debouncer.push("e");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(debouncer.settled().is_empty());

        debouncer.push("eth");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(debouncer.settled().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(debouncer.settled().as_str(), "eth");
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_normalized_query_not_republished() {
        let debouncer = QueryDebouncer::spawn(Duration::from_millis(300));
        let mut settled = debouncer.subscribe();

        debouncer.push("btc");
        settled.changed().await.unwrap();
        settled.borrow_and_update();

        debouncer.push(" BTC ");
        let republished =
            tokio::time::timeout(Duration::from_secs(1), settled.changed()).await;
        assert!(republished.is_err());
        assert_eq!(debouncer.settled().as_str(), "btc");
    }
}
