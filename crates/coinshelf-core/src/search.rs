//! # Currency Search
//!
//! Incremental, case-insensitive filtering of the currency list.
//!
//! ## Match Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Search Pipeline                                      │
//! │                                                                         │
//! │  Raw input "  Classic "                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Normalize: trim + lowercase ──► "classic"                             │
//! │       │                                                                 │
//! │       ├── empty? ──► return the whole list unchanged                   │
//! │       │                                                                 │
//! │       ▼  (for each record, in list order)                              │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │ 1. NamePrefix    name starts with "classic"                   │     │
//! │  │ 2. WordBoundary  name contains " classic"                     │     │
//! │  │ 3. SymbolPrefix  crypto: symbol starts with "classic"         │     │
//! │  │    CodePrefix    fiat:   code starts with "classic"           │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Any rule fired? keep : drop                                           │
//! │                                                                         │
//! │  "Ethereum Classic"  ✓ (rule 2)                                        │
//! │  "Tronclassic"       ✗ ("classic" is inside the word)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Output is a subsequence of the input: no sorting, no deduplication
//! - Pure: same list + same normalized query = same result
//! - Queries are compared literally; `.`, `$` and friends carry no pattern
//!   meaning

use crate::types::CurrencyRecord;

// =============================================================================
// Search Query
// =============================================================================

/// A normalized search query.
///
/// Normalization happens once here so that the per-record checks are plain
/// string comparisons.
///
/// ## Example
/// ```rust
/// use coinshelf_core::SearchQuery;
///
/// let query = SearchQuery::new("  BitCoin ");
/// assert_eq!(query.as_str(), "bitcoin");
/// assert!(!query.is_empty());
///
/// assert!(SearchQuery::new("   ").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    normalized: String,
    /// `" " + normalized`, the needle for the word-boundary rule.
    word_needle: String,
}

impl SearchQuery {
    /// Trims and lower-cases `raw`.
    pub fn new(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        let word_needle = format!(" {normalized}");
        SearchQuery {
            normalized,
            word_needle,
        }
    }

    /// The normalized query text.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// True when the query is blank after trimming.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery::new("")
    }
}

impl From<&str> for SearchQuery {
    fn from(raw: &str) -> Self {
        SearchQuery::new(raw)
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

// =============================================================================
// Match Rules
// =============================================================================

/// The rule that accepted a record, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Lower-cased name starts with the query.
    NamePrefix,

    /// Lower-cased name contains a space immediately followed by the query.
    WordBoundary,

    /// Crypto record whose lower-cased symbol starts with the query.
    SymbolPrefix,

    /// Fiat record whose lower-cased code starts with the query.
    CodePrefix,
}

/// Returns the first rule under which `record` matches `query`.
///
/// Callers that only need a yes/no answer should use [`matches`]. An empty
/// query trivially satisfies [`MatchRule::NamePrefix`].
///
/// ## Example
/// ```rust
/// use coinshelf_core::{match_rule, CurrencyRecord, MatchRule, SearchQuery};
///
/// let etc = CurrencyRecord::crypto("ETC", "Ethereum Classic", "ETC");
///
/// assert_eq!(match_rule(&etc, &SearchQuery::new("ether")), Some(MatchRule::NamePrefix));
/// assert_eq!(match_rule(&etc, &SearchQuery::new("classic")), Some(MatchRule::WordBoundary));
/// assert_eq!(match_rule(&etc, &SearchQuery::new("xyz")), None);
/// ```
pub fn match_rule(record: &CurrencyRecord, query: &SearchQuery) -> Option<MatchRule> {
    let name = record.name().to_lowercase();

    if name.starts_with(&query.normalized) {
        return Some(MatchRule::NamePrefix);
    }

    if name.contains(&query.word_needle) {
        return Some(MatchRule::WordBoundary);
    }

    // Fiat symbols are glyphs like "$"; only the code takes part in search.
    match record {
        CurrencyRecord::Crypto(c) if c.symbol.to_lowercase().starts_with(&query.normalized) => {
            Some(MatchRule::SymbolPrefix)
        }
        CurrencyRecord::Fiat(f) if f.code.to_lowercase().starts_with(&query.normalized) => {
            Some(MatchRule::CodePrefix)
        }
        _ => None,
    }
}

/// True when any rule accepts `record` for `query`.
pub fn matches(record: &CurrencyRecord, query: &SearchQuery) -> bool {
    match_rule(record, query).is_some()
}

/// Filters `records` down to those matching `query`, preserving order.
///
/// ## Arguments
/// * `records` - The full, unfiltered collection
/// * `query` - Normalized query; an empty query keeps every record
///
/// ## Returns
/// References into `records`, in their original order.
///
/// ## Performance
/// One pass over the list with a lower-case copy of each name. Lists of a
/// few thousand entries filter well under a frame.
pub fn filter_currencies<'a>(
    records: &'a [CurrencyRecord],
    query: &SearchQuery,
) -> Vec<&'a CurrencyRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    records.iter().filter(|r| matches(r, query)).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
