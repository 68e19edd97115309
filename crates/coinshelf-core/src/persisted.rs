//! # Persisted Envelope
//!
//! The JSON block the currency collection is stored as.
//!
//! ## Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persisted Formats                                    │
//! │                                                                         │
//! │  version 1 (written today)                                             │
//! │  { "version": 1, "currencies": [ {...}, {...} ] }                      │
//! │                                                                         │
//! │  version 0 (legacy, read only)                                         │
//! │  { "state": { "currencies": [ {...} ] }, "version": 0 }                │
//! │                                                                         │
//! │  decode_currencies(raw)                                                │
//! │       │                                                                 │
//! │       ├── not JSON ─────────────► CoreError::MalformedPayload          │
//! │       ├── unknown shape ────────► CoreError::UnexpectedShape           │
//! │       ├── version > supported ──► CoreError::UnsupportedVersion        │
//! │       └── ok ───────────────────► PersistedCurrencies { version, .. }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the collection is persisted. Loading/error/hydration flags are
//! process state and start fresh on every launch.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::CurrencyRecord;
use crate::PERSISTED_SCHEMA_VERSION;

/// A decoded persisted collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCurrencies {
    /// Schema version the block was written with.
    pub version: u32,

    /// The records, in stored order.
    pub currencies: Vec<CurrencyRecord>,
}

impl PersistedCurrencies {
    /// True when the block predates the current schema and should be
    /// rewritten.
    pub fn needs_upgrade(&self) -> bool {
        self.version < PERSISTED_SCHEMA_VERSION
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    currencies: &'a [CurrencyRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Current {
        #[serde(default)]
        version: Option<u32>,
        currencies: Vec<CurrencyRecord>,
    },
    Legacy {
        state: LegacyState,
        #[serde(default)]
        version: u32,
    },
}

#[derive(Deserialize)]
struct LegacyState {
    currencies: Vec<CurrencyRecord>,
}

/// Serializes `records` in the current envelope format.
///
/// ## Example
/// ```rust
/// use coinshelf_core::{encode_currencies, CurrencyRecord};
///
/// let json = encode_currencies(&[CurrencyRecord::crypto("BTC", "Bitcoin", "BTC")]).unwrap();
/// assert_eq!(json, r#"{"version":1,"currencies":[{"id":"BTC","name":"Bitcoin","symbol":"BTC"}]}"#);
/// ```
pub fn encode_currencies(records: &[CurrencyRecord]) -> CoreResult<String> {
    serde_json::to_string(&EnvelopeRef {
        version: PERSISTED_SCHEMA_VERSION,
        currencies: records,
    })
    .map_err(|e| CoreError::EncodeFailed(e.to_string()))
}

/// Parses a stored block in either the current or the legacy format.
///
/// ## Returns
/// * `Ok(PersistedCurrencies)` - records plus the version they were stored in
/// * `Err(CoreError)` - the block cannot be trusted and should be discarded
pub fn decode_currencies(raw: &str) -> CoreResult<PersistedCurrencies> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CoreError::MalformedPayload(e.to_string()))?;

    let envelope: Envelope = serde_json::from_value(value).map_err(|e| {
        CoreError::UnexpectedShape(e.to_string())
    })?;

    let (version, currencies) = match envelope {
        Envelope::Current {
            version,
            currencies,
        } => (version.unwrap_or(PERSISTED_SCHEMA_VERSION), currencies),
        Envelope::Legacy { state, version } => (version, state.currencies),
    };

    if version > PERSISTED_SCHEMA_VERSION {
        return Err(CoreError::UnsupportedVersion {
            found: version,
            supported: PERSISTED_SCHEMA_VERSION,
        });
    }

    Ok(PersistedCurrencies {
        version,
        currencies,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurrencyKind;

    #[test]
    fn test_current_format() {
        let raw = r#"{"version":1,"currencies":[
            {"id":"BTC","name":"Bitcoin","symbol":"BTC"},
            {"id":"USD","name":"United States Dollar","symbol":"$","code":"USD"}
        ]}"#;

        let decoded = decode_currencies(raw).unwrap();
        assert_eq!(decoded.version, 1);
        assert!(!decoded.needs_upgrade());
        assert_eq!(decoded.currencies.len(), 2);
        assert_eq!(decoded.currencies[0].kind(), CurrencyKind::Crypto);
        assert_eq!(decoded.currencies[1].kind(), CurrencyKind::Fiat);
    }

    #[test]
    fn test_written_block_reads_back() {
        let records = vec![
            CurrencyRecord::crypto("ETH", "Ethereum", "ETH"),
            CurrencyRecord::fiat("EUR", "Euro", "€", "EUR"),
        ];

        let decoded = decode_currencies(&encode_currencies(&records).unwrap()).unwrap();
        assert_eq!(decoded.currencies, records);
    }

    #[test]
    fn test_legacy_format() {
        let raw = r#"{"state":{"currencies":[{"id":"BTC","name":"Bitcoin","symbol":"BTC"}]},"version":0}"#;

        let decoded = decode_currencies(raw).unwrap();
        assert_eq!(decoded.version, 0);
        assert!(decoded.needs_upgrade());
        assert_eq!(decoded.currencies[0].id(), "BTC");
    }

    #[test]
    fn test_missing_version_reads_as_current() {
        let decoded = decode_currencies(r#"{"currencies":[]}"#).unwrap();
        assert_eq!(decoded.version, PERSISTED_SCHEMA_VERSION);
        assert!(decoded.currencies.is_empty());
    }

    #[test]
    fn test_not_json() {
        let err = decode_currencies("{not json").unwrap_err();
        assert!(matches!(err, CoreError::MalformedPayload(_)));
    }

    #[test]
    fn test_wrong_shape() {
        assert!(matches!(
            decode_currencies(r#"{"currencies":"nope"}"#).unwrap_err(),
            CoreError::UnexpectedShape(_)
        ));
        assert!(matches!(
            decode_currencies("[1,2,3]").unwrap_err(),
            CoreError::UnexpectedShape(_)
        ));
        assert!(matches!(
            decode_currencies(r#"{"currencies":[{"id":"BTC"}]}"#).unwrap_err(),
            CoreError::UnexpectedShape(_)
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = decode_currencies(r#"{"version":7,"currencies":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedVersion {
                found: 7,
                supported: 1
            }
        ));
    }
}
