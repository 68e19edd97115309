//! # Domain Types
//!
//! Currency records shown in the list.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                      ┌──────────────────────┐                           │
//! │                      │    CurrencyRecord    │                           │
//! │                      └──────────┬───────────┘                           │
//! │                 ┌───────────────┴───────────────┐                       │
//! │                 ▼                               ▼                       │
//! │       ┌─────────────────┐             ┌─────────────────┐               │
//! │       │ CryptoCurrency  │             │  FiatCurrency   │               │
//! │       │  ─────────────  │             │  ─────────────  │               │
//! │       │  id             │             │  id             │               │
//! │       │  name           │             │  name           │               │
//! │       │  symbol  (BTC)  │             │  symbol  ($)    │               │
//! │       │                 │             │  code    (USD)  │               │
//! │       └─────────────────┘             └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Records are stored and exchanged as plain JSON objects without a type
//! tag. A record carrying `code` is fiat, anything else is crypto:
//!
//! ```json
//! [
//!   { "id": "BTC", "name": "Bitcoin", "symbol": "BTC" },
//!   { "id": "USD", "name": "United States Dollar", "symbol": "$", "code": "USD" }
//! ]
//! ```
//!
//! The variant is decided once at decode time, so nothing downstream has to
//! check for the presence of `code`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Currency Kind
// =============================================================================

/// Which family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CurrencyKind {
    Crypto,
    Fiat,
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyKind::Crypto => write!(f, "crypto"),
            CurrencyKind::Fiat => write!(f, "fiat"),
        }
    }
}

// =============================================================================
// Crypto Currency
// =============================================================================

/// A cryptocurrency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CryptoCurrency {
    /// Stable identifier, used as the list row key.
    pub id: String,

    /// Display name (e.g. "Bitcoin").
    pub name: String,

    /// Ticker (e.g. "BTC"). Consulted by the prefix search rule.
    pub symbol: String,
}

// =============================================================================
// Fiat Currency
// =============================================================================

/// A fiat currency entry.
///
/// `symbol` is usually a glyph such as `$` or `€` and is display-only.
/// Prefix search goes through `code` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiatCurrency {
    pub id: String,
    pub name: String,
    pub symbol: String,

    /// ISO 4217 style code (e.g. "USD").
    pub code: String,
}

// =============================================================================
// Currency Record
// =============================================================================

/// One row of the currency list.
///
/// ## Decoding Order
/// `Fiat` is listed first so that untagged decoding tries the stricter shape
/// before falling back to `Crypto`. An object with `code` therefore always
/// lands in `Fiat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum CurrencyRecord {
    Fiat(FiatCurrency),
    Crypto(CryptoCurrency),
}

impl CurrencyRecord {
    /// Creates a crypto record.
    ///
    /// ## Example
    /// ```rust
    /// use coinshelf_core::{CurrencyKind, CurrencyRecord};
    ///
    /// let btc = CurrencyRecord::crypto("BTC", "Bitcoin", "BTC");
    /// assert_eq!(btc.kind(), CurrencyKind::Crypto);
    /// ```
    pub fn crypto(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        CurrencyRecord::Crypto(CryptoCurrency {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
        })
    }

    /// Creates a fiat record.
    pub fn fiat(
        id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        CurrencyRecord::Fiat(FiatCurrency {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            code: code.into(),
        })
    }

    pub fn kind(&self) -> CurrencyKind {
        match self {
            CurrencyRecord::Crypto(_) => CurrencyKind::Crypto,
            CurrencyRecord::Fiat(_) => CurrencyKind::Fiat,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CurrencyRecord::Crypto(c) => &c.id,
            CurrencyRecord::Fiat(f) => &f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CurrencyRecord::Crypto(c) => &c.name,
            CurrencyRecord::Fiat(f) => &f.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            CurrencyRecord::Crypto(c) => &c.symbol,
            CurrencyRecord::Fiat(f) => &f.symbol,
        }
    }

    /// Returns the ISO code for fiat records, `None` for crypto.
    pub fn code(&self) -> Option<&str> {
        match self {
            CurrencyRecord::Crypto(_) => None,
            CurrencyRecord::Fiat(f) => Some(&f.code),
        }
    }

    /// Short label shown in the trailing column of a list row.
    ///
    /// ```text
    /// Bitcoin ................ BTC     (crypto: symbol)
    /// United States Dollar ... USD     (fiat: code, not "$")
    /// ```
    pub fn display_code(&self) -> &str {
        match self {
            CurrencyRecord::Crypto(c) => &c.symbol,
            CurrencyRecord::Fiat(f) => &f.code,
        }
    }

    /// Upper-cased first character of the name, used for the row avatar.
    ///
    /// Returns `None` for an empty name. Some characters upper-case to more
    /// than one character (e.g. `ß` → `SS`), hence the `String`.
    pub fn avatar_initial(&self) -> Option<String> {
        self.name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
    }

    pub fn is_fiat(&self) -> bool {
        matches!(self, CurrencyRecord::Fiat(_))
    }
}

impl From<CryptoCurrency> for CurrencyRecord {
    fn from(c: CryptoCurrency) -> Self {
        CurrencyRecord::Crypto(c)
    }
}

impl From<FiatCurrency> for CurrencyRecord {
    fn from(f: FiatCurrency) -> Self {
        CurrencyRecord::Fiat(f)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_without_code_is_crypto() {
        let json = r#"{"id":"BTC","name":"Bitcoin","symbol":"BTC"}"#;
        let record: CurrencyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.kind(), CurrencyKind::Crypto);
        assert_eq!(record.code(), None);
    }

    #[test]
    fn test_decode_with_code_is_fiat() {
        let json = r#"{"id":"USD","name":"United States Dollar","symbol":"$","code":"USD"}"#;
        let record: CurrencyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.kind(), CurrencyKind::Fiat);
        assert_eq!(record.code(), Some("USD"));
        assert_eq!(record.symbol(), "$");
    }

    #[test]
    fn test_encode_has_no_type_tag() {
        let record = CurrencyRecord::crypto("ETH", "Ethereum", "ETH");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"id": "ETH", "name": "Ethereum", "symbol": "ETH"})
        );
    }

    #[test]
    fn test_decode_missing_symbol_fails() {
        let json = r#"{"id":"BTC","name":"Bitcoin"}"#;
        assert!(serde_json::from_str::<CurrencyRecord>(json).is_err());
    }

    #[test]
    fn test_display_code() {
        let btc = CurrencyRecord::crypto("BTC", "Bitcoin", "BTC");
        let usd = CurrencyRecord::fiat("USD", "United States Dollar", "$", "USD");

        assert_eq!(btc.display_code(), "BTC");
        assert_eq!(usd.display_code(), "USD");
    }

    #[test]
    fn test_avatar_initial() {
        let btc = CurrencyRecord::crypto("BTC", "bitcoin", "BTC");
        let empty = CurrencyRecord::crypto("X", "", "X");

        assert_eq!(btc.avatar_initial().as_deref(), Some("B"));
        assert_eq!(empty.avatar_initial(), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CurrencyKind::Crypto.to_string(), "crypto");
        assert_eq!(CurrencyKind::Fiat.to_string(), "fiat");
    }
}
