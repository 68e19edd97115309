//! # Reference Datasets
//!
//! The built-in currency lists behind the "Insert crypto", "Insert fiat"
//! and "Insert both" actions.
//!
//! Ids are unique within and across both lists, so the combined list can be
//! rendered with `id` as the row key.

use crate::types::CurrencyRecord;

/// Crypto reference data: (id, name, symbol).
const CRYPTO: &[(&str, &str, &str)] = &[
    ("BTC", "Bitcoin", "BTC"),
    ("ETH", "Ethereum", "ETH"),
    ("XRP", "XRP", "XRP"),
    ("BCH", "Bitcoin Cash", "BCH"),
    ("LTC", "Litecoin", "LTC"),
    ("EOS", "EOS", "EOS"),
    ("BNB", "Binance Coin", "BNB"),
    ("LINK", "Chainlink", "LINK"),
    ("NEO", "NEO", "NEO"),
    ("ETC", "Ethereum Classic", "ETC"),
    ("ONT", "Ontology", "ONT"),
    ("CRO", "Crypto.com Chain", "CRO"),
    ("CUC", "Cucumber", "CUC"),
    ("USDC", "USD Coin", "USDC"),
    ("ADA", "Cardano", "ADA"),
    ("DOT", "Polkadot", "DOT"),
    ("SOL", "Solana", "SOL"),
    ("DOGE", "Dogecoin", "DOGE"),
    ("TRX", "Tron", "TRX"),
    ("XLM", "Stellar", "XLM"),
    ("XMR", "Monero", "XMR"),
    ("XTZ", "Tezos", "XTZ"),
    ("UNI", "Uniswap", "UNI"),
];

/// Fiat reference data: (id, name, symbol, code).
const FIAT: &[(&str, &str, &str, &str)] = &[
    ("SGD", "Singapore Dollar", "$", "SGD"),
    ("EUR", "Euro", "€", "EUR"),
    ("GBP", "British Pound", "£", "GBP"),
    ("HKD", "Hong Kong Dollar", "$", "HKD"),
    ("JPY", "Japanese Yen", "¥", "JPY"),
    ("AUD", "Australian Dollar", "$", "AUD"),
    ("USD", "United States Dollar", "$", "USD"),
    ("CAD", "Canadian Dollar", "$", "CAD"),
    ("CHF", "Swiss Franc", "Fr", "CHF"),
    ("CNY", "Chinese Yuan", "¥", "CNY"),
    ("KRW", "South Korean Won", "₩", "KRW"),
    ("INR", "Indian Rupee", "₹", "INR"),
];

/// Returns the crypto reference list.
pub fn crypto_list() -> Vec<CurrencyRecord> {
    CRYPTO
        .iter()
        .map(|(id, name, symbol)| CurrencyRecord::crypto(*id, *name, *symbol))
        .collect()
}

/// Returns the fiat reference list.
pub fn fiat_list() -> Vec<CurrencyRecord> {
    FIAT.iter()
        .map(|(id, name, symbol, code)| CurrencyRecord::fiat(*id, *name, *symbol, *code))
        .collect()
}

/// Returns crypto followed by fiat.
pub fn combined_list() -> Vec<CurrencyRecord> {
    let mut all = crypto_list();
    all.extend(fiat_list());
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurrencyKind;
    use std::collections::HashSet;

    #[test]
    fn test_lists_have_expected_kinds() {
        assert!(crypto_list().iter().all(|c| c.kind() == CurrencyKind::Crypto));
        assert!(fiat_list().iter().all(|c| c.kind() == CurrencyKind::Fiat));
    }

    #[test]
    fn test_ids_unique_across_lists() {
        let all = combined_list();
        let ids: HashSet<&str> = all.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_combined_is_crypto_then_fiat() {
        let crypto = crypto_list();
        let fiat = fiat_list();
        let all = combined_list();

        assert_eq!(all.len(), crypto.len() + fiat.len());
        assert_eq!(&all[..crypto.len()], crypto.as_slice());
        assert_eq!(&all[crypto.len()..], fiat.as_slice());
    }

    #[test]
    fn test_names_non_empty() {
        assert!(combined_list().iter().all(|c| !c.name().is_empty()));
    }
}
