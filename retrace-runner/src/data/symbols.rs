//! Display symbol → vendor ticker translation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps the symbols users see (`NAS100`) to what a vendor expects (`^NDX`).
///
/// Unmapped symbols pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolMap(BTreeMap<String, String>);

impl Default for SymbolMap {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert("NAS100".to_string(), "^NDX".to_string());
        map.insert("XAUUSD".to_string(), "GC=F".to_string());
        map.insert("GBPUSD".to_string(), "GBPUSD=X".to_string());
        Self(map)
    }
}

impl SymbolMap {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn vendor<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.0.get(symbol).map(String::as_str).unwrap_or(symbol)
    }

    /// Add or replace entries; `other` wins on conflicts.
    pub fn merged(mut self, other: &BTreeMap<String, String>) -> Self {
        self.0
            .extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_maps_bot_symbols() {
        let map = SymbolMap::default();
        assert_eq!(map.vendor("NAS100"), "^NDX");
        assert_eq!(map.vendor("XAUUSD"), "GC=F");
        assert_eq!(map.vendor("GBPUSD"), "GBPUSD=X");
    }

    #[test]
    fn unknown_symbol_passes_through() {
        assert_eq!(SymbolMap::default().vendor("SPY"), "SPY");
        assert_eq!(SymbolMap::empty().vendor("NAS100"), "NAS100");
    }

    #[test]
    fn merge_overrides_defaults() {
        let mut extra = BTreeMap::new();
        extra.insert("NAS100".to_string(), "NQ=F".to_string());
        extra.insert("EURUSD".to_string(), "EURUSD=X".to_string());
        let map = SymbolMap::default().merged(&extra);
        assert_eq!(map.vendor("NAS100"), "NQ=F");
        assert_eq!(map.vendor("EURUSD"), "EURUSD=X");
        assert_eq!(map.vendor("XAUUSD"), "GC=F");
    }
}
