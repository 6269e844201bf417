//! Pricing lookup keyed by `provider:model`

use std::collections::HashMap;
use tracing::debug;
use usage_cost_core::types::{PricingEntry, PricingKey};

/// Price list indexed for constant-time lookup
///
/// Built once per request and never shared. Entries with a missing provider or
/// model are stored under a key with an empty component; duplicate keys keep the
/// last entry seen.
#[derive(Debug, Clone, Default)]
pub struct PricingLookup {
    entries: HashMap<PricingKey, PricingEntry>,
}

impl PricingLookup {
    /// Build a lookup from a price list, cloning each entry
    pub fn build(pricing_table: &[PricingEntry]) -> Self {
        pricing_table.iter().cloned().collect()
    }

    /// Find the pricing entry for a key
    pub fn get(&self, key: &PricingKey) -> Option<&PricingEntry> {
        self.entries.get(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lookup holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PricingEntry> for PricingLookup {
    fn from_iter<I: IntoIterator<Item = PricingEntry>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for entry in iter {
            let key = entry.pricing_key();
            if entries.insert(key.clone(), entry).is_some() {
                debug!("Duplicate pricing entry for {}, keeping the last one", key);
            }
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_cost_core::types::{ModelName, ProviderName, Quantity};

    fn entry(provider: Option<&str>, model: Option<&str>, cpm: i64) -> PricingEntry {
        PricingEntry {
            provider: provider.map(ProviderName::new),
            model: model.map(ModelName::new),
            input_token_cpm: Some(Quantity::Integer(cpm)),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_by_key() {
        let lookup = PricingLookup::build(&[
            entry(Some("openai"), Some("gpt-4o"), 2),
            entry(Some("anthropic"), Some("claude-3-haiku"), 1),
        ]);

        assert_eq!(lookup.len(), 2);
        let found = lookup.get(&PricingKey::new("openai", "gpt-4o")).unwrap();
        assert_eq!(found.input_rate(), 0.002);
        assert!(lookup.get(&PricingKey::new("openai", "gpt-4")).is_none());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let lookup = PricingLookup::build(&[
            entry(Some("openai"), Some("gpt-4o"), 2),
            entry(Some("openai"), Some("gpt-4o"), 5),
        ]);

        assert_eq!(lookup.len(), 1);
        let found = lookup.get(&PricingKey::new("openai", "gpt-4o")).unwrap();
        assert_eq!(found.input_token_cpm, Some(Quantity::Integer(5)));
    }

    #[test]
    fn test_malformed_entries_use_empty_components() {
        let lookup = PricingLookup::build(&[entry(None, Some("gpt-4o"), 2), entry(None, None, 3)]);

        assert!(lookup.get(&PricingKey::new("", "gpt-4o")).is_some());
        assert!(lookup.get(&PricingKey::new("", "")).is_some());
    }

    #[test]
    fn test_empty_lookup() {
        let lookup = PricingLookup::build(&[]);
        assert!(lookup.is_empty());
    }
}
