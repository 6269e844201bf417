//! Cost calculator module for computing usage costs
//!
//! This module joins each usage record to its pricing entry and prices it with
//! the strategy its provider calls for. A record without a pricing entry is not
//! an error: it comes back with a `null` cost and an explanatory message so the
//! rest of the batch can still be priced.
//!
//! # Examples
//!
//! ```
//! use usage_cost_pricing::CostCalculator;
//! use usage_cost_core::types::{PricingEntry, UsageRecord};
//!
//! let pricing: Vec<PricingEntry> = serde_json::from_str(
//!     r#"[{"provider":"openai","model":"gpt-4o","input_token_cpm":2,"output_token_cpm":4}]"#,
//! ).unwrap();
//! let calculator = CostCalculator::from_pricing_table(&pricing);
//!
//! let record: UsageRecord = serde_json::from_str(
//!     r#"{"provider":"openai","model":"gpt-4o","input_tokens":1000,"output_tokens":500}"#,
//! ).unwrap();
//! let priced = calculator.price_record(record);
//!
//! assert_eq!(priced.cost_usd, Some(4.0));
//! ```

use crate::lookup::PricingLookup;
use crate::strategy::{PricingPolicy, PricingStrategy};
use tracing::{debug, warn};
use usage_cost_core::types::{PricedRecord, PricingEntry, UsageRecord};

/// Scale used to round costs to six decimal places
const COST_SCALE: f64 = 1_000_000.0;

/// Round a cost to six decimal places, ties to even
///
/// # Examples
///
/// ```
/// use usage_cost_pricing::cost_calculator::round_cost;
///
/// assert_eq!(round_cost(1.23456789), 1.234568);
/// ```
pub fn round_cost(cost: f64) -> f64 {
    (cost * COST_SCALE).round_ties_even() / COST_SCALE
}

/// Prices usage records against one request's price list
pub struct CostCalculator {
    /// Pricing entries indexed by `provider:model`
    lookup: PricingLookup,
}

impl CostCalculator {
    /// Create a new CostCalculator over a prebuilt lookup
    pub fn new(lookup: PricingLookup) -> Self {
        Self { lookup }
    }

    /// Create a CostCalculator directly from a price list
    pub fn from_pricing_table(pricing_table: &[PricingEntry]) -> Self {
        Self::new(PricingLookup::build(pricing_table))
    }

    /// The lookup this calculator prices against
    pub fn lookup(&self) -> &PricingLookup {
        &self.lookup
    }

    /// Price a single usage record
    ///
    /// The returned record carries `cost_usd` rounded to six decimal places, or
    /// `cost_usd = null` and an `error` naming the missing key when the price
    /// list has no entry for the record's `provider:model`.
    pub fn price_record(&self, record: UsageRecord) -> PricedRecord {
        let key = record.pricing_key();
        let Some(entry) = self.lookup.get(&key) else {
            warn!("Pricing not found for {}", key);
            return PricedRecord::unpriced(record);
        };

        let strategy = PricingStrategy::for_record(&record);
        let outcome = strategy.price(&record, entry);
        let cost_usd = round_cost(outcome.cost);

        debug!("Priced {} with {:?} strategy: ${:.6}", key, strategy, cost_usd);

        PricedRecord::priced(record, cost_usd, outcome.breakdown)
    }

    /// Price every record, preserving order
    pub fn price_records(&self, records: Vec<UsageRecord>) -> Vec<PricedRecord> {
        records
            .into_iter()
            .map(|record| self.price_record(record))
            .collect()
    }
}
