//! Pricing strategies
//!
//! Usage is billed one of two ways depending on the provider:
//! - `Credits`: the credit-billed provider reports credits, priced per node
//! - `Tokens`: everyone else reports input and output tokens, priced per mille
//!   with separate rates for cached and uncached tokens
//!
//! Both strategies implement [`PricingPolicy`], so the calculator never branches
//! on provider strings itself.

use tracing::debug;
use usage_cost_core::types::{CostBreakdown, PricingEntry, ProviderName, UsageRecord};

/// Unrounded cost of one record plus the figures that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PricingOutcome {
    /// Cost in USD before rounding
    pub cost: f64,
    /// Strategy-specific fields to record on the output
    pub breakdown: CostBreakdown,
}

/// Computes the cost of a usage record from its matching pricing entry
pub trait PricingPolicy {
    /// Price one record
    fn price(&self, record: &UsageRecord, entry: &PricingEntry) -> PricingOutcome;
}

/// Credits multiplied by the per-node cost; token fields are ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditPricing;

impl PricingPolicy for CreditPricing {
    fn price(&self, record: &UsageRecord, entry: &PricingEntry) -> PricingOutcome {
        let credits = record.buildship_total_credits();
        let cost = credits.as_f64() * entry.cost_per_node();

        debug!("Calculated credit cost: ${:.6} for {} credits", cost, credits);

        PricingOutcome {
            cost,
            breakdown: CostBreakdown::Credits {
                credits_used: credits,
            },
        }
    }
}

/// Cached and uncached tokens billed at their own per-mille rates
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenPricing;

impl PricingPolicy for TokenPricing {
    fn price(&self, record: &UsageRecord, entry: &PricingEntry) -> PricingOutcome {
        let input_cached = record.input_tokens_cached();
        let input_uncached = record.input_tokens().minus(&input_cached);

        let output_cached = record.output_tokens_cached();
        let output_uncached = record.output_tokens().minus(&output_cached);

        let cost = input_uncached.as_f64() * entry.input_rate()
            + input_cached.as_f64() * entry.input_rate_cached()
            + output_uncached.as_f64() * entry.output_rate()
            + output_cached.as_f64() * entry.output_rate_cached();

        debug!(
            "Calculated token cost: ${:.6} for {} uncached / {} cached input, {} uncached / {} cached output",
            cost, input_uncached, input_cached, output_uncached, output_cached
        );

        PricingOutcome {
            cost,
            breakdown: CostBreakdown::Tokens {
                input_uncached,
                output_uncached,
            },
        }
    }
}

/// The closed set of pricing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingStrategy {
    /// Per-credit billing
    Credits,
    /// Per-token billing
    Tokens,
}

impl PricingStrategy {
    /// Strategy for a provider; unknown or missing providers bill per token
    pub fn for_provider(provider: Option<&ProviderName>) -> Self {
        if provider.is_some_and(ProviderName::is_credit_billed) {
            Self::Credits
        } else {
            Self::Tokens
        }
    }

    /// Strategy for a usage record
    pub fn for_record(record: &UsageRecord) -> Self {
        Self::for_provider(record.provider.as_ref())
    }
}

impl PricingPolicy for PricingStrategy {
    fn price(&self, record: &UsageRecord, entry: &PricingEntry) -> PricingOutcome {
        match self {
            Self::Credits => CreditPricing.price(record, entry),
            Self::Tokens => TokenPricing.price(record, entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_cost_core::types::{ModelName, Quantity};

    fn token_entry() -> PricingEntry {
        PricingEntry {
            provider: Some(ProviderName::new("openai")),
            model: Some(ModelName::new("gpt-4o")),
            input_token_cpm: Some(Quantity::Integer(2)),
            input_token_cpm_cached: Some(Quantity::Integer(1)),
            output_token_cpm: Some(Quantity::Integer(4)),
            output_token_cpm_cached: Some(Quantity::Integer(0)),
            cost_per_node: None,
        }
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(
            PricingStrategy::for_provider(Some(&ProviderName::new("buildship"))),
            PricingStrategy::Credits
        );
        assert_eq!(
            PricingStrategy::for_provider(Some(&ProviderName::new("openai"))),
            PricingStrategy::Tokens
        );
        assert_eq!(PricingStrategy::for_provider(None), PricingStrategy::Tokens);
        // Matching is exact
        assert_eq!(
            PricingStrategy::for_provider(Some(&ProviderName::new("BuildShip"))),
            PricingStrategy::Tokens
        );
    }

    #[test]
    fn test_token_pricing() {
        let record = UsageRecord {
            input_tokens: Some(Quantity::Integer(1000)),
            input_tokens_cached: Some(Quantity::Integer(200)),
            output_tokens: Some(Quantity::Integer(500)),
            output_tokens_cached: Some(Quantity::Integer(0)),
            ..Default::default()
        };

        let outcome = TokenPricing.price(&record, &token_entry());

        // 800 * 0.002 + 200 * 0.001 + 500 * 0.004 + 0 * 0 = 3.8
        assert!((outcome.cost - 3.8).abs() < 1e-9);
        assert_eq!(
            outcome.breakdown,
            CostBreakdown::Tokens {
                input_uncached: Quantity::Integer(800),
                output_uncached: Quantity::Integer(500),
            }
        );
    }

    #[test]
    fn test_token_pricing_negative_uncached() {
        let record = UsageRecord {
            input_tokens: Some(Quantity::Integer(100)),
            input_tokens_cached: Some(Quantity::Integer(300)),
            ..Default::default()
        };

        let outcome = TokenPricing.price(&record, &token_entry());

        // -200 * 0.002 + 300 * 0.001 = -0.1
        assert!((outcome.cost + 0.1).abs() < 1e-9);
        assert!(matches!(
            outcome.breakdown,
            CostBreakdown::Tokens { input_uncached: Quantity::Integer(-200), .. }
        ));
    }

    #[test]
    fn test_credit_pricing_ignores_tokens() {
        let record = UsageRecord {
            provider: Some(ProviderName::new("buildship")),
            input_tokens: Some(Quantity::Integer(1_000_000)),
            buildship_total_credits: Some(Quantity::Integer(10)),
            ..Default::default()
        };
        let entry = PricingEntry {
            input_token_cpm: Some(Quantity::Integer(100)),
            cost_per_node: Some(Quantity::Decimal(0.05)),
            ..Default::default()
        };

        let outcome = PricingStrategy::for_record(&record).price(&record, &entry);

        assert!((outcome.cost - 0.5).abs() < 1e-12);
        assert_eq!(
            outcome.breakdown,
            CostBreakdown::Credits {
                credits_used: Quantity::Integer(10)
            }
        );
    }

    #[test]
    fn test_credit_pricing_defaults_to_zero() {
        let record = UsageRecord {
            provider: Some(ProviderName::new("buildship")),
            ..Default::default()
        };

        let outcome = CreditPricing.price(&record, &PricingEntry::default());
        assert_eq!(outcome.cost, 0.0);
        assert_eq!(
            outcome.breakdown,
            CostBreakdown::Credits {
                credits_used: Quantity::ZERO
            }
        );
    }

    #[test]
    fn test_missing_rates_price_at_zero() {
        let record = UsageRecord {
            input_tokens: Some(Quantity::Integer(5000)),
            output_tokens: Some(Quantity::Integer(5000)),
            ..Default::default()
        };

        let outcome = TokenPricing.price(&record, &PricingEntry::default());
        assert_eq!(outcome.cost, 0.0);
    }
}
