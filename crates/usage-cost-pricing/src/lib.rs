//! Pricing lookup and cost calculator for usage-cost
//!
//! This crate joins usage records to a per-request price list and computes
//! their cost, either per token or per credit depending on the provider.

pub mod batch;
pub mod cost_calculator;
pub mod lookup;
pub mod strategy;

pub use batch::{assemble, calculate_usage_costs};
pub use cost_calculator::{CostCalculator, round_cost};
pub use lookup::PricingLookup;
pub use strategy::{CreditPricing, PricingOutcome, PricingPolicy, PricingStrategy, TokenPricing};
