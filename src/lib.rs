//! usage-cost - Price provider usage records against a per-model price list
//!
//! This library provides functionality to:
//! - Validate cost calculation requests
//! - Join usage records to pricing entries by `provider:model`
//! - Price token-billed and credit-billed usage to six decimal places
//! - Serve the calculator over HTTP or run it once from the command line
//!
//! # Examples
//!
//! ```
//! use usage_cost::{batch::calculate_usage_costs, types::CostRequest};
//!
//! let body = br#"{
//!     "workflow_usage": {"usage": [{"provider": "openai", "model": "gpt-4o", "input_tokens": 1000}]},
//!     "provider_costs": [{"provider": "openai", "model": "gpt-4o", "input_token_cpm": 2}],
//!     "environment": "dev"
//! }"#;
//!
//! let request = CostRequest::from_slice(body)?;
//! let envelope = calculate_usage_costs(request);
//! assert_eq!(envelope.usage_with_costs[0].cost_usd, Some(2.0));
//! # Ok::<(), usage_cost::UsageCostError>(())
//! ```

pub mod cli;
pub mod output;

pub use usage_cost_core::{error, request, types};
pub use usage_cost_pricing::{batch, cost_calculator, lookup, strategy};

// Re-export commonly used types
pub use error::{Result, UsageCostError};
pub use types::{CostRequest, PricedRecord, PricingEntry, ResultEnvelope, UsageRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
