//! Core types, request parsing, and error handling for usage-cost
//!
//! This crate provides the request and response documents, the lenient
//! field types used to read them, and the error type shared by all other
//! usage-cost crates.

pub mod error;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use error::{Result, UsageCostError};
pub use types::{
    CostBreakdown, CostRequest, ModelName, PricedRecord, PricingEntry, PricingKey, ProviderName,
    Quantity, ResultEnvelope, UsageRecord, WorkflowUsage,
};
