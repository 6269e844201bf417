//! Error types for usage-cost
//!
//! This module defines the error types used throughout the usage-cost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Request-shape failures (an unparseable body, a missing or malformed top-level
//! field) are client errors: the whole request is rejected and nothing is priced.
//! A usage record without a matching price is never an error; it is reported
//! inline on the priced record instead.
//!
//! # Example
//!
//! ```
//! use usage_cost_core::error::{Result, UsageCostError};
//!
//! fn example_function() -> Result<()> {
//!     Err(UsageCostError::MissingFields(vec!["environment".to_string()]))
//! }
//!
//! assert!(example_function().unwrap_err().is_client_error());
//! ```

use thiserror::Error;

/// Main error type for usage-cost operations
#[derive(Error, Debug)]
pub enum UsageCostError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request body is not valid JSON
    #[error("Please pass a valid JSON in the request body.")]
    InvalidJson(#[source] serde_json::Error),

    /// One or more required top-level fields are absent or empty
    #[error(
        "Please provide 'workflow_usage', 'provider_costs', and 'environment' in the request body. Missing: {}",
        .0.join(", ")
    )]
    MissingFields(Vec<String>),

    /// A top-level field is present but has the wrong shape
    #[error("Invalid '{field}' in the request body: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),
}

impl UsageCostError {
    /// Whether this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson(_) | Self::MissingFields(_) | Self::InvalidField { .. }
        )
    }
}

/// Convenience type alias for Results in usage-cost
pub type Result<T> = std::result::Result<T, UsageCostError>;
