//! Request parsing and validation
//!
//! Turns a raw request body into a [`CostRequest`], rejecting bodies that are not
//! JSON, that lack one of the required top-level fields, or whose fields have the
//! wrong shape. Validation is all-or-nothing: a rejected request prices nothing.

use crate::error::{Result, UsageCostError};
use crate::types::{CostRequest, PricingEntry, WorkflowUsage, is_truthy};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Top-level fields every request must carry, in reporting order
pub const REQUIRED_FIELDS: [&str; 3] = ["workflow_usage", "provider_costs", "environment"];

impl CostRequest {
    /// Parse and validate a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(UsageCostError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed request document
    pub fn from_value(value: Value) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(UsageCostError::InvalidField {
                    field: "body".to_string(),
                    reason: format!("expected a JSON object, found {}", json_type(&other)),
                });
            }
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !object.get(**field).is_some_and(is_truthy))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            debug!("Rejecting request, missing fields: {:?}", missing);
            return Err(UsageCostError::MissingFields(missing));
        }

        check_shape(&object, "workflow_usage", "an object", Value::is_object)?;
        check_shape(&object, "provider_costs", "an array of objects", |value| {
            value
                .as_array()
                .is_some_and(|entries| entries.iter().all(Value::is_object))
        })?;

        let workflow_usage: WorkflowUsage = take_field(&mut object, "workflow_usage")?;
        let provider_costs: Vec<PricingEntry> = take_field(&mut object, "provider_costs")?;
        let environment = match object.remove("environment") {
            Some(Value::String(environment)) => environment,
            other => {
                return Err(UsageCostError::InvalidField {
                    field: "environment".to_string(),
                    reason: format!(
                        "expected a string, found {}",
                        other.as_ref().map_or("nothing", json_type)
                    ),
                });
            }
        };

        Ok(Self {
            workflow_usage,
            provider_costs,
            environment,
        })
    }
}

/// Reject a field whose JSON type is wrong before serde sees it.
///
/// Derived struct impls also accept sequences, so an array would otherwise be
/// read positionally.
fn check_shape(
    object: &Map<String, Value>,
    field: &str,
    expected: &str,
    accepts: impl Fn(&Value) -> bool,
) -> Result<()> {
    match object.get(field) {
        Some(value) if accepts(value) => Ok(()),
        other => Err(UsageCostError::InvalidField {
            field: field.to_string(),
            reason: format!(
                "expected {expected}, found {}",
                other.map_or("nothing", json_type)
            ),
        }),
    }
}

fn take_field<T: DeserializeOwned>(object: &mut Map<String, Value>, field: &str) -> Result<T> {
    let value = object.remove(field).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| UsageCostError::InvalidField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
