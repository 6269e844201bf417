//! Core domain types for usage-cost
//!
//! This module contains the request and response documents exchanged with the
//! cost calculator, together with the small wrapper types used to key and price
//! them.
//!
//! Every input type is deliberately permissive: fields may be missing, `null`, or
//! of the wrong JSON type, and the typed view falls back to a stated default
//! (empty string for identifiers, zero for quantities) instead of failing. The
//! raw value is kept so the priced output still echoes what the caller sent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Provider whose usage is billed per credit rather than per token
pub const CREDIT_BILLED_PROVIDER: &str = "buildship";

/// Output fields written by the calculator.
///
/// Input records carrying any of these keys have them replaced, never duplicated.
pub const DERIVED_FIELDS: [&str; 5] = [
    "cost_usd",
    "error",
    "input_tokens_uncached",
    "output_tokens_uncached",
    "buildship_credits_used",
];

/// Render any JSON scalar as an identifier string.
fn label_from_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Strongly-typed provider name wrapper
///
/// # Examples
/// ```
/// use usage_cost_core::types::ProviderName;
///
/// let provider = ProviderName::new("openai");
/// assert_eq!(provider.as_str(), "openai");
/// assert!(!provider.is_credit_billed());
/// assert!(ProviderName::new("buildship").is_credit_billed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProviderName(String);

impl ProviderName {
    /// Create a new ProviderName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this provider bills in credits instead of tokens
    pub fn is_credit_billed(&self) -> bool {
        self.0 == CREDIT_BILLED_PROVIDER
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ProviderName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self(label_from_value(v)))
    }
}

/// Strongly-typed model name wrapper
///
/// # Examples
/// ```
/// use usage_cost_core::types::ModelName;
///
/// let model = ModelName::new("gpt-4o");
/// assert_eq!(model.as_str(), "gpt-4o");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ModelName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self(label_from_value(v)))
    }
}

/// Join key between usage records and pricing entries: `provider:model`
///
/// # Examples
/// ```
/// use usage_cost_core::types::{ModelName, PricingKey, ProviderName};
///
/// let key = PricingKey::new("openai", "gpt-4o");
/// assert_eq!(key.as_str(), "openai:gpt-4o");
///
/// // Missing components resolve to empty strings
/// let partial = PricingKey::from_parts(Some(&ProviderName::new("openai")), None);
/// assert_eq!(partial.to_string(), "openai:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PricingKey(String);

impl PricingKey {
    /// Build a key from provider and model strings
    pub fn new(provider: &str, model: &str) -> Self {
        Self(format!("{provider}:{model}"))
    }

    /// Build a key from optional components, substituting empty strings
    pub fn from_parts(provider: Option<&ProviderName>, model: Option<&ModelName>) -> Self {
        Self::new(
            provider.map_or("", ProviderName::as_str),
            model.map_or("", ModelName::as_str),
        )
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PricingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A numeric field as received from the caller
///
/// Integers stay integers so token counts round-trip exactly; anything that is
/// not a JSON number is kept verbatim in `Unparsed` and counts as zero.
///
/// # Examples
/// ```
/// use usage_cost_core::types::Quantity;
///
/// let total = Quantity::Integer(1000);
/// let cached = Quantity::Integer(200);
/// assert_eq!(total.minus(&cached), Quantity::Integer(800));
///
/// let garbage: Quantity = serde_json::from_str(r#""lots""#).unwrap();
/// assert_eq!(garbage.as_f64(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    /// Whole number
    Integer(i64),
    /// Fractional (or out of `i64` range) number
    Decimal(f64),
    /// Non-numeric value, treated as zero
    Unparsed(Value),
}

impl Quantity {
    /// The zero quantity used for absent fields
    pub const ZERO: Quantity = Quantity::Integer(0);

    /// Numeric value, zero for unparsed input
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(n) => *n as f64,
            Self::Decimal(x) => *x,
            Self::Unparsed(_) => 0.0,
        }
    }

    /// This quantity with unparsed input replaced by zero
    pub fn numeric(&self) -> Quantity {
        match self {
            Self::Integer(n) => Self::Integer(*n),
            Self::Decimal(x) => Self::Decimal(*x),
            Self::Unparsed(_) => Self::ZERO,
        }
    }

    /// Difference `self - other`, staying integral when both sides are.
    ///
    /// The result is not clamped: a negative difference is returned as is.
    pub fn minus(&self, other: &Quantity) -> Quantity {
        match (self.numeric(), other.numeric()) {
            (Self::Integer(a), Self::Integer(b)) => a
                .checked_sub(b)
                .map(Self::Integer)
                .unwrap_or_else(|| Self::Decimal(a as f64 - b as f64)),
            (a, b) => Self::Decimal(a.as_f64() - b.as_f64()),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Quantity {
    fn from(x: f64) -> Self {
        Self::Decimal(x)
    }
}

impl From<Value> for Quantity {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(x) = n.as_f64() {
                    Self::Decimal(x)
                } else {
                    Self::Unparsed(Value::Number(n))
                }
            }
            other => Self::Unparsed(other),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(x) => write!(f, "{x}"),
            Self::Unparsed(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Decimal(x) => serializer.serialize_f64(*x),
            Self::Unparsed(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Python-style truthiness of a JSON value.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One usage line item reported by a workflow
///
/// Fields the calculator does not know about are kept in `extra` and written
/// back unchanged on the priced record.
///
/// # Examples
/// ```
/// use usage_cost_core::types::{Quantity, UsageRecord};
///
/// let record: UsageRecord = serde_json::from_str(
///     r#"{"provider":"openai","model":"gpt-4o","input_tokens":1000,"step":"summarise"}"#,
/// ).unwrap();
///
/// assert_eq!(record.pricing_key().as_str(), "openai:gpt-4o");
/// assert_eq!(record.input_tokens(), Quantity::Integer(1000));
/// assert_eq!(record.output_tokens(), Quantity::ZERO);
/// assert_eq!(record.extra["step"], "summarise");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Provider that served the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderName>,
    /// Model used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelName>,
    /// Total input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<Quantity>,
    /// Input tokens served from cache (subset of `input_tokens`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_cached: Option<Quantity>,
    /// Total output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<Quantity>,
    /// Output tokens served from cache (subset of `output_tokens`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_cached: Option<Quantity>,
    /// Credits consumed, only meaningful for the credit-billed provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildship_total_credits: Option<Quantity>,
    /// Any other fields supplied by the caller
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsageRecord {
    /// Key used to find this record's pricing entry
    pub fn pricing_key(&self) -> PricingKey {
        PricingKey::from_parts(self.provider.as_ref(), self.model.as_ref())
    }

    /// Whether the record is billed in credits
    pub fn is_credit_billed(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(ProviderName::is_credit_billed)
    }

    /// Input tokens, zero when absent or non-numeric
    pub fn input_tokens(&self) -> Quantity {
        numeric_or_zero(&self.input_tokens)
    }

    /// Cached input tokens, zero when absent or non-numeric
    pub fn input_tokens_cached(&self) -> Quantity {
        numeric_or_zero(&self.input_tokens_cached)
    }

    /// Output tokens, zero when absent or non-numeric
    pub fn output_tokens(&self) -> Quantity {
        numeric_or_zero(&self.output_tokens)
    }

    /// Cached output tokens, zero when absent or non-numeric
    pub fn output_tokens_cached(&self) -> Quantity {
        numeric_or_zero(&self.output_tokens_cached)
    }

    /// Credits as sent by the caller, zero when absent
    pub fn buildship_total_credits(&self) -> Quantity {
        self.buildship_total_credits.clone().unwrap_or_default()
    }
}

fn numeric_or_zero(quantity: &Option<Quantity>) -> Quantity {
    quantity.as_ref().map(Quantity::numeric).unwrap_or_default()
}

/// Price list row for one provider and model
///
/// Token rates are cost-per-mille (per 1000 tokens). Absent rates count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// Provider this price applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderName>,
    /// Model this price applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelName>,
    /// Cost per 1000 uncached input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_cpm: Option<Quantity>,
    /// Cost per 1000 cached input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_cpm_cached: Option<Quantity>,
    /// Cost per 1000 uncached output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_cpm: Option<Quantity>,
    /// Cost per 1000 cached output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_cpm_cached: Option<Quantity>,
    /// Cost per credit for the credit-billed provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_node: Option<Quantity>,
}

impl PricingEntry {
    /// Key this entry is stored under
    pub fn pricing_key(&self) -> PricingKey {
        PricingKey::from_parts(self.provider.as_ref(), self.model.as_ref())
    }

    /// Per-token rate for uncached input
    pub fn input_rate(&self) -> f64 {
        per_token(&self.input_token_cpm)
    }

    /// Per-token rate for cached input
    pub fn input_rate_cached(&self) -> f64 {
        per_token(&self.input_token_cpm_cached)
    }

    /// Per-token rate for uncached output
    pub fn output_rate(&self) -> f64 {
        per_token(&self.output_token_cpm)
    }

    /// Per-token rate for cached output
    pub fn output_rate_cached(&self) -> f64 {
        per_token(&self.output_token_cpm_cached)
    }

    /// Cost of one credit
    pub fn cost_per_node(&self) -> f64 {
        self.cost_per_node.as_ref().map_or(0.0, Quantity::as_f64)
    }
}

fn per_token(cpm: &Option<Quantity>) -> f64 {
    cpm.as_ref().map_or(0.0, Quantity::as_f64) / 1000.0
}

/// Strategy-specific figures recorded alongside a computed cost
#[derive(Debug, Clone, PartialEq)]
pub enum CostBreakdown {
    /// Credit-billed usage
    Credits {
        /// Credits the record reported
        credits_used: Quantity,
    },
    /// Token-billed usage
    Tokens {
        /// `input_tokens - input_tokens_cached`
        input_uncached: Quantity,
        /// `output_tokens - output_tokens_cached`
        output_uncached: Quantity,
    },
}

/// A usage record extended with its computed cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecord {
    /// The record as received
    #[serde(flatten)]
    pub record: UsageRecord,
    /// Cost in USD rounded to six decimals, `null` when unpriced
    pub cost_usd: Option<f64>,
    /// Why the record could not be priced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Input tokens billed at the uncached rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_uncached: Option<Quantity>,
    /// Output tokens billed at the uncached rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_uncached: Option<Quantity>,
    /// Credits billed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildship_credits_used: Option<Quantity>,
}

impl PricedRecord {
    fn bare(mut record: UsageRecord) -> Self {
        for field in DERIVED_FIELDS {
            record.extra.remove(field);
        }
        Self {
            record,
            cost_usd: None,
            error: None,
            input_tokens_uncached: None,
            output_tokens_uncached: None,
            buildship_credits_used: None,
        }
    }

    /// A record with no matching pricing entry
    pub fn unpriced(record: UsageRecord) -> Self {
        let key = record.pricing_key();
        let mut priced = Self::bare(record);
        priced.error = Some(format!("Pricing not found for {key}"));
        priced
    }

    /// A record with a computed (already rounded) cost
    pub fn priced(record: UsageRecord, cost_usd: f64, breakdown: CostBreakdown) -> Self {
        let mut priced = Self::bare(record);
        priced.cost_usd = Some(cost_usd);
        match breakdown {
            CostBreakdown::Credits { credits_used } => {
                priced.buildship_credits_used = Some(credits_used);
            }
            CostBreakdown::Tokens {
                input_uncached,
                output_uncached,
            } => {
                priced.input_tokens_uncached = Some(input_uncached);
                priced.output_tokens_uncached = Some(output_uncached);
            }
        }
        priced
    }

    /// Whether a pricing entry was found
    pub fn is_priced(&self) -> bool {
        self.cost_usd.is_some()
    }
}

/// Usage reported by one workflow execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowUsage {
    /// Location the workflow ran for
    #[serde(default)]
    pub location_id: Value,
    /// Workflow display name
    #[serde(default)]
    pub workflow_name: Value,
    /// Link to the workflow
    #[serde(default)]
    pub workflow_url: Value,
    /// When the workflow ran; generated when absent or empty
    #[serde(default)]
    pub executed_at: Value,
    /// Usage line items
    #[serde(default, deserialize_with = "null_as_empty")]
    pub usage: Vec<UsageRecord>,
}

impl WorkflowUsage {
    /// The caller's execution timestamp, if one was meaningfully provided
    pub fn executed_at(&self) -> Option<&Value> {
        is_truthy(&self.executed_at).then_some(&self.executed_at)
    }
}

/// A validated cost calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRequest {
    /// Usage to price
    pub workflow_usage: WorkflowUsage,
    /// Price list
    pub provider_costs: Vec<PricingEntry>,
    /// Deployment environment label, echoed back
    pub environment: String,
}

/// The priced batch returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Environment label from the request
    pub environment: String,
    /// Pass-through from the request
    pub location_id: Value,
    /// Pass-through from the request
    pub workflow_name: Value,
    /// Pass-through from the request
    pub workflow_url: Value,
    /// Request timestamp, or generation time in ISO-8601 UTC
    pub executed_at: Value,
    /// One entry per usage record, in request order
    pub usage_with_costs: Vec<PricedRecord>,
}

impl ResultEnvelope {
    /// Sum of all computed costs; unpriced records contribute nothing
    pub fn total_cost(&self) -> f64 {
        self.usage_with_costs
            .iter()
            .filter_map(|r| r.cost_usd)
            .sum()
    }

    /// Number of records without a pricing entry
    pub fn unpriced_count(&self) -> usize {
        self.usage_with_costs
            .iter()
            .filter(|r| !r.is_priced())
            .count()
    }
}
