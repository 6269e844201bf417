//! Common test utilities and helpers for usage-cost tests
//!
//! This module provides builders for usage records and pricing entries plus
//! helpers that assemble full request documents.

#![allow(dead_code)]

use serde_json::{Map, Value, json};
use usage_cost::types::{ModelName, PricingEntry, ProviderName, Quantity, UsageRecord};

/// Builder for creating test usage records
pub struct UsageRecordBuilder {
    provider: Option<String>,
    model: Option<String>,
    input_tokens: Option<i64>,
    input_tokens_cached: Option<i64>,
    output_tokens: Option<i64>,
    output_tokens_cached: Option<i64>,
    credits: Option<Quantity>,
    extra: Map<String, Value>,
}

impl Default for UsageRecordBuilder {
    fn default() -> Self {
        Self {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o".to_string()),
            input_tokens: None,
            input_tokens_cached: None,
            output_tokens: None,
            output_tokens_cached: None,
            credits: None,
            extra: Map::new(),
        }
    }
}

impl UsageRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.provider = Some(provider.to_string());
        self
    }

    pub fn without_provider(mut self) -> Self {
        self.provider = None;
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn without_model(mut self) -> Self {
        self.model = None;
        self
    }

    pub fn input(mut self, total: i64, cached: i64) -> Self {
        self.input_tokens = Some(total);
        self.input_tokens_cached = Some(cached);
        self
    }

    pub fn output(mut self, total: i64, cached: i64) -> Self {
        self.output_tokens = Some(total);
        self.output_tokens_cached = Some(cached);
        self
    }

    pub fn credits(mut self, credits: impl Into<Quantity>) -> Self {
        self.credits = Some(credits.into());
        self
    }

    pub fn extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Build the UsageRecord
    pub fn build(self) -> UsageRecord {
        UsageRecord {
            provider: self.provider.map(ProviderName::new),
            model: self.model.map(ModelName::new),
            input_tokens: self.input_tokens.map(Quantity::Integer),
            input_tokens_cached: self.input_tokens_cached.map(Quantity::Integer),
            output_tokens: self.output_tokens.map(Quantity::Integer),
            output_tokens_cached: self.output_tokens_cached.map(Quantity::Integer),
            buildship_total_credits: self.credits,
            extra: self.extra,
        }
    }

    /// Build as a JSON value
    #[allow(clippy::wrong_self_convention)]
    pub fn to_json(self) -> Value {
        serde_json::to_value(self.build()).unwrap()
    }
}

/// Builder for creating test pricing entries
pub struct PricingEntryBuilder {
    provider: String,
    model: String,
    rates: [f64; 4],
    cost_per_node: Option<f64>,
}

impl PricingEntryBuilder {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            rates: [0.0; 4],
            cost_per_node: None,
        }
    }

    /// Per-mille rates for input, cached input, output and cached output
    pub fn rates(mut self, input: f64, input_cached: f64, output: f64, output_cached: f64) -> Self {
        self.rates = [input, input_cached, output, output_cached];
        self
    }

    pub fn cost_per_node(mut self, cost: f64) -> Self {
        self.cost_per_node = Some(cost);
        self
    }

    pub fn build(self) -> PricingEntry {
        let [input, input_cached, output, output_cached] = self.rates.map(Quantity::Decimal);
        PricingEntry {
            provider: Some(ProviderName::new(self.provider)),
            model: Some(ModelName::new(self.model)),
            input_token_cpm: Some(input),
            input_token_cpm_cached: Some(input_cached),
            output_token_cpm: Some(output),
            output_token_cpm_cached: Some(output_cached),
            cost_per_node: self.cost_per_node.map(Quantity::Decimal),
        }
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn to_json(self) -> Value {
        serde_json::to_value(self.build()).unwrap()
    }
}

/// A full request document
pub fn request_json(usage: Vec<Value>, provider_costs: Vec<Value>, environment: &str) -> Value {
    json!({
        "workflow_usage": {
            "location_id": "loc-42",
            "workflow_name": "Nightly digest",
            "workflow_url": "https://example.com/workflows/42",
            "executed_at": "2024-05-01T12:00:00+00:00",
            "usage": usage,
        },
        "provider_costs": provider_costs,
        "environment": environment,
    })
}

/// The standard mixed request: one token record, one credit record, one miss
pub fn mixed_request() -> Value {
    request_json(
        vec![
            UsageRecordBuilder::new()
                .input(1000, 200)
                .output(500, 0)
                .to_json(),
            UsageRecordBuilder::new()
                .provider("buildship")
                .model("nodes")
                .credits(10)
                .to_json(),
            UsageRecordBuilder::new()
                .provider("groq")
                .model("llama3-70b")
                .input(50, 0)
                .to_json(),
        ],
        vec![
            PricingEntryBuilder::new("openai", "gpt-4o")
                .rates(2.0, 1.0, 4.0, 0.0)
                .to_json(),
            PricingEntryBuilder::new("buildship", "nodes")
                .cost_per_node(0.05)
                .to_json(),
        ],
        "production",
    )
}
