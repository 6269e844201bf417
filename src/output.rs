//! Output formatting module for usage-cost
//!
//! This module provides formatters for displaying a priced batch:
//! - Table format for human-readable terminal output
//! - JSON format, which is exactly the envelope the HTTP endpoint returns
//!
//! # Examples
//!
//! ```
//! use usage_cost::output::get_formatter;
//! use usage_cost::types::ResultEnvelope;
//! use serde_json::Value;
//!
//! let envelope = ResultEnvelope {
//!     environment: "dev".to_string(),
//!     location_id: Value::Null,
//!     workflow_name: Value::Null,
//!     workflow_url: Value::Null,
//!     executed_at: Value::String("2024-01-01T00:00:00+00:00".to_string()),
//!     usage_with_costs: vec![],
//! };
//!
//! let formatter = get_formatter(true, false, false);
//! assert!(formatter.format_envelope(&envelope)?.starts_with('{'));
//! # Ok::<(), usage_cost::UsageCostError>(())
//! ```

use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::Value;
use usage_cost_core::error::Result;
use usage_cost_core::types::{PricedRecord, Quantity, ResultEnvelope};

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a priced batch
    fn format_envelope(&self, envelope: &ResultEnvelope) -> Result<String>;
}

/// Table formatter for human-readable output
///
/// One row per usage record plus a total row. Unpriced records show their
/// error in the last column.
pub struct TableFormatter {
    /// Whether to colorize missing prices
    pub color: bool,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Format a number with thousands separators
    fn format_number(n: i64) -> String {
        let s = n.unsigned_abs().to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        if n < 0 {
            result.push('-');
        }
        result.chars().rev().collect()
    }

    /// Format a quantity, keeping integers readable
    fn format_quantity(quantity: &Quantity) -> String {
        match quantity {
            Quantity::Integer(n) => Self::format_number(*n),
            other => other.to_string(),
        }
    }

    fn format_optional(quantity: Option<&Quantity>) -> String {
        quantity.map(Self::format_quantity).unwrap_or_default()
    }

    /// Format currency with dollar sign at full precision
    fn format_currency(amount: f64) -> String {
        format!("${amount:.6}")
    }

    fn label(value: &Value) -> String {
        match value {
            Value::Null => "-".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn record_row(&self, priced: &PricedRecord) -> Row {
        let record = &priced.record;
        let provider = record
            .provider
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let model = record
            .model
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        let (cost, note) = match (priced.cost_usd, &priced.error) {
            (Some(cost), _) => (Self::format_currency(cost), String::new()),
            (None, Some(error)) if self.color => ("-".to_string(), error.red().to_string()),
            (None, error) => ("-".to_string(), error.clone().unwrap_or_default()),
        };

        Row::new(vec![
            Cell::new(&provider),
            Cell::new(&model),
            Cell::new(&Self::format_optional(record.input_tokens.as_ref())).style_spec("r"),
            Cell::new(&Self::format_optional(record.input_tokens_cached.as_ref()))
                .style_spec("r"),
            Cell::new(&Self::format_optional(record.output_tokens.as_ref())).style_spec("r"),
            Cell::new(&Self::format_optional(record.output_tokens_cached.as_ref()))
                .style_spec("r"),
            Cell::new(&Self::format_optional(priced.buildship_credits_used.as_ref()))
                .style_spec("r"),
            Cell::new(&cost).style_spec("r"),
            Cell::new(&note),
        ])
    }
}

impl OutputFormatter for TableFormatter {
    fn format_envelope(&self, envelope: &ResultEnvelope) -> Result<String> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.set_titles(row![
            b -> "Provider",
            b -> "Model",
            b -> "Input",
            b -> "Input Cached",
            b -> "Output",
            b -> "Output Cached",
            b -> "Credits",
            b -> "Cost (USD)",
            b -> "Note"
        ]);

        for priced in &envelope.usage_with_costs {
            table.add_row(self.record_row(priced));
        }

        let unpriced = envelope.unpriced_count();
        let total_note = if unpriced > 0 {
            format!("{unpriced} record(s) without pricing")
        } else {
            String::new()
        };
        table.add_row(row![
            b -> "TOTAL",
            "",
            "",
            "",
            "",
            "",
            "",
            br -> Self::format_currency(envelope.total_cost()),
            total_note
        ]);

        Ok(format!(
            "Environment: {}\nWorkflow:    {} ({})\nLocation:    {}\nExecuted at: {}\n{}",
            envelope.environment,
            Self::label(&envelope.workflow_name),
            Self::label(&envelope.workflow_url),
            Self::label(&envelope.location_id),
            Self::label(&envelope.executed_at),
            table
        ))
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Whether to pretty-print
    pub pretty: bool,
}

impl OutputFormatter for JsonFormatter {
    fn format_envelope(&self, envelope: &ResultEnvelope) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(envelope)?
        } else {
            serde_json::to_string(envelope)?
        };
        Ok(rendered)
    }
}

/// Get the appropriate formatter for the requested output
pub fn get_formatter(json: bool, pretty: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter { pretty })
    } else {
        Box::new(TableFormatter::new(color))
    }
}
