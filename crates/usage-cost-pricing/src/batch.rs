//! Batch assembly
//!
//! Prices a whole workflow's usage and wraps it with the batch metadata the
//! caller sent. The output holds exactly one priced record per input record, in
//! input order, whether or not each record found a price.

use crate::cost_calculator::CostCalculator;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::info;
use usage_cost_core::types::{CostRequest, PricingEntry, ResultEnvelope, WorkflowUsage};

/// Format a timestamp the way generated `executed_at` values are reported
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Price a validated request, stamping missing execution times with the current time
pub fn calculate_usage_costs(request: CostRequest) -> ResultEnvelope {
    assemble(
        request.workflow_usage,
        &request.provider_costs,
        request.environment,
        Utc::now(),
    )
}

/// Price a workflow's usage against a price list
///
/// `now` is only used when the workflow carries no `executed_at` of its own.
pub fn assemble(
    workflow_usage: WorkflowUsage,
    provider_costs: &[PricingEntry],
    environment: String,
    now: DateTime<Utc>,
) -> ResultEnvelope {
    let calculator = CostCalculator::from_pricing_table(provider_costs);

    let executed_at = workflow_usage
        .executed_at()
        .cloned()
        .unwrap_or_else(|| Value::String(format_timestamp(now)));

    let WorkflowUsage {
        location_id,
        workflow_name,
        workflow_url,
        usage,
        ..
    } = workflow_usage;

    let usage_with_costs = calculator.price_records(usage);

    let envelope = ResultEnvelope {
        environment,
        location_id,
        workflow_name,
        workflow_url,
        executed_at,
        usage_with_costs,
    };

    info!(
        "Priced {} usage records against {} pricing entries ({} without pricing)",
        envelope.usage_with_costs.len(),
        calculator.lookup().len(),
        envelope.unpriced_count()
    );

    envelope
}
