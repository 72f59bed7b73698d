//! AWS Lambda handler for repayment planning
//!
//! Accepts a debt list, budget and strategy as JSON and returns the plan
//! (or both plans when `compare` is set) with a summary. Planning failures
//! come back in the `error` field rather than as invocation errors.

use debt_planner::{
    plan::{Plan, PlanConfig, PlanError, PlanSummary, Strategy, DEFAULT_MAX_MONTHS},
    scenario::{ScenarioRunner, StrategyComparison},
    DebtRecord, RateConvention,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input for a planning request
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    /// Debt snapshots
    #[serde(default)]
    pub debts: Vec<DebtRecord>,

    #[serde(alias = "monthlyBudget")]
    pub monthly_budget: f64,

    /// Strategy (default: avalanche)
    #[serde(default)]
    pub strategy: Strategy,

    /// Month ceiling (default: 600)
    #[serde(default = "default_max_months", alias = "maxMonths")]
    pub max_months: u32,

    /// Rate convention (default: percent)
    #[serde(default, alias = "rateConvention")]
    pub rate_convention: RateConvention,

    /// Run both strategies and include the comparison
    #[serde(default)]
    pub compare: bool,
}

fn default_max_months() -> u32 {
    DEFAULT_MAX_MONTHS
}

/// Error details returned to the caller
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// `invalid_input`, `infeasible`, `non_convergent` or `internal`
    pub kind: &'static str,
    pub message: String,
}

impl From<&PlanError> for ErrorBody {
    fn from(err: &PlanError) -> Self {
        let kind = match err {
            PlanError::InvalidInput(_) => "invalid_input",
            PlanError::Infeasible(_) => "infeasible",
            PlanError::NonConvergent { .. } => "non_convergent",
            PlanError::InvariantViolation { .. } => "internal",
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Output of a planning request
#[derive(Debug, Serialize, Default)]
pub struct PlanResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PlanSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<StrategyComparison>,
    pub execution_time_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

fn plan_request(request: &PlanRequest) -> Result<PlanResponse, PlanError> {
    let runner = ScenarioRunner::with_config(PlanConfig {
        max_months: request.max_months,
        rate_convention: request.rate_convention,
    });

    if request.compare {
        let comparison = runner.compare(&request.debts, request.monthly_budget)?;
        let plan = comparison.plan(request.strategy).clone().into_result()?;
        return Ok(PlanResponse {
            summary: Some(plan.summary()),
            plan: Some(plan),
            comparison: Some(comparison),
            ..Default::default()
        });
    }

    let plan = runner
        .run(&request.debts, request.monthly_budget, request.strategy)?
        .into_result()?;
    Ok(PlanResponse {
        summary: Some(plan.summary()),
        plan: Some(plan),
        ..Default::default()
    })
}

async fn handler(event: LambdaEvent<PlanRequest>) -> Result<PlanResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    log::info!(
        "planning {} debts, budget {:.2}, strategy {}",
        request.debts.len(),
        request.monthly_budget,
        request.strategy
    );

    let mut response = match plan_request(&request) {
        Ok(response) => response,
        Err(err) => {
            log::warn!("planning failed: {}", err);
            PlanResponse {
                error: Some(ErrorBody::from(&err)),
                ..Default::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis();

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
