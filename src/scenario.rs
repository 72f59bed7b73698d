//! Scenario runner for strategy comparisons and budget sweeps
//!
//! Every scenario goes through one [`PlanEngine`], so comparisons share a
//! configuration.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::debt::DebtRecord;
use crate::plan::{Plan, PlanConfig, PlanEngine, PlanError, Strategy};

/// Runner for batches of plans over one debt set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let comparison = runner.compare(&debts, 700.0)?;
/// println!("avalanche saves {:.2}", comparison.interest_saved());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: PlanEngine,
}

impl ScenarioRunner {
    /// Create runner with the default plan configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlanConfig) -> Self {
        Self {
            engine: PlanEngine::new(config),
        }
    }

    pub fn engine(&self) -> &PlanEngine {
        &self.engine
    }

    /// Run a single plan
    pub fn run(&self, debts: &[DebtRecord], monthly_budget: f64, strategy: Strategy) -> Result<Plan, PlanError> {
        self.engine.build_plan(debts, monthly_budget, strategy)
    }

    /// Run both strategies on the same debts and budget
    pub fn compare(&self, debts: &[DebtRecord], monthly_budget: f64) -> Result<StrategyComparison, PlanError> {
        let (avalanche, snowball) = rayon::join(
            || self.run(debts, monthly_budget, Strategy::Avalanche),
            || self.run(debts, monthly_budget, Strategy::Snowball),
        );

        Ok(StrategyComparison {
            avalanche: avalanche?,
            snowball: snowball?,
        })
    }

    /// Run one strategy across many budgets in parallel
    ///
    /// Failures are captured per point so one non-convergent budget does not
    /// hide the rest of the curve.
    pub fn budget_sweep(&self, debts: &[DebtRecord], budgets: &[f64], strategy: Strategy) -> Vec<SweepPoint> {
        budgets
            .par_iter()
            .map(|&budget| SweepPoint::from_result(budget, self.run(debts, budget, strategy)))
            .collect()
    }
}

/// The same debts planned under both strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub avalanche: Plan,
    pub snowball: Plan,
}

impl StrategyComparison {
    /// Interest avoided by choosing avalanche over snowball
    pub fn interest_saved(&self) -> f64 {
        crate::plan::money::round2(self.snowball.total_interest_paid - self.avalanche.total_interest_paid)
    }

    /// Strategy with the lower total interest; avalanche on ties
    pub fn cheaper(&self) -> Strategy {
        if self.snowball.total_interest_paid < self.avalanche.total_interest_paid {
            Strategy::Snowball
        } else {
            Strategy::Avalanche
        }
    }

    pub fn plan(&self, strategy: Strategy) -> &Plan {
        match strategy {
            Strategy::Avalanche => &self.avalanche,
            Strategy::Snowball => &self.snowball,
        }
    }
}

/// Outcome of one budget in a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub monthly_budget: f64,
    pub months_to_payoff: Option<u32>,
    pub total_interest_paid: Option<f64>,
    pub error: Option<String>,
}

impl SweepPoint {
    fn from_result(monthly_budget: f64, result: Result<Plan, PlanError>) -> Self {
        match result.and_then(Plan::into_result) {
            Ok(plan) => Self {
                monthly_budget,
                months_to_payoff: Some(plan.months_to_payoff),
                total_interest_paid: Some(plan.total_interest_paid),
                error: None,
            },
            Err(e) => Self {
                monthly_budget,
                months_to_payoff: None,
                total_interest_paid: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Budgets from `start` to `end` inclusive in `step` increments
pub fn budget_range(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || end < start {
        return Vec::new();
    }
    let count = ((end - start) / step + 1e-9).floor() as usize + 1;
    (0..count)
        .map(|i| crate::plan::money::round2(start + step * i as f64))
        .collect()
}
