//! Planning failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::MAX_AMOUNT;

/// Minimum payments the budget cannot cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Sum of minimum payments (capped at each balance)
    pub required: f64,
    /// Monthly budget supplied
    pub budget: f64,
    /// `required - budget`
    pub shortfall: f64,
}

/// Input rejected before any month is simulated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("monthly budget must be a positive number up to {max}, got {0}", max = MAX_AMOUNT)]
    Budget(f64),

    #[error("debt '{debt_id}': {field} must be between 0 and {max}, got {value}", max = MAX_AMOUNT)]
    Amount {
        debt_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("debt '{debt_id}': interest rate {rate} is outside 0..={max}")]
    Rate { debt_id: String, rate: f64, max: f64 },

    #[error("duplicate debt id '{0}'")]
    DuplicateId(String),
}

/// Errors that can occur while building a plan
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error(
        "monthly budget {:.2} cannot cover minimum payments of {:.2} (short by {:.2})",
        .0.budget, .0.required, .0.shortfall
    )]
    Infeasible(Shortfall),

    #[error("balances not paid off within {max_months} months ({remaining:.2} still owed)")]
    NonConvergent { max_months: u32, remaining: f64 },

    #[error("month {month}: minimum obligations {required:.2} exceed budget {budget:.2}")]
    InvariantViolation { month: u32, required: f64, budget: f64 },
}

impl PlanError {
    /// Whether the failure stems from caller input rather than the model
    pub fn is_user_error(&self) -> bool {
        matches!(self, PlanError::InvalidInput(_) | PlanError::Infeasible(_))
    }
}
