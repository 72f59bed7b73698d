//! Repayment plan engine: monthly simulation of interest and payments

pub mod money;
mod error;
mod strategy;
mod state;
mod engine;
mod schedule;

pub use error::{PlanError, InputError, Shortfall};
pub use strategy::{Strategy, StrategyParseError};
pub use state::{DebtState, PlanState};
pub use engine::{PlanEngine, PlanConfig, DEFAULT_MAX_MONTHS};
pub use schedule::{MonthlyRecord, Plan, PlanSummary, PayoffEvent};
