//! Debt Planner - Month-by-month debt repayment planning engine
//!
//! This library provides:
//! - Normalization of heterogeneous debt snapshots into a canonical working set
//! - Avalanche (highest rate first) and snowball (smallest balance first) schedules
//! - Feasibility and convergence checks with typed failures
//! - Strategy comparison and parallel budget sweeps
//! - A debt ledger over an injected repository, driven by chat-style text commands

pub mod debt;
pub mod plan;
pub mod scenario;
pub mod ledger;

// Re-export commonly used types
pub use debt::{Debt, DebtRecord, RateConvention};
pub use plan::{Plan, PlanConfig, PlanEngine, PlanError, MonthlyRecord, Strategy};
pub use scenario::ScenarioRunner;
pub use ledger::{Command, DebtLedger, DebtRepository, InMemoryRepository};
