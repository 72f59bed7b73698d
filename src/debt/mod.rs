//! Debt snapshot structures, normalization and loading

mod data;
mod normalize;
pub mod loader;

pub use data::{Debt, DebtRecord, RateConvention};
pub use normalize::normalize_debts;
pub use loader::{load_debts, load_debts_from_reader, load_debts_from_json};
