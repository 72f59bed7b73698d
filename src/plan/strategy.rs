//! Repayment strategies and their surplus ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::DebtState;

/// Policy for directing surplus budget once minimums are paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest interest rate first; ties go to the smaller balance
    #[default]
    Avalanche,
    /// Smallest balance first; ties keep input order
    Snowball,
}

type Comparator = fn(&DebtState, &DebtState) -> Ordering;

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Avalanche, Strategy::Snowball];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
        }
    }

    fn comparator(&self) -> Comparator {
        match self {
            Strategy::Avalanche => by_rate_then_balance,
            Strategy::Snowball => by_balance,
        }
    }

    /// Indices of open debts in the order they receive surplus
    pub fn priority(&self, debts: &[DebtState]) -> Vec<usize> {
        let compare = self.comparator();
        let mut order: Vec<usize> = (0..debts.len()).filter(|&i| debts[i].is_open()).collect();
        // sort_by is stable, so equal keys keep input order
        order.sort_by(|&a, &b| compare(&debts[a], &debts[b]));
        order
    }
}

fn by_rate_then_balance(a: &DebtState, b: &DebtState) -> Ordering {
    b.monthly_rate
        .total_cmp(&a.monthly_rate)
        .then_with(|| a.balance.cmp(&b.balance))
}

fn by_balance(a: &DebtState, b: &DebtState) -> Ordering {
    a.balance.cmp(&b.balance)
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}', expected avalanche or snowball")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    /// Accepts the English names and the chat front-end's localized aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avalanche" | "雪崩" | "雪崩法" => Ok(Strategy::Avalanche),
            "snowball" | "雪球" | "雪球法" => Ok(Strategy::Snowball),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}
