//! Debt data structures for planning input

use serde::{Deserialize, Serialize};

/// How a stored annual interest rate is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateConvention {
    /// APR as a percentage (18.0 = 18%)
    #[default]
    Percent,
    /// APR as a fraction (0.18 = 18%)
    Fraction,
    /// Rates at or below 1 are fractions, anything above is a percentage
    Auto,
}

impl RateConvention {
    /// Convert an annual nominal rate to the monthly rate applied to balances
    pub fn monthly_rate(&self, annual_rate: f64) -> f64 {
        match self {
            RateConvention::Percent => annual_rate / 1200.0,
            RateConvention::Fraction => annual_rate / 12.0,
            RateConvention::Auto => {
                if annual_rate <= 1.0 {
                    annual_rate / 12.0
                } else {
                    annual_rate / 1200.0
                }
            }
        }
    }

    /// Largest annual rate accepted under this convention (100% APR)
    pub fn max_rate(&self) -> f64 {
        match self {
            RateConvention::Percent | RateConvention::Auto => 100.0,
            RateConvention::Fraction => 1.0,
        }
    }
}

/// A raw debt snapshot as supplied by callers
///
/// Field aliases cover the spellings used by the chat front-end, the
/// persistence layer and spreadsheet exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    /// Opaque identifier; falls back to the name when absent
    #[serde(default)]
    pub id: Option<String>,

    /// Display name; falls back to the id when absent
    #[serde(default)]
    pub name: Option<String>,

    /// Outstanding balance
    #[serde(default)]
    pub balance: f64,

    /// Annual nominal interest rate
    #[serde(default, alias = "interestRate", alias = "rate")]
    pub interest_rate: f64,

    /// Minimum monthly payment
    #[serde(
        default,
        alias = "minimumPayment",
        alias = "minPayment",
        alias = "min_payment"
    )]
    pub minimum_payment: f64,
}

impl DebtRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        interest_rate: f64,
        minimum_payment: f64,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            balance,
            interest_rate,
            minimum_payment,
        }
    }
}

/// A debt in canonical form, validated and rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Identifier, unique within a plan
    pub id: String,

    /// Display name
    pub name: String,

    /// Outstanding balance (two-decimal precision)
    pub balance: f64,

    /// Annual nominal interest rate, in the plan's rate convention
    pub interest_rate: f64,

    /// Minimum monthly payment (two-decimal precision)
    pub minimum_payment: f64,
}
