//! Working state for a plan simulation

use crate::debt::{Debt, RateConvention};
use super::money::{self, Cents};

/// One debt's private working copy during simulation
#[derive(Debug, Clone)]
pub struct DebtState {
    pub id: String,
    pub name: String,

    /// Outstanding balance in cents (never negative)
    pub balance: Cents,

    /// Interest rate applied each month
    pub monthly_rate: f64,

    /// Contractual minimum payment in cents
    pub minimum: Cents,
}

impl DebtState {
    pub fn from_debt(debt: &Debt, convention: RateConvention) -> Self {
        Self {
            id: debt.id.clone(),
            name: debt.name.clone(),
            balance: money::to_cents(debt.balance),
            monthly_rate: convention.monthly_rate(debt.interest_rate),
            minimum: money::to_cents(debt.minimum_payment),
        }
    }

    pub fn is_open(&self) -> bool {
        self.balance > 0
    }

    /// Minimum payment owed this month, capped at the balance
    pub fn minimum_due(&self) -> Cents {
        self.minimum.min(self.balance)
    }

    /// Apply one month of interest, returning the amount accrued
    pub fn accrue_interest(&mut self) -> Cents {
        let interest = money::monthly_interest(self.balance, self.monthly_rate);
        self.balance = self.balance.saturating_add(interest);
        interest
    }

    /// Pay down the balance, returning the amount actually applied
    pub fn pay(&mut self, amount: Cents) -> Cents {
        let applied = amount.clamp(0, self.balance);
        self.balance -= applied;
        applied
    }
}

/// State of the whole debt set at a point in the simulation
#[derive(Debug, Clone)]
pub struct PlanState {
    /// Current simulated month (1-indexed, 0 before the first month)
    pub month: u32,

    /// Working copies of every debt with a positive starting balance
    pub debts: Vec<DebtState>,

    /// Interest accrued so far across all months
    pub total_interest: Cents,
}

impl PlanState {
    /// Initialize state from normalized debts at plan start
    pub fn from_debts(debts: &[Debt], convention: RateConvention) -> Self {
        Self {
            month: 0,
            debts: debts
                .iter()
                .map(|d| DebtState::from_debt(d, convention))
                .filter(DebtState::is_open)
                .collect(),
            total_interest: 0,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    pub fn is_paid_off(&self) -> bool {
        self.debts.iter().all(|d| !d.is_open())
    }

    /// Sum of outstanding balances
    pub fn open_balance(&self) -> Cents {
        self.debts.iter().fold(0, |sum: Cents, d| sum.saturating_add(d.balance))
    }

    /// Sum of capped minimum payments over open debts
    pub fn minimum_obligations(&self) -> Cents {
        self.debts
            .iter()
            .filter(|d| d.is_open())
            .map(DebtState::minimum_due)
            .fold(0, Cents::saturating_add)
    }

    /// Accrue one month of interest on every open debt
    pub fn accrue_interest(&mut self) -> Cents {
        let interest: Cents = self
            .debts
            .iter_mut()
            .filter(|d| d.is_open())
            .map(DebtState::accrue_interest)
            .fold(0, Cents::saturating_add);
        self.total_interest = self.total_interest.saturating_add(interest);
        interest
    }
}
