//! Schedule output structures for repayment plans

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use super::error::{PlanError, Shortfall};
use super::money::{self, Cents};
use super::state::PlanState;
use super::strategy::Strategy;

/// Activity for one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Simulated month (1-indexed)
    pub month: u32,

    /// Amount paid per debt id; only debts that received a payment
    pub payments: BTreeMap<String, f64>,

    /// Balance per debt id after this month, for debts open at its start
    pub balances: BTreeMap<String, f64>,

    /// Sum of this month's payments
    pub total_payment: f64,

    /// Interest accrued this month across all open debts
    pub total_interest: f64,

    /// Sum of balances after this month's activity
    pub remaining_total: f64,

    /// Budget left over once every debt was cleared
    pub unallocated: f64,

    /// Debt ids cleared this month, in the order their balances hit zero
    #[serde(default)]
    pub paid_off: Vec<String>,
}

impl MonthlyRecord {
    /// Capture the month from the post-payment state and per-debt payments
    ///
    /// `paid` is indexed like `state.debts`; `cleared` holds indices into
    /// `state.debts` in payoff order.
    pub(crate) fn capture(
        state: &PlanState,
        paid: &[Cents],
        cleared: &[usize],
        interest: Cents,
        unallocated: Cents,
    ) -> Self {
        let mut payments = BTreeMap::new();
        let mut balances = BTreeMap::new();
        let mut total_payment: Cents = 0;

        for (debt, &amount) in state.debts.iter().zip(paid) {
            if amount > 0 {
                payments.insert(debt.id.clone(), money::to_dollars(amount));
                total_payment = total_payment.saturating_add(amount);
            }
            // a debt open at the start of the month either still owes or was paid this month
            if amount > 0 || debt.is_open() {
                balances.insert(debt.id.clone(), money::to_dollars(debt.balance));
            }
        }

        Self {
            month: state.month,
            payments,
            balances,
            total_payment: money::to_dollars(total_payment),
            total_interest: money::to_dollars(interest),
            remaining_total: money::to_dollars(state.open_balance()),
            unallocated: money::to_dollars(unallocated),
            paid_off: cleared.iter().map(|&i| state.debts[i].id.clone()).collect(),
        }
    }

    pub fn payment_for(&self, debt_id: &str) -> Option<f64> {
        self.payments.get(debt_id).copied()
    }

    pub fn balance_for(&self, debt_id: &str) -> Option<f64> {
        self.balances.get(debt_id).copied()
    }
}

/// Complete repayment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub strategy: Strategy,

    /// Budget available each month (rounded to cents)
    pub monthly_budget: f64,

    /// Chronological month records
    pub schedule: Vec<MonthlyRecord>,

    /// Interest accrued over the whole schedule
    pub total_interest_paid: f64,

    /// Number of months in the schedule
    pub months_to_payoff: u32,

    /// Present only when the budget cannot cover minimum payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility_error: Option<Shortfall>,
}

impl Plan {
    pub fn new(strategy: Strategy, monthly_budget: f64) -> Self {
        Self {
            strategy,
            monthly_budget,
            schedule: Vec::new(),
            total_interest_paid: 0.0,
            months_to_payoff: 0,
            feasibility_error: None,
        }
    }

    /// An infeasible plan: no schedule, only the shortfall
    pub fn infeasible(strategy: Strategy, monthly_budget: f64, shortfall: Shortfall) -> Self {
        Self {
            feasibility_error: Some(shortfall),
            ..Self::new(strategy, monthly_budget)
        }
    }

    /// Add a month record
    pub fn add_month(&mut self, record: MonthlyRecord) {
        self.schedule.push(record);
        self.months_to_payoff = self.schedule.len() as u32;
    }

    pub fn is_feasible(&self) -> bool {
        self.feasibility_error.is_none()
    }

    /// Turn a structured infeasibility into an error for `?`-style callers
    pub fn into_result(self) -> Result<Plan, PlanError> {
        match self.feasibility_error {
            Some(shortfall) => Err(PlanError::Infeasible(shortfall)),
            None => Ok(self),
        }
    }

    /// Month in which each debt reached zero, in payoff order
    ///
    /// Debts cleared in the same month keep the order the payments cleared
    /// them: minimum pass first, then surplus in strategy priority.
    pub fn payoff_order(&self) -> Vec<PayoffEvent> {
        self.schedule
            .iter()
            .flat_map(|record| {
                record.paid_off.iter().map(|debt_id| PayoffEvent {
                    debt_id: debt_id.clone(),
                    month: record.month,
                })
            })
            .collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let total_paid: f64 = self.schedule.iter().map(|r| r.total_payment).sum();
        let final_remaining = self.schedule.last().map(|r| r.remaining_total).unwrap_or(0.0);

        PlanSummary {
            strategy: self.strategy,
            months_to_payoff: self.months_to_payoff,
            total_paid: money::round2(total_paid),
            total_interest_paid: self.total_interest_paid,
            final_remaining,
            payoff_order: self.payoff_order(),
        }
    }

    /// Write the schedule as flat CSV, one row per debt per month
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "Month",
            "DebtId",
            "Payment",
            "Balance",
            "MonthInterest",
            "MonthPayment",
            "RemainingTotal",
        ])?;

        for record in &self.schedule {
            for (debt_id, balance) in &record.balances {
                let payment = record.payment_for(debt_id).unwrap_or(0.0);
                csv_writer.write_record([
                    record.month.to_string(),
                    debt_id.clone(),
                    format!("{:.2}", payment),
                    format!("{:.2}", balance),
                    format!("{:.2}", record.total_interest),
                    format!("{:.2}", record.total_payment),
                    format!("{:.2}", record.remaining_total),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// When a debt was cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffEvent {
    pub debt_id: String,
    pub month: u32,
}

/// Summary statistics for a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub strategy: Strategy,
    pub months_to_payoff: u32,
    pub total_paid: f64,
    pub total_interest_paid: f64,
    pub final_remaining: f64,
    pub payoff_order: Vec<PayoffEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::{Debt, RateConvention};

    fn sample_state() -> PlanState {
        let debts = vec![
            Debt {
                id: "card".into(),
                name: "Card".into(),
                balance: 100.0,
                interest_rate: 0.0,
                minimum_payment: 10.0,
            },
            Debt {
                id: "loan".into(),
                name: "Loan".into(),
                balance: 50.0,
                interest_rate: 0.0,
                minimum_payment: 10.0,
            },
        ];
        PlanState::from_debts(&debts, RateConvention::Percent)
    }

    #[test]
    fn test_capture_records_payments_and_balances() {
        let mut state = sample_state();
        state.advance_month();
        state.debts[0].pay(1_000);
        state.debts[1].pay(5_000);

        let record = MonthlyRecord::capture(&state, &[1_000, 5_000], &[1], 0, 0);

        assert_eq!(record.month, 1);
        assert_eq!(record.payment_for("card"), Some(10.0));
        assert_eq!(record.payment_for("loan"), Some(50.0));
        assert_eq!(record.balance_for("loan"), Some(0.0));
        assert_eq!(record.total_payment, 60.0);
        assert_eq!(record.remaining_total, 90.0);
        assert_eq!(record.paid_off, vec!["loan".to_string()]);
    }

    #[test]
    fn test_capture_skips_zero_payments() {
        let mut state = sample_state();
        state.advance_month();
        state.debts[0].pay(1_000);

        let record = MonthlyRecord::capture(&state, &[1_000, 0], &[], 0, 0);

        assert_eq!(record.payment_for("loan"), None);
        assert_eq!(record.balance_for("loan"), Some(50.0));
    }

    #[test]
    fn test_infeasible_into_result() {
        let shortfall = Shortfall {
            required: 600.0,
            budget: 400.0,
            shortfall: 200.0,
        };
        let plan = Plan::infeasible(Strategy::Avalanche, 400.0, shortfall);

        assert!(!plan.is_feasible());
        assert!(plan.schedule.is_empty());
        assert_eq!(plan.into_result(), Err(PlanError::Infeasible(shortfall)));
    }

    #[test]
    fn test_infeasible_serializes_error_field_only_when_present() {
        let plan = Plan::new(Strategy::Snowball, 500.0);
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["strategy"], "snowball");
        assert!(json.get("feasibility_error").is_none());
    }
}
