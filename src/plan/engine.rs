//! Core plan engine for month-by-month repayment simulation

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::debt::{normalize_debts, DebtRecord, RateConvention};
use super::error::{InputError, PlanError, Shortfall};
use super::money::{self, Cents};
use super::schedule::{MonthlyRecord, Plan};
use super::state::PlanState;
use super::strategy::Strategy;

/// Hard ceiling on simulated months (50 years)
pub const DEFAULT_MAX_MONTHS: u32 = 600;

/// Configuration for a planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Months simulated before the plan is declared non-convergent
    pub max_months: u32,

    /// How debt interest rates are interpreted
    pub rate_convention: RateConvention,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            rate_convention: RateConvention::Percent,
        }
    }
}

/// Main plan engine
///
/// Holds only configuration; every call works on its own copy of the debts,
/// so one engine can serve many concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct PlanEngine {
    config: PlanConfig,
}

impl PlanEngine {
    /// Create a new plan engine with the given config
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn plan_avalanche(&self, debts: &[DebtRecord], monthly_budget: f64) -> Result<Plan, PlanError> {
        self.build_plan(debts, monthly_budget, Strategy::Avalanche)
    }

    pub fn plan_snowball(&self, debts: &[DebtRecord], monthly_budget: f64) -> Result<Plan, PlanError> {
        self.build_plan(debts, monthly_budget, Strategy::Snowball)
    }

    /// Build a complete repayment plan
    ///
    /// An infeasible budget is not an `Err`: the returned plan has an empty
    /// schedule and `feasibility_error` set. Invalid input, non-convergence
    /// and broken invariants are errors.
    pub fn build_plan(
        &self,
        debts: &[DebtRecord],
        monthly_budget: f64,
        strategy: Strategy,
    ) -> Result<Plan, PlanError> {
        if !monthly_budget.is_finite()
            || monthly_budget > money::MAX_AMOUNT
            || money::to_cents(monthly_budget) <= 0
        {
            return Err(InputError::Budget(monthly_budget).into());
        }
        let budget = money::to_cents(monthly_budget);

        let debts = normalize_debts(debts, self.config.rate_convention)?;
        let mut state = PlanState::from_debts(&debts, self.config.rate_convention);
        let mut plan = Plan::new(strategy, money::to_dollars(budget));

        if state.is_paid_off() {
            debug!("no open debts, returning empty {} plan", strategy);
            return Ok(plan);
        }

        if let Some(shortfall) = check_feasibility(&state, budget) {
            warn!(
                "budget {:.2} short of minimum payments {:.2} by {:.2}",
                shortfall.budget, shortfall.required, shortfall.shortfall
            );
            return Ok(Plan::infeasible(strategy, plan.monthly_budget, shortfall));
        }

        while !state.is_paid_off() {
            if state.month >= self.config.max_months {
                let remaining = money::to_dollars(state.open_balance());
                warn!(
                    "{} plan did not converge within {} months, {:.2} outstanding",
                    strategy, self.config.max_months, remaining
                );
                return Err(PlanError::NonConvergent {
                    max_months: self.config.max_months,
                    remaining,
                });
            }

            // Advance state to next month
            state.advance_month();

            // Simulate and record the month
            let record = self.simulate_month(&mut state, budget, strategy)?;
            plan.add_month(record);
        }

        plan.total_interest_paid = money::to_dollars(state.total_interest);

        info!(
            "{} plan for {} debts: {} months, {:.2} interest",
            strategy,
            debts.len(),
            plan.months_to_payoff,
            plan.total_interest_paid
        );

        Ok(plan)
    }

    /// Accrue interest, pay minimums, then direct the surplus by strategy
    fn simulate_month(
        &self,
        state: &mut PlanState,
        budget: Cents,
        strategy: Strategy,
    ) -> Result<MonthlyRecord, PlanError> {
        let required = state.minimum_obligations();
        if required > budget {
            return Err(PlanError::InvariantViolation {
                month: state.month,
                required: money::to_dollars(required),
                budget: money::to_dollars(budget),
            });
        }

        let interest = state.accrue_interest();

        let mut paid: Vec<Cents> = vec![0; state.debts.len()];
        let mut cleared = Vec::new();
        let mut remaining = budget;

        // Minimum payments first, capped at balance and remaining budget
        for (index, debt) in state.debts.iter_mut().enumerate() {
            if !debt.is_open() {
                continue;
            }
            let payment = debt.pay(debt.minimum.min(remaining));
            remaining -= payment;
            paid[index] += payment;
            if !debt.is_open() {
                cleared.push(index);
            }
        }

        // Surplus in strategy order
        for index in strategy.priority(&state.debts) {
            if remaining <= 0 {
                break;
            }
            let debt = &mut state.debts[index];
            let extra = debt.pay(remaining);
            remaining -= extra;
            paid[index] += extra;
            if !debt.is_open() {
                cleared.push(index);
            }
        }

        let record = MonthlyRecord::capture(state, &paid, &cleared, interest, remaining);

        debug!(
            "month {}: paid {:.2}, interest {:.2}, remaining {:.2}",
            record.month, record.total_payment, record.total_interest, record.remaining_total
        );

        Ok(record)
    }
}

/// Shortfall if the budget cannot cover the capped minimum payments
fn check_feasibility(state: &PlanState, budget: Cents) -> Option<Shortfall> {
    let required = state.minimum_obligations();
    if required > budget {
        Some(Shortfall {
            required: money::to_dollars(required),
            budget: money::to_dollars(budget),
            shortfall: money::to_dollars(required - budget),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_debts() -> Vec<DebtRecord> {
        vec![
            DebtRecord::new("card", "Credit Card", 5000.0, 18.0, 150.0),
            DebtRecord::new("loan", "Personal Loan", 2000.0, 5.0, 50.0),
            DebtRecord::new("medical", "Medical Bill", 1200.0, 0.0, 60.0),
        ]
    }

    #[test]
    fn test_avalanche_first_month() {
        let engine = PlanEngine::default();
        let plan = engine.plan_avalanche(&sample_debts(), 700.0).unwrap();
        let first = &plan.schedule[0];

        assert_eq!(plan.strategy, Strategy::Avalanche);
        assert_abs_diff_eq!(first.payment_for("loan").unwrap(), 50.0, epsilon = 0.005);
        assert_abs_diff_eq!(first.payment_for("medical").unwrap(), 60.0, epsilon = 0.005);
        assert_abs_diff_eq!(first.payment_for("card").unwrap(), 590.0, epsilon = 0.005);
        assert_abs_diff_eq!(first.total_payment, 700.0, epsilon = 0.005);
        // 5000 * 1.5% + 2000 * 5%/12
        assert_abs_diff_eq!(first.total_interest, 75.0 + 8.33, epsilon = 0.005);
    }

    #[test]
    fn test_snowball_first_month() {
        let engine = PlanEngine::default();
        let plan = engine.plan_snowball(&sample_debts(), 700.0).unwrap();
        let first = &plan.schedule[0];

        assert_eq!(plan.strategy, Strategy::Snowball);
        assert_abs_diff_eq!(first.payment_for("medical").unwrap(), 500.0, epsilon = 0.005);
        assert_abs_diff_eq!(first.payment_for("loan").unwrap(), 50.0, epsilon = 0.005);
        assert_abs_diff_eq!(first.payment_for("card").unwrap(), 150.0, epsilon = 0.005);
    }

    #[test]
    fn test_plan_clears_all_debts() {
        let engine = PlanEngine::default();
        let plan = engine.plan_avalanche(&sample_debts(), 700.0).unwrap();
        let last = plan.schedule.last().unwrap();

        assert!(plan.months_to_payoff > 0);
        assert!(plan.total_interest_paid > 0.0);
        assert_eq!(plan.months_to_payoff as usize, plan.schedule.len());
        assert_eq!(last.remaining_total, 0.0);
        assert!(last.balances.values().all(|&b| b == 0.0));
    }

    #[test]
    fn test_total_interest_matches_schedule() {
        let engine = PlanEngine::default();
        let plan = engine.plan_snowball(&sample_debts(), 700.0).unwrap();
        let summed: f64 = plan.schedule.iter().map(|r| r.total_interest).sum();

        assert_abs_diff_eq!(plan.total_interest_paid, summed, epsilon = 0.001);
    }

    #[test]
    fn test_infeasible_budget_returns_shortfall() {
        let engine = PlanEngine::default();
        let plan = engine.plan_avalanche(&sample_debts(), 100.0).unwrap();

        assert!(plan.schedule.is_empty());
        assert_eq!(plan.months_to_payoff, 0);
        let shortfall = plan.feasibility_error.unwrap();
        assert_abs_diff_eq!(shortfall.required, 260.0, epsilon = 0.001);
        assert_abs_diff_eq!(shortfall.shortfall, 160.0, epsilon = 0.001);
    }

    #[test]
    fn test_feasibility_caps_minimums_at_balance() {
        let engine = PlanEngine::default();
        let debts = vec![
            DebtRecord::new("tiny", "Tiny", 20.0, 0.0, 100.0),
            DebtRecord::new("big", "Big", 1000.0, 0.0, 100.0),
        ];
        let plan = engine.plan_avalanche(&debts, 120.0).unwrap();

        assert!(plan.is_feasible());
        assert_eq!(plan.schedule[0].payment_for("tiny"), Some(20.0));
    }

    #[test]
    fn test_invalid_budget() {
        let engine = PlanEngine::default();
        for budget in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                engine.plan_avalanche(&sample_debts(), budget),
                Err(PlanError::InvalidInput(InputError::Budget(_)))
            ));
        }
    }

    #[test]
    fn test_non_convergent_when_interest_outpaces_minimum() {
        let engine = PlanEngine::default();
        // 2% monthly interest on 10,000 is 200; only 100 is ever paid
        let debts = vec![DebtRecord::new("card", "Card", 10_000.0, 24.0, 100.0)];
        let result = engine.plan_avalanche(&debts, 100.0);

        assert!(matches!(
            result,
            Err(PlanError::NonConvergent { max_months: DEFAULT_MAX_MONTHS, .. })
        ));
    }

    #[test]
    fn test_custom_month_ceiling() {
        let engine = PlanEngine::new(PlanConfig {
            max_months: 3,
            ..Default::default()
        });
        let debts = vec![DebtRecord::new("loan", "Loan", 1000.0, 0.0, 100.0)];

        assert!(matches!(
            engine.plan_avalanche(&debts, 100.0),
            Err(PlanError::NonConvergent { max_months: 3, remaining }) if remaining == 700.0
        ));
    }

    #[test]
    fn test_fraction_convention_matches_percent() {
        let percent = PlanEngine::default().plan_avalanche(&sample_debts(), 700.0).unwrap();

        let fractions: Vec<DebtRecord> = sample_debts()
            .into_iter()
            .map(|mut d| {
                d.interest_rate /= 100.0;
                d
            })
            .collect();
        let engine = PlanEngine::new(PlanConfig {
            rate_convention: RateConvention::Fraction,
            ..Default::default()
        });
        let fraction = engine.plan_avalanche(&fractions, 700.0).unwrap();

        assert_eq!(percent.months_to_payoff, fraction.months_to_payoff);
        assert_abs_diff_eq!(percent.total_interest_paid, fraction.total_interest_paid, epsilon = 0.02);
    }

    #[test]
    fn test_minimums_over_budget_mid_plan_is_fatal() {
        let engine = PlanEngine::default();
        let debts = normalize_debts(&sample_debts(), RateConvention::Percent).unwrap();
        let mut state = PlanState::from_debts(&debts, RateConvention::Percent);
        state.advance_month();

        let result = engine.simulate_month(&mut state, money::to_cents(200.0), Strategy::Avalanche);

        assert_eq!(
            result,
            Err(PlanError::InvariantViolation {
                month: 1,
                required: 260.0,
                budget: 200.0,
            })
        );
        // nothing was applied
        assert_eq!(state.total_interest, 0);
    }

    #[test]
    fn test_leftover_budget_reported() {
        let engine = PlanEngine::default();
        let debts = vec![DebtRecord::new("loan", "Loan", 250.0, 0.0, 50.0)];
        let plan = engine.plan_avalanche(&debts, 300.0).unwrap();

        assert_eq!(plan.months_to_payoff, 1);
        assert_eq!(plan.schedule[0].unallocated, 50.0);
    }

    #[test]
    fn test_amounts_beyond_ceiling_rejected() {
        let engine = PlanEngine::default();
        let debts = vec![
            DebtRecord::new("a", "A", 1e17, 10.0, 1e17),
            DebtRecord::new("b", "B", 1e17, 10.0, 1e17),
        ];

        assert!(matches!(
            engine.plan_avalanche(&debts, 1e18),
            Err(PlanError::InvalidInput(InputError::Amount { field: "balance", .. }))
        ));
        assert!(matches!(
            engine.plan_avalanche(&sample_debts(), 1e18),
            Err(PlanError::InvalidInput(InputError::Budget(_)))
        ));
    }

    #[test]
    fn test_large_amounts_at_ceiling_plan_without_overflow() {
        let engine = PlanEngine::default();
        let debts = vec![
            DebtRecord::new("a", "A", money::MAX_AMOUNT, 0.0, money::MAX_AMOUNT / 2.0),
            DebtRecord::new("b", "B", money::MAX_AMOUNT, 0.0, money::MAX_AMOUNT / 2.0),
        ];
        let plan = engine.plan_avalanche(&debts, money::MAX_AMOUNT).unwrap();

        assert_eq!(plan.months_to_payoff, 2);
        assert_eq!(plan.schedule[0].total_payment, money::MAX_AMOUNT);
    }

    #[test]
    fn test_same_month_payoffs_follow_payment_order() {
        let engine = PlanEngine::default();
        // both clear in month 1; "b" carries the higher rate so surplus clears it first
        let debts = vec![
            DebtRecord::new("a", "A", 100.0, 0.0, 10.0),
            DebtRecord::new("b", "B", 50.0, 20.0, 10.0),
        ];
        let plan = engine.plan_avalanche(&debts, 1000.0).unwrap();

        assert_eq!(plan.months_to_payoff, 1);
        assert_eq!(plan.schedule[0].paid_off, vec!["b".to_string(), "a".to_string()]);
        let events = plan.payoff_order();
        let order: Vec<&str> = events.iter().map(|e| e.debt_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_minimum_pass_payoffs_come_first() {
        let engine = PlanEngine::default();
        let debts = vec![
            DebtRecord::new("big", "Big", 500.0, 24.0, 50.0),
            DebtRecord::new("tiny", "Tiny", 5.0, 0.0, 25.0),
        ];
        let plan = engine.plan_avalanche(&debts, 1000.0).unwrap();

        assert_eq!(plan.schedule[0].paid_off, vec!["tiny".to_string(), "big".to_string()]);
    }
}
