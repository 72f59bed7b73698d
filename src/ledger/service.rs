//! Debt ledger service over an injected repository

use chrono::{Datelike, Local, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::command::{Command, NewDebt, NewPayment};
use super::repository::{DebtRepository, PaymentRecord, RepositoryError, StoredDebt};
use crate::debt::DebtRecord;
use crate::plan::{money, Plan, PlanEngine, PlanError, Strategy};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("user id is required")]
    MissingUser,

    #[error("debt name is required")]
    MissingName,

    #[error("balance must be a positive number, got {0}")]
    InvalidBalance(f64),

    #[error("interest rate must be between 0% and 100%, got {0}")]
    InvalidRate(f64),

    #[error("due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),

    #[error("minimum payment must be zero or positive, got {0}")]
    InvalidMinimum(f64),

    #[error("debt '{0}' already exists")]
    DuplicateDebt(String),

    #[error("payment amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("unrecognized date '{0}', use YYYY-MM-DD or MM/DD")]
    InvalidDate(String),

    #[error("debt '{0}' not found, add it with /add first")]
    UnknownDebt(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// A user's debts with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtListing {
    pub debts: Vec<StoredDebt>,
    pub total_balance: f64,
    pub count: usize,
}

/// A stored payment and the debt it reduced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: PaymentRecord,
    pub updated_debt: StoredDebt,
}

/// Result of executing a parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    DebtAdded(StoredDebt),
    Listing(DebtListing),
    PaymentRecorded(PaymentReceipt),
    Plan(Plan),
}

/// Per-user debt bookkeeping; plans are delegated to the pure engine
#[derive(Debug, Clone)]
pub struct DebtLedger<R: DebtRepository> {
    repository: R,
    engine: PlanEngine,
    sequence: u64,
}

impl<R: DebtRepository> DebtLedger<R> {
    pub fn new(repository: R) -> Self {
        Self::with_engine(repository, PlanEngine::default())
    }

    pub fn with_engine(repository: R, engine: PlanEngine) -> Self {
        Self {
            repository,
            engine,
            sequence: 0,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Dispatch a parsed command for a user
    pub fn execute(&mut self, user_id: &str, command: Command) -> Result<CommandOutcome, LedgerError> {
        match command {
            Command::Add(debt) => self.add_debt(user_id, debt).map(CommandOutcome::DebtAdded),
            Command::List => self.list_debts(user_id).map(CommandOutcome::Listing),
            Command::Pay(payment) => self.record_payment(user_id, payment).map(CommandOutcome::PaymentRecorded),
            Command::Plan { monthly_budget, strategy } => {
                self.plan(user_id, monthly_budget, strategy).map(CommandOutcome::Plan)
            }
        }
    }

    /// Validate and store a new debt; names are unique per user, ignoring case
    pub fn add_debt(&mut self, user_id: &str, debt: NewDebt) -> Result<StoredDebt, LedgerError> {
        require_user(user_id)?;

        let name = debt.name.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingName);
        }
        if !debt.balance.is_finite() || debt.balance <= 0.0 {
            return Err(LedgerError::InvalidBalance(debt.balance));
        }
        if !(0.0..=100.0).contains(&debt.rate) {
            return Err(LedgerError::InvalidRate(debt.rate));
        }
        let due_day = match debt.due_day {
            Some(day) if (1..=31).contains(&day) => Some(day as u8),
            Some(day) => return Err(LedgerError::InvalidDueDay(day)),
            None => None,
        };
        if let Some(minimum) = debt.minimum_payment {
            if !minimum.is_finite() || minimum < 0.0 {
                return Err(LedgerError::InvalidMinimum(minimum));
            }
        }

        let existing = self.repository.debts(user_id)?;
        if existing.iter().any(|d| same_name(&d.name, name)) {
            return Err(LedgerError::DuplicateDebt(name.to_string()));
        }

        let stored = StoredDebt {
            id: self.next_id("debt"),
            name: name.to_string(),
            balance: debt.balance,
            rate: debt.rate,
            due_day,
            minimum_payment: debt.minimum_payment,
            created_at: Utc::now(),
        };
        self.repository.insert_debt(user_id, stored.clone())?;

        info!("user {} added debt '{}' ({:.2})", user_id, stored.name, stored.balance);
        Ok(stored)
    }

    pub fn list_debts(&self, user_id: &str) -> Result<DebtListing, LedgerError> {
        require_user(user_id)?;

        let debts = self.repository.debts(user_id)?;
        let total_balance = money::round2(debts.iter().map(|d| d.balance).sum());

        Ok(DebtListing {
            count: debts.len(),
            total_balance,
            debts,
        })
    }

    /// Store a payment and lower the debt's balance, never below zero
    pub fn record_payment(&mut self, user_id: &str, payment: NewPayment) -> Result<PaymentReceipt, LedgerError> {
        require_user(user_id)?;

        let debt_name = payment.debt_name.trim();
        if debt_name.is_empty() {
            return Err(LedgerError::MissingName);
        }
        if !payment.amount.is_finite() || payment.amount <= 0.0 {
            return Err(LedgerError::InvalidAmount(payment.amount));
        }

        let today = Local::now().date_naive();
        let date = match payment.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(input) => {
                parse_payment_date(input, today).ok_or_else(|| LedgerError::InvalidDate(input.to_string()))?
            }
            None => today,
        };

        let debt = self
            .repository
            .debts(user_id)?
            .into_iter()
            .find(|d| same_name(&d.name, debt_name))
            .ok_or_else(|| LedgerError::UnknownDebt(debt_name.to_string()))?;

        let record = PaymentRecord {
            id: self.next_id("payment"),
            debt_id: debt.id.clone(),
            debt_name: debt.name.clone(),
            amount: payment.amount,
            note: payment.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            date,
            created_at: Utc::now(),
        };
        self.repository.insert_payment(user_id, record.clone())?;

        let balance = money::round2((debt.balance - payment.amount).max(0.0));
        let updated_debt = self.repository.update_balance(user_id, &debt.id, balance)?;

        info!(
            "user {} paid {:.2} toward '{}', {:.2} remaining",
            user_id, record.amount, updated_debt.name, updated_debt.balance
        );

        Ok(PaymentReceipt {
            payment: record,
            updated_debt,
        })
    }

    /// Plan repayment of the user's stored debts
    pub fn plan(&self, user_id: &str, monthly_budget: f64, strategy: Strategy) -> Result<Plan, LedgerError> {
        require_user(user_id)?;

        let records: Vec<DebtRecord> = self
            .repository
            .debts(user_id)?
            .iter()
            .map(StoredDebt::to_record)
            .collect();

        Ok(self.engine.build_plan(&records, monthly_budget, strategy)?)
    }

    fn next_id(&mut self, kind: &str) -> String {
        self.sequence += 1;
        format!("{}-{}-{}", kind, Utc::now().timestamp_millis(), self.sequence)
    }
}

/// Debt names match ignoring case, including non-ASCII letters
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn require_user(user_id: &str) -> Result<(), LedgerError> {
    if user_id.trim().is_empty() {
        Err(LedgerError::MissingUser)
    } else {
        Ok(())
    }
}

/// Parse `YYYY-MM-DD`, or `MM/DD` (also `.`/`-`) in the year of `today`
pub fn parse_payment_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    let (month, day) = input.split_once(['/', '.', '-'])?;
    if month.len() > 2 || day.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(today.year(), month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::command::parse_command;
    use crate::ledger::InMemoryRepository;

    fn new_debt(name: &str, balance: f64, rate: f64, minimum: Option<f64>) -> NewDebt {
        NewDebt {
            name: name.to_string(),
            balance,
            rate,
            due_day: Some(10),
            minimum_payment: minimum,
        }
    }

    fn payment(name: &str, amount: f64, date: Option<&str>) -> NewPayment {
        NewPayment {
            debt_name: name.to_string(),
            amount,
            date: date.map(str::to_string),
            note: None,
        }
    }

    #[test]
    fn test_add_and_list() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());
        ledger.add_debt("u1", new_debt("Card", 2000.0, 18.0, Some(200.0))).unwrap();
        ledger.add_debt("u1", new_debt("Loan", 5000.0, 2.0, Some(200.0))).unwrap();

        let listing = ledger.list_debts("u1").unwrap();
        assert_eq!(listing.count, 2);
        assert_eq!(listing.total_balance, 7000.0);
        assert_ne!(listing.debts[0].id, listing.debts[1].id);
        assert_eq!(ledger.list_debts("u2").unwrap().count, 0);
    }

    #[test]
    fn test_add_validation() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());

        assert_eq!(ledger.add_debt("", new_debt("Card", 1.0, 1.0, None)), Err(LedgerError::MissingUser));
        assert_eq!(ledger.add_debt("u1", new_debt("  ", 1.0, 1.0, None)), Err(LedgerError::MissingName));
        assert_eq!(
            ledger.add_debt("u1", new_debt("Card", 0.0, 1.0, None)),
            Err(LedgerError::InvalidBalance(0.0))
        );
        assert_eq!(
            ledger.add_debt("u1", new_debt("Card", 1.0, 101.0, None)),
            Err(LedgerError::InvalidRate(101.0))
        );
        assert_eq!(
            ledger.add_debt("u1", new_debt("Card", 1.0, 1.0, Some(-1.0))),
            Err(LedgerError::InvalidMinimum(-1.0))
        );

        let mut late = new_debt("Card", 1.0, 1.0, None);
        late.due_day = Some(40);
        assert_eq!(ledger.add_debt("u1", late), Err(LedgerError::InvalidDueDay(40)));
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());
        ledger.add_debt("u1", new_debt("Card", 100.0, 10.0, None)).unwrap();

        assert_eq!(
            ledger.add_debt("u1", new_debt("CARD", 100.0, 10.0, None)),
            Err(LedgerError::DuplicateDebt("CARD".to_string()))
        );
        // other users may reuse the name
        assert!(ledger.add_debt("u2", new_debt("Card", 100.0, 10.0, None)).is_ok());
    }

    #[test]
    fn test_names_fold_non_ascii_case() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());
        ledger.add_debt("u1", new_debt("Élan", 100.0, 10.0, None)).unwrap();

        assert_eq!(
            ledger.add_debt("u1", new_debt("éLAN", 100.0, 10.0, None)),
            Err(LedgerError::DuplicateDebt("éLAN".to_string()))
        );

        let receipt = ledger.record_payment("u1", payment("élan", 40.0, None)).unwrap();
        assert_eq!(receipt.updated_debt.name, "Élan");
        assert_eq!(receipt.updated_debt.balance, 60.0);
    }

    #[test]
    fn test_record_payment_reduces_balance() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());
        ledger.add_debt("u1", new_debt("Card", 100.0, 10.0, None)).unwrap();

        let receipt = ledger.record_payment("u1", payment("card", 30.0, Some("2024-03-05"))).unwrap();
        assert_eq!(receipt.updated_debt.balance, 70.0);
        assert_eq!(receipt.payment.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(receipt.payment.debt_name, "Card");

        // overpayment floors at zero
        let receipt = ledger.record_payment("u1", payment("Card", 500.0, None)).unwrap();
        assert_eq!(receipt.updated_debt.balance, 0.0);
        assert_eq!(ledger.repository().payments("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_record_payment_errors() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());
        ledger.add_debt("u1", new_debt("Card", 100.0, 10.0, None)).unwrap();

        assert_eq!(
            ledger.record_payment("u1", payment("Card", -5.0, None)),
            Err(LedgerError::InvalidAmount(-5.0))
        );
        assert_eq!(
            ledger.record_payment("u1", payment("Card", 5.0, Some("13/40"))),
            Err(LedgerError::InvalidDate("13/40".to_string()))
        );
        assert_eq!(
            ledger.record_payment("u1", payment("Mortgage", 5.0, None)),
            Err(LedgerError::UnknownDebt("Mortgage".to_string()))
        );
    }

    #[test]
    fn test_parse_payment_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        assert_eq!(parse_payment_date("2024-02-29", today), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_payment_date("3/7", today), NaiveDate::from_ymd_opt(2025, 3, 7));
        assert_eq!(parse_payment_date("12.31", today), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(parse_payment_date("2/30", today), None);
        assert_eq!(parse_payment_date("yesterday", today), None);
    }

    #[test]
    fn test_execute_commands_end_to_end() {
        let mut ledger = DebtLedger::new(InMemoryRepository::new());

        for line in [
            "/add Card 2000 18% d=5 min=200",
            "/add Loan 5000 2% d=20 min=200",
        ] {
            let command = parse_command(line).unwrap();
            assert!(matches!(ledger.execute("u1", command), Ok(CommandOutcome::DebtAdded(_))));
        }

        let outcome = ledger.execute("u1", parse_command("/plan 1000 avalanche").unwrap()).unwrap();
        let CommandOutcome::Plan(plan) = outcome else {
            panic!("expected a plan");
        };
        let card_id = ledger.list_debts("u1").unwrap().debts[0].id.clone();
        assert!(plan.schedule[0].payment_for(&card_id).unwrap() > 400.0);

        let outcome = ledger.execute("u1", parse_command("/plan 300").unwrap()).unwrap();
        let CommandOutcome::Plan(plan) = outcome else {
            panic!("expected a plan");
        };
        assert!(!plan.is_feasible());
    }
}
