//! Debt and payment storage abstraction

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debt::DebtRecord;

/// A debt as kept by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDebt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    /// Annual rate as a percentage
    pub rate: f64,
    /// Day of month the payment is due (1-31)
    pub due_day: Option<u8>,
    pub minimum_payment: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl StoredDebt {
    /// Snapshot for the plan engine; a missing minimum counts as zero
    pub fn to_record(&self) -> DebtRecord {
        DebtRecord::new(
            self.id.clone(),
            self.name.clone(),
            self.balance,
            self.rate,
            self.minimum_payment.unwrap_or(0.0),
        )
    }
}

/// A recorded payment against a debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub debt_id: String,
    pub debt_name: String,
    pub amount: f64,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("debt '{0}' not found in storage")]
    DebtNotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Storage for per-user debts and payments
///
/// Implementations decide persistence; the ledger only needs these calls.
pub trait DebtRepository {
    /// All debts for a user, in insertion order
    fn debts(&self, user_id: &str) -> Result<Vec<StoredDebt>, RepositoryError>;

    fn insert_debt(&mut self, user_id: &str, debt: StoredDebt) -> Result<(), RepositoryError>;

    fn update_balance(&mut self, user_id: &str, debt_id: &str, balance: f64) -> Result<StoredDebt, RepositoryError>;

    fn insert_payment(&mut self, user_id: &str, payment: PaymentRecord) -> Result<(), RepositoryError>;

    /// All payments for a user, in insertion order
    fn payments(&self, user_id: &str) -> Result<Vec<PaymentRecord>, RepositoryError>;
}

/// Process-local repository keyed by user
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    debts: HashMap<String, Vec<StoredDebt>>,
    payments: HashMap<String, Vec<PaymentRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DebtRepository for InMemoryRepository {
    fn debts(&self, user_id: &str) -> Result<Vec<StoredDebt>, RepositoryError> {
        Ok(self.debts.get(user_id).cloned().unwrap_or_default())
    }

    fn insert_debt(&mut self, user_id: &str, debt: StoredDebt) -> Result<(), RepositoryError> {
        self.debts.entry(user_id.to_string()).or_default().push(debt);
        Ok(())
    }

    fn update_balance(&mut self, user_id: &str, debt_id: &str, balance: f64) -> Result<StoredDebt, RepositoryError> {
        let debt = self
            .debts
            .get_mut(user_id)
            .and_then(|debts| debts.iter_mut().find(|d| d.id == debt_id))
            .ok_or_else(|| RepositoryError::DebtNotFound(debt_id.to_string()))?;
        debt.balance = balance;
        Ok(debt.clone())
    }

    fn insert_payment(&mut self, user_id: &str, payment: PaymentRecord) -> Result<(), RepositoryError> {
        self.payments.entry(user_id.to_string()).or_default().push(payment);
        Ok(())
    }

    fn payments(&self, user_id: &str) -> Result<Vec<PaymentRecord>, RepositoryError> {
        Ok(self.payments.get(user_id).cloned().unwrap_or_default())
    }
}
