//! Debt snapshot normalization

use std::collections::HashSet;

use super::{Debt, DebtRecord, RateConvention};
use crate::plan::money::{round2, MAX_AMOUNT};
use crate::plan::InputError;

/// Convert raw snapshots into the canonical working set
///
/// Ids fall back to the name, then to the record's 1-based position. Every
/// record is validated (including zero balances) before zero balances are
/// dropped, and ids must be unique across the input.
pub fn normalize_debts(
    records: &[DebtRecord],
    convention: RateConvention,
) -> Result<Vec<Debt>, InputError> {
    let mut seen = HashSet::new();
    let mut debts = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let id = non_empty(&record.id)
            .or_else(|| non_empty(&record.name))
            .unwrap_or_else(|| format!("debt-{}", index + 1));
        let name = non_empty(&record.name)
            .or_else(|| non_empty(&record.id))
            .unwrap_or_else(|| "Debt".to_string());

        check_amount(&id, "balance", record.balance)?;
        check_amount(&id, "minimum payment", record.minimum_payment)?;

        let max = convention.max_rate();
        let rate = record.interest_rate;
        if !rate.is_finite() || rate < 0.0 || rate > max {
            return Err(InputError::Rate { debt_id: id, rate, max });
        }

        if !seen.insert(id.clone()) {
            return Err(InputError::DuplicateId(id));
        }

        let balance = round2(record.balance);
        if balance <= 0.0 {
            continue;
        }

        debts.push(Debt {
            id,
            name,
            balance,
            interest_rate: rate,
            minimum_payment: round2(record.minimum_payment),
        });
    }

    Ok(debts)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn check_amount(debt_id: &str, field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && (0.0..=MAX_AMOUNT).contains(&value) {
        Ok(())
    } else {
        Err(InputError::Amount {
            debt_id: debt_id.to_string(),
            field,
            value,
        })
    }
}
