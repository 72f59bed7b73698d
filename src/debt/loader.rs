//! Load debt snapshots from CSV or JSON files
//!
//! CSV files carry a header row; columns may use any of the field spellings
//! accepted by [`DebtRecord`] (e.g. `interest_rate` or `rate`).

use super::DebtRecord;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Load debts from a file, choosing the format from the extension
///
/// `.json` files hold an array of records; anything else is read as CSV.
pub fn load_debts<P: AsRef<Path>>(path: P) -> Result<Vec<DebtRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open debts file {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        load_debts_from_json(file)
    } else {
        load_debts_from_reader(file)
    }
    .with_context(|| format!("failed to parse debts from {}", path.display()))?;

    log::debug!("loaded {} debt records from {}", records.len(), path.display());
    Ok(records)
}

/// Load debts from any CSV reader (e.g., string buffer, network stream)
pub fn load_debts_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<DebtRecord>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for (line, result) in csv_reader.deserialize().enumerate() {
        let record: DebtRecord = result.with_context(|| format!("invalid debt row {}", line + 1))?;
        records.push(record);
    }

    Ok(records)
}

/// Load debts from a JSON array
pub fn load_debts_from_json<R: std::io::Read>(reader: R) -> Result<Vec<DebtRecord>> {
    let records = serde_json::from_reader(reader).context("invalid debt JSON")?;
    Ok(records)
}
