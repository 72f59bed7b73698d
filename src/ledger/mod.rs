//! Per-user debt ledger driven by chat-style text commands
//!
//! Storage is injected through [`DebtRepository`]; the plan engine never sees it.

mod repository;
mod service;
pub mod command;

pub use repository::{DebtRepository, InMemoryRepository, PaymentRecord, RepositoryError, StoredDebt};
pub use service::{CommandOutcome, DebtLedger, DebtListing, LedgerError, PaymentReceipt, parse_payment_date};
pub use command::{parse_command, Command, CommandError, NewDebt, NewPayment};
