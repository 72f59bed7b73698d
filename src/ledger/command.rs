//! Text command parsing
//!
//! Supported commands:
//! - `/add <name> <balance> <rate>% d=<due day> [min=<minimum>]`
//! - `/list`
//! - `/pay <name> <amount> [date] [note...]`
//! - `/plan <budget> [strategy]`

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::plan::{Strategy, StrategyParseError};

/// Optional minus sign, digits, optional fraction: no exponents or separators
static NUMBER: Lazy<Regex> = Lazy::new(|| grammar(r"^-?[0-9]+(?:\.[0-9]+)?$"));
static PERCENT: Lazy<Regex> = Lazy::new(|| grammar(r"^(-?[0-9]+(?:\.[0-9]+)?)%$"));
static DUE_DAY: Lazy<Regex> = Lazy::new(|| grammar(r"(?i)^(?:due|d)=([0-9]{1,2})$"));
static MIN_PAYMENT: Lazy<Regex> = Lazy::new(|| grammar(r"(?i)^min=([0-9]+(?:\.[0-9]+)?)$"));
/// `YYYY-MM-DD` or a short `M/D`, `M.D`, `M-D` form
static DATE: Lazy<Regex> = Lazy::new(|| grammar(r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{1,2}[/.-][0-9]{1,2})$"));

fn grammar(pattern: &str) -> Regex {
    Regex::new(pattern).expect("command grammar patterns are valid")
}

const ADD_USAGE: &str = "/add <name> <balance> <rate>% d=<due day> [min=<minimum>]";
const PAY_USAGE: &str = "/pay <name> <amount> [date] [note]";
const PLAN_USAGE: &str = "/plan <budget> [avalanche|snowball]";

/// Input for a new ledger debt
#[derive(Debug, Clone, PartialEq)]
pub struct NewDebt {
    pub name: String,
    pub balance: f64,
    /// Annual rate as a percentage
    pub rate: f64,
    pub due_day: Option<u32>,
    pub minimum_payment: Option<f64>,
}

/// Input for a payment against a ledger debt
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub debt_name: String,
    pub amount: f64,
    /// `YYYY-MM-DD` or `MM/DD`; today when absent
    pub date: Option<String>,
    pub note: Option<String>,
}

/// A parsed chat command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(NewDebt),
    List,
    Pay(NewPayment),
    Plan { monthly_budget: f64, strategy: Strategy },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command, try /list")]
    Empty,

    #[error("commands start with '/', e.g. /list")]
    MissingSlash,

    #[error("unsupported command '{0}', use /add, /list, /pay or /plan")]
    Unsupported(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    #[error("interest rate must be a percentage such as 14.9%, got '{0}'")]
    InvalidRate(String),

    #[error("interest rate must be between 0% and 100%")]
    RateOutOfRange,

    #[error("due day must be between 1 and 31")]
    DueDayOutOfRange,

    #[error("due day is required, add d=<day>")]
    MissingDueDay,

    #[error("unrecognized argument '{0}', expected d=<day> or min=<amount>")]
    UnknownArgument(String),

    #[error("/list takes no arguments")]
    UnexpectedArguments,

    #[error(transparent)]
    Strategy(#[from] StrategyParseError),
}

/// Parse one line of chat input into a command
pub fn parse_command(text: &str) -> Result<Command, CommandError> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next().ok_or(CommandError::Empty)?;
    let args: Vec<&str> = tokens.collect();

    let name = head.strip_prefix('/').ok_or(CommandError::MissingSlash)?;
    match name.to_lowercase().as_str() {
        "add" => parse_add(&args),
        "list" if args.is_empty() => Ok(Command::List),
        "list" => Err(CommandError::UnexpectedArguments),
        "pay" => parse_pay(&args),
        "plan" => parse_plan(&args),
        _ => Err(CommandError::Unsupported(head.to_string())),
    }
}

fn parse_add(args: &[&str]) -> Result<Command, CommandError> {
    let [name, balance, rate, options @ ..] = args else {
        return Err(CommandError::Usage(ADD_USAGE));
    };
    if options.is_empty() {
        return Err(CommandError::Usage(ADD_USAGE));
    }

    let balance = parse_number("balance", balance)?;
    if balance <= 0.0 {
        return Err(CommandError::NotPositive("balance"));
    }

    let rate: f64 = PERCENT
        .captures(rate)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| CommandError::InvalidRate(rate.to_string()))?;
    if !(0.0..=100.0).contains(&rate) {
        return Err(CommandError::RateOutOfRange);
    }

    let mut due_day = None;
    let mut minimum_payment = None;
    for option in options {
        let unknown = || CommandError::UnknownArgument(option.to_string());
        if let Some(caps) = DUE_DAY.captures(option) {
            let day: u32 = caps[1].parse().map_err(|_| unknown())?;
            if !(1..=31).contains(&day) {
                return Err(CommandError::DueDayOutOfRange);
            }
            due_day = Some(day);
        } else if let Some(caps) = MIN_PAYMENT.captures(option) {
            minimum_payment = Some(parse_number("minimum payment", &caps[1])?);
        } else {
            return Err(unknown());
        }
    }

    if due_day.is_none() {
        return Err(CommandError::MissingDueDay);
    }

    Ok(Command::Add(NewDebt {
        name: name.to_string(),
        balance,
        rate,
        due_day,
        minimum_payment,
    }))
}

fn parse_pay(args: &[&str]) -> Result<Command, CommandError> {
    let [name, amount, rest @ ..] = args else {
        return Err(CommandError::Usage(PAY_USAGE));
    };

    let amount = parse_number("payment amount", amount)?;
    if amount <= 0.0 {
        return Err(CommandError::NotPositive("payment amount"));
    }

    let (date, note_tokens) = match rest.split_first() {
        Some((first, tail)) if DATE.is_match(first) => (Some(first.to_string()), tail),
        _ => (None, rest),
    };
    let note = (!note_tokens.is_empty()).then(|| note_tokens.join(" "));

    Ok(Command::Pay(NewPayment {
        debt_name: name.to_string(),
        amount,
        date,
        note,
    }))
}

fn parse_plan(args: &[&str]) -> Result<Command, CommandError> {
    let [budget, strategy @ ..] = args else {
        return Err(CommandError::Usage(PLAN_USAGE));
    };

    let monthly_budget = parse_number("monthly budget", budget)?;
    if monthly_budget <= 0.0 {
        return Err(CommandError::NotPositive("monthly budget"));
    }

    let strategy = if strategy.is_empty() {
        Strategy::default()
    } else {
        strategy.join(" ").parse()?
    };

    Ok(Command::Plan { monthly_budget, strategy })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, CommandError> {
    let invalid = || CommandError::NotANumber {
        field,
        value: value.to_string(),
    };
    if !NUMBER.is_match(value) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}
