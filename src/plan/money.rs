//! Cent-based money helpers
//!
//! Working balances are whole cents so accrual and allocation never drift;
//! amounts cross the public API as `f64` dollars.

/// Amount in whole cents
pub type Cents = i64;

/// Largest dollar amount accepted for a balance, minimum or budget
///
/// Keeps every cent total of a plan far inside `i64`.
pub const MAX_AMOUNT: f64 = 1e12;

/// Round a dollar amount to the nearest cent, ties away from zero
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn to_cents(amount: f64) -> Cents {
    (amount * 100.0).round() as Cents
}

pub fn to_dollars(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// One month of interest on a balance, rounded to the cent
///
/// Float-to-int casts saturate, so runaway balances cap at `i64::MAX`.
pub fn monthly_interest(balance: Cents, monthly_rate: f64) -> Cents {
    if balance <= 0 || monthly_rate <= 0.0 {
        return 0;
    }
    (balance as f64 * monthly_rate).round() as Cents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_ties_away_from_zero() {
        assert_eq!(round2(1.125), 1.13);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_cent_conversion() {
        assert_eq!(to_cents(5000.0), 500_000);
        assert_eq!(to_cents(19.99), 1999);
        assert_eq!(to_dollars(1999), 19.99);
    }

    #[test]
    fn test_monthly_interest() {
        // 5000.00 at 18% APR
        assert_eq!(monthly_interest(500_000, 0.015), 7500);
        // 0.5 cent ties round up
        assert_eq!(monthly_interest(50, 0.01), 1);
        assert_eq!(monthly_interest(0, 0.015), 0);
        assert_eq!(monthly_interest(100_000, 0.0), 0);
    }
}
