//! Monetary rounding and banding helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of every reported money amount.
pub const MONEY_DP: u32 = 2;

/// Rounds to pence, half up, and fixes the scale at two places.
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)).to_string(), "12.35");
/// assert_eq!(round_money(Decimal::from(400)).to_string(), "400.00");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Rounds down to the whole currency unit, keeping a two-place scale.
pub fn truncate_whole_units(amount: Decimal) -> Decimal {
    let mut truncated = amount.floor();
    truncated.rescale(MONEY_DP);
    truncated
}

/// The part of `amount` that falls inside the half-open range `[lower, upper)`.
///
/// `upper = None` means the range is unbounded above.
pub fn portion_within(amount: Decimal, lower: Decimal, upper: Option<Decimal>) -> Decimal {
    let capped = match upper {
        Some(upper) => amount.min(upper),
        None => amount,
    };
    (capped - lower).max(Decimal::ZERO)
}

/// Whether `amount` lies in `[lower, upper)`.
pub fn in_range(amount: Decimal, lower: Decimal, upper: Option<Decimal>) -> bool {
    amount >= lower && upper.is_none_or(|upper| amount < upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("0.1249")), dec("0.12"));
        assert_eq!(round_money(dec("2.675")), dec("2.68"));
    }

    #[test]
    fn test_round_money_fixes_scale() {
        assert_eq!(round_money(dec("7")).to_string(), "7.00");
        assert_eq!(round_money(dec("7.1")).to_string(), "7.10");
    }

    #[test]
    fn test_truncate_whole_units() {
        assert_eq!(truncate_whole_units(dec("18.99")).to_string(), "18.00");
        assert_eq!(truncate_whole_units(dec("18")).to_string(), "18.00");
        assert_eq!(truncate_whole_units(dec("0.40")), Decimal::ZERO);
    }

    #[test]
    fn test_portion_within_band() {
        assert_eq!(portion_within(dec("3000"), dec("1000"), Some(dec("2000"))), dec("1000"));
        assert_eq!(portion_within(dec("1500"), dec("1000"), Some(dec("2000"))), dec("500"));
        assert_eq!(portion_within(dec("500"), dec("1000"), Some(dec("2000"))), Decimal::ZERO);
        assert_eq!(portion_within(dec("5000"), dec("2000"), None), dec("3000"));
    }

    #[test]
    fn test_portion_at_boundary_is_all_lower_band() {
        assert_eq!(portion_within(dec("2000"), dec("1000"), Some(dec("2000"))), dec("1000"));
        assert_eq!(portion_within(dec("2000"), dec("2000"), None), Decimal::ZERO);
    }

    #[test]
    fn test_in_range_is_half_open() {
        assert!(in_range(dec("1000"), dec("1000"), Some(dec("2000"))));
        assert!(!in_range(dec("2000"), dec("1000"), Some(dec("2000"))));
        assert!(in_range(dec("2000"), dec("2000"), None));
    }
}
