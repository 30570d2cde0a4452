//! Numeric normalization for dashboard output.
//!
//! Measurements are kept as `Decimal` through aggregation and only turned
//! into `f64` here, right before they are placed in a response body.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Converts a decimal into its JSON representation.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Rounds with banker's rounding before converting, so `2.345` with two
/// places yields `2.34` the same way every time.
pub fn round_to(value: Decimal, places: u32) -> f64 {
    to_f64(value.round_dp(places))
}

pub fn from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

pub fn from_count(count: usize) -> Decimal {
    Decimal::from(count as u64)
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    saturating_mul(ratio(part, whole), Decimal::ONE_HUNDRED)
}

fn saturate(positive: bool) -> Decimal {
    if positive {
        Decimal::MAX
    } else {
        Decimal::MIN
    }
}

/// `a + b`, clamped to the representable range instead of panicking.
pub fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| saturate(!b.is_sign_negative()))
}

/// `a * b`, clamped to the representable range instead of panicking.
pub fn saturating_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b)
        .unwrap_or_else(|| saturate(a.is_sign_negative() == b.is_sign_negative()))
}

pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, saturating_add)
}
