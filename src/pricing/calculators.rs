//! Core pricing math.
//!
//! Pure functions - no database access, no currency conversion.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Used when presenting amounts; the engine itself keeps full precision.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use charter_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Round to whole currency units, halves away from zero
pub fn round_whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a whole-number percentage into a fraction
pub fn percent(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

/// Amount a fee adds on top of `price`, in whole currency units.
///
/// Computed as `round(price * (1 + fee)) - round(price)` rather than
/// `price * fee`, so the surcharge is always a whole amount.
pub fn fee_surcharge(price: Decimal, fee: Decimal) -> Decimal {
    round_whole(price * (Decimal::ONE + fee)) - round_whole(price)
}

/// Split `amount` evenly over `nights`; `None` when there is nothing to split over
pub fn per_night(amount: Decimal, nights: i64) -> Option<Decimal> {
    if nights <= 0 {
        return None;
    }
    Some(amount / Decimal::from(nights))
}
