//! Micros conversion and fixed-point quantization.
//!
//! All monetary and ratio math in the engine goes through [`Decimal`], never
//! binary floating point. Rounding is half-up (ties away from zero), matching
//! how Google Ads amounts are conventionally presented, and every quantized
//! value keeps its scale so a cost finalized at two places serializes as
//! `12.30`, not `12.3`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::money::{CURRENCY_SCALE, MICROS_PER_UNIT};

/// Round `value` half-up to `places` fractional digits and pad the scale so
/// the result renders with exactly `places` digits.
pub fn quantize(value: Decimal, places: u32) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}

/// Convert a micros amount (millionths of the account currency unit) to a
/// quantized decimal with `places` fractional digits.
///
/// # Examples
///
/// ```
/// use adreport::money::micros_to_decimal;
///
/// let cost = micros_to_decimal(12_345_000, 2);
/// assert_eq!(cost.to_string(), "12.35");
/// ```
pub fn micros_to_decimal(micros: i64, places: u32) -> Decimal {
    quantize(Decimal::from(micros) / Decimal::from(MICROS_PER_UNIT), places)
}

/// Convert micros to a currency amount at the standard two-place scale.
pub fn micros_to_currency(micros: i64) -> Decimal {
    micros_to_decimal(micros, CURRENCY_SCALE)
}

/// Zero carrying `places` fractional digits, e.g. `0.0000` at scale 4.
pub fn zero_at(places: u32) -> Decimal {
    let mut zero = Decimal::ZERO;
    zero.rescale(places);
    zero
}

/// Convert a float field from a raw row into a decimal without quantizing.
///
/// Uses the shortest decimal representation that round-trips the float, so a
/// reported share of `0.4567` becomes exactly `0.4567`. Non-finite inputs
/// collapse to zero.
pub fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}
