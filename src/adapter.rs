//! Adapter layer: converts between the engine's f64 world and the exact
//! decimals used by the parameter catalogue.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal_macros::dec;

/// Convert f64 to Decimal. Non-finite input maps to zero.
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Slider percentage (0-100) to a fraction, exact in decimal.
pub fn percent_to_fraction(percent: u32) -> f64 {
    from_decimal(Decimal::from(percent) / dec!(100))
}

/// Fraction to a whole-number percentage, rounded half away from zero.
pub fn fraction_to_percent(fraction: f64) -> u32 {
    let pct = (to_decimal(fraction) * dec!(100))
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    pct.to_u32().unwrap_or(0)
}
