//! Money calculation utilities using rust_decimal for precision
//!
//! All engine arithmetic happens on `Decimal`. Computed adjustment amounts
//! are rounded to a fixed scale here; currency-specific display rounding
//! (JPY's whole units) happens only at format time in `shared::money`.

use rust_decimal::prelude::*;

/// Rounding scale for computed monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Round a computed amount to the engine's monetary scale.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage of a base amount: base * percent / 100, rounded.
#[inline]
pub fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    round_money(base * percent / Decimal::ONE_HUNDRED)
}

/// Tax portion already contained in a tax-inclusive gross amount.
///
/// Formula: gross * rate / (100 + rate). A €121 gross at 21% contains €21
/// of tax.
#[inline]
pub fn included_tax_portion(gross: Decimal, percent: Decimal) -> Decimal {
    round_money(gross * percent / (Decimal::ONE_HUNDRED + percent))
}
