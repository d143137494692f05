//! Currency definitions and money display formatting
//!
//! Amounts are carried as `rust_decimal::Decimal` throughout the domain.
//! This module owns the per-currency display conventions: symbol and number
//! of decimal places (JPY has none).

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Fallback currency for adjustments whose adjustable cannot be resolved.
pub const DEFAULT_CURRENCY: Currency = Currency::Usd;

/// Settlement currency (ISO 4217 subset).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    /// Decimal places shown for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Parse an ISO 4217 code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Currency> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            "JPY" => Some(Currency::Jpy),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Format an amount per the currency's display conventions.
///
/// Rounds half-up to the currency's decimal places:
/// 10.55 USD → "$10.55", 10.55 JPY → "¥11", -5 USD → "-$5.00".
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    let mut rounded = amount
        .round_dp_with_strategy(currency.decimal_places(), RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.decimal_places());

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{}", currency.symbol(), rounded.abs())
    } else {
        format!("{}{}", currency.symbol(), rounded.abs())
    }
}
