//! Tax rate model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax rate applicable inside one tax zone.
///
/// Zone and category resolution (address → zone, product → category) happens
/// upstream; the engine matches on the resolved IDs only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxRate {
    pub id: i64,
    /// Label stamped on adjustments, e.g. "IVA 21%"
    pub name: String,
    /// Percentage, e.g. 21 for 21%
    pub percent: Decimal,
    /// Tax already reflected in listed prices. Included tax never changes
    /// the order total; additional tax is charged on top.
    pub included: bool,
    /// Tax zone this rate belongs to
    pub zone_id: i64,
    /// Tax category the rate applies to (None = all categories)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}
