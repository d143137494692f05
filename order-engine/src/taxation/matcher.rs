//! Tax rate matching
//!
//! Zone resolution (address → zone) and category resolution (product →
//! category) happen upstream; matching works on the resolved IDs only.

use shared::models::TaxRate;

/// Whether a rate applies to an entity.
///
/// The rate's zone must be the order's tax zone, and the rate's category
/// (when it has one) must be the entity's tax category. Orders without a
/// resolved tax zone match no rates.
pub fn rate_applies(rate: &TaxRate, order_zone: Option<i64>, category: Option<i64>) -> bool {
    if order_zone != Some(rate.zone_id) {
        return false;
    }
    match rate.category_id {
        None => true,
        Some(rate_category) => Some(rate_category) == category,
    }
}
