//! Adjustment lifecycle
//!
//! - **refresh**: recompute an adjustment's amount and eligibility from its
//!   source (the recalculation entry point for a single adjustment)
//! - **classification**: registry-aware tax / non-tax filtering that
//!   tolerates dangling source references
//! - **ledger**: the authoritative adjustment store with per-adjustable
//!   collection caches and association repair
//! - **chooser**: the promotion selection strategy
//! - **apply**: creating adjustments from promotions and cancellations

pub mod apply;
pub mod chooser;
pub mod ledger;

pub use apply::{
    apply_cancellation, apply_promotion_to_line_item, apply_promotion_to_order,
    apply_promotion_to_shipment,
};
pub use chooser::{BestDiscountChooser, PromotionChooser};
pub use ledger::AdjustmentLedger;

use shared::money::{format_amount, Currency, DEFAULT_CURRENCY};
use shared::order::{Adjustment, Order};
use shared::util::now_millis;

use crate::core::error::RecalcResult;
use crate::sources::{promotion_eligible, Adjustable, Source, SourceRegistry};

/// Recompute an adjustment from its source (the `update` operation).
///
/// Finalized adjustments are frozen: no recomputation, no write. A dangling
/// source leaves the amount untouched. Promotion-sourced adjustments also
/// re-evaluate eligibility against the parent promotion; a zero computed
/// amount makes them ineligible. Only the amount/eligible fields (and the
/// timestamp) are written, so refreshing can never cascade into another
/// recalculation.
pub fn refresh_adjustment(
    adjustment: &mut Adjustment,
    registry: &SourceRegistry,
    target: &Adjustable<'_>,
) -> RecalcResult<()> {
    if adjustment.finalized {
        return Ok(());
    }

    if let Some(source_ref) = adjustment.source {
        if let Some(source) = registry.resolve(source_ref) {
            let amount = source.compute_amount(target)?;
            adjustment.amount = amount;

            if let Source::PromotionAction(action) = source {
                adjustment.eligible = registry
                    .promotion_of(action)
                    .map(|promotion| promotion_eligible(promotion, amount, now_millis()))
                    .unwrap_or(false);
            }
        }
    }

    adjustment.updated_at = now_millis();
    Ok(())
}

/// Registry-aware tax classification.
///
/// An adjustment is a tax adjustment only when its source reference
/// resolves to a tax rate. Null sources and dangling references are
/// non-tax.
pub fn is_tax(adjustment: &Adjustment, registry: &SourceRegistry) -> bool {
    adjustment
        .source
        .and_then(|s| registry.resolve(s))
        .is_some_and(|source| source.is_tax_rate())
}

/// The `non_tax` filter: everything that is not a resolvable tax adjustment.
pub fn non_tax<'a>(
    adjustments: impl IntoIterator<Item = &'a Adjustment>,
    registry: &SourceRegistry,
) -> Vec<&'a Adjustment> {
    adjustments
        .into_iter()
        .filter(|a| !is_tax(a, registry))
        .collect()
}

/// Currency of an adjustment: the owning order's, or the fixed default
/// when the adjustable cannot be resolved.
pub fn adjustment_currency(order: Option<&Order>) -> Currency {
    order.map(|o| o.currency).unwrap_or(DEFAULT_CURRENCY)
}

/// Amount formatted per the owning order's currency conventions.
pub fn display_amount(adjustment: &Adjustment, order: Option<&Order>) -> String {
    format_amount(adjustment.amount, adjustment_currency(order))
}
