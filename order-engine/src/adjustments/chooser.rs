//! Promotion selection strategy
//!
//! After the promotion adjustments of one adjustable are refreshed, a
//! chooser decides which of them stay eligible. The strategy is injected
//! into the updater at construction, so deployments can swap in their own
//! stacking policy without touching the pipeline.

use rust_decimal::Decimal;
use shared::order::Adjustment;

/// Assigns eligibility across the promotion adjustments of one adjustable.
///
/// Implementations must be idempotent: re-running on an unchanged set
/// yields the same eligibility assignment. Losing adjustments are marked
/// ineligible, never destroyed.
pub trait PromotionChooser {
    fn choose(&self, candidates: &mut [&mut Adjustment]);
}

/// Default policy: the single best discount per adjustable wins.
///
/// "Best" is the most negative eligible amount; ties break on creation
/// order (lowest adjustment id). Everything else is marked ineligible.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestDiscountChooser;

impl PromotionChooser for BestDiscountChooser {
    fn choose(&self, candidates: &mut [&mut Adjustment]) {
        let winner = candidates
            .iter()
            .filter(|a| a.eligible && a.amount < Decimal::ZERO)
            .min_by(|a, b| a.amount.cmp(&b.amount).then(a.id.cmp(&b.id)))
            .map(|a| a.id);

        for adjustment in candidates.iter_mut() {
            if adjustment.finalized {
                continue;
            }
            adjustment.eligible = Some(adjustment.id) == winner;
        }

        if let Some(id) = winner {
            tracing::debug!(adjustment_id = id, "promotion chooser picked best discount");
        }
    }
}
