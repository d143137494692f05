//! Unit cancellation amount computation
//!
//! A cancellation credits the customer for units short-shipped after
//! completion: -(unit price × cancelled quantity), never more than the
//! line is worth.

use rust_decimal::Decimal;
use shared::models::UnitCancellation;

use crate::core::error::{RecalcError, RecalcResult};
use crate::money::round_money;
use crate::sources::{Adjustable, AdjustmentSource};

impl AdjustmentSource for UnitCancellation {
    fn compute_amount(&self, target: &Adjustable<'_>) -> RecalcResult<Decimal> {
        let Adjustable::LineItem(item) = target else {
            return Err(RecalcError::SourceComputation(
                "cancellations apply to line items only".to_string(),
            ));
        };

        let quantity = self.quantity.max(0).min(item.quantity.max(0));
        Ok(round_money(-(item.price * Decimal::from(quantity))))
    }
}
