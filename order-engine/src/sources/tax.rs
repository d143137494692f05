//! Tax amount computation
//!
//! Tax amounts are positive charges computed on the post-promotion amount.
//! Included rates back the tax out of a tax-inclusive price; additional
//! rates charge on top.

use rust_decimal::Decimal;
use shared::models::TaxRate;

use crate::core::error::RecalcResult;
use crate::money::{included_tax_portion, percent_of};
use crate::sources::{Adjustable, AdjustmentSource};

impl AdjustmentSource for TaxRate {
    fn compute_amount(&self, target: &Adjustable<'_>) -> RecalcResult<Decimal> {
        let base = target.taxable_amount().max(Decimal::ZERO);

        Ok(if self.included {
            included_tax_portion(base, self.percent)
        } else {
            percent_of(base, self.percent)
        })
    }
}
