//! Adjustment sources
//!
//! An adjustment points back at the entity that produced it (a promotion
//! action, a tax rate, or a unit cancellation) through a tagged
//! [`SourceRef`]. This module provides:
//!
//! - [`AdjustmentSource`]: the compute capability every source exposes
//! - [`Adjustable`]: a borrowed view of the entity being adjusted
//! - [`SourceRegistry`]: the lookup table from tagged reference to entity;
//!   dangling references resolve to `None` and are tolerated

pub mod cancellation;
pub mod promotion;
pub mod tax;

pub use promotion::promotion_eligible;

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::models::{Promotion, PromotionAction, TaxRate, UnitCancellation};
use shared::order::{AdjustableRef, LineItem, Order, Shipment, SourceRef};

use crate::core::error::RecalcResult;

/// Borrowed view of the entity an adjustment is computed against.
#[derive(Debug, Clone, Copy)]
pub enum Adjustable<'a> {
    Order(&'a Order),
    LineItem(&'a LineItem),
    Shipment(&'a Shipment),
}

impl Adjustable<'_> {
    pub fn reference(&self) -> AdjustableRef {
        match self {
            Adjustable::Order(o) => AdjustableRef::Order(o.id),
            Adjustable::LineItem(li) => AdjustableRef::LineItem(li.id),
            Adjustable::Shipment(s) => AdjustableRef::Shipment(s.id),
        }
    }

    /// Undiscounted amount promotions compute against.
    pub fn amount(&self) -> Decimal {
        match self {
            Adjustable::Order(o) => o.item_total,
            Adjustable::LineItem(li) => li.amount(),
            Adjustable::Shipment(s) => s.cost,
        }
    }

    /// Post-promotion amount taxes compute against.
    pub fn taxable_amount(&self) -> Decimal {
        match self {
            Adjustable::Order(o) => o.item_total + o.promo_total,
            Adjustable::LineItem(li) => li.discounted_amount(),
            Adjustable::Shipment(s) => s.discounted_cost(),
        }
    }

    /// Unit count for quantity-scaled calculators.
    pub fn quantity(&self) -> i32 {
        match self {
            Adjustable::Order(o) => o.item_count,
            Adjustable::LineItem(li) => li.quantity,
            Adjustable::Shipment(_) => 1,
        }
    }
}

/// Compute capability of an adjustment source.
///
/// Returns the signed amount the adjustment should carry for `target`:
/// negative for discounts, positive for charges.
pub trait AdjustmentSource {
    fn compute_amount(&self, target: &Adjustable<'_>) -> RecalcResult<Decimal>;
}

/// A resolved source reference.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    PromotionAction(&'a PromotionAction),
    TaxRate(&'a TaxRate),
    Cancellation(&'a UnitCancellation),
}

impl Source<'_> {
    pub fn compute_amount(&self, target: &Adjustable<'_>) -> RecalcResult<Decimal> {
        match self {
            Source::PromotionAction(action) => action.compute_amount(target),
            Source::TaxRate(rate) => rate.compute_amount(target),
            Source::Cancellation(cancellation) => cancellation.compute_amount(target),
        }
    }

    pub fn is_tax_rate(&self) -> bool {
        matches!(self, Source::TaxRate(_))
    }
}

/// Lookup table from tagged source references to their entities.
///
/// Upstream code registers the promotions, tax rates, and cancellations
/// relevant to the order being recalculated. References to entities that
/// were deleted upstream simply stop resolving.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    promotions: HashMap<i64, Promotion>,
    actions: HashMap<i64, PromotionAction>,
    tax_rates: HashMap<i64, TaxRate>,
    cancellations: HashMap<i64, UnitCancellation>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_promotion(&mut self, promotion: Promotion) {
        self.promotions.insert(promotion.id, promotion);
    }

    pub fn register_action(&mut self, action: PromotionAction) {
        self.actions.insert(action.id, action);
    }

    pub fn register_tax_rate(&mut self, rate: TaxRate) {
        self.tax_rates.insert(rate.id, rate);
    }

    pub fn register_cancellation(&mut self, cancellation: UnitCancellation) {
        self.cancellations.insert(cancellation.id, cancellation);
    }

    pub fn remove_action(&mut self, id: i64) -> Option<PromotionAction> {
        self.actions.remove(&id)
    }

    pub fn remove_tax_rate(&mut self, id: i64) -> Option<TaxRate> {
        self.tax_rates.remove(&id)
    }

    /// Resolve a tagged reference to its entity. `None` = dangling.
    pub fn resolve(&self, source: SourceRef) -> Option<Source<'_>> {
        match source {
            SourceRef::PromotionAction(id) => self.actions.get(&id).map(Source::PromotionAction),
            SourceRef::TaxRate(id) => self.tax_rates.get(&id).map(Source::TaxRate),
            SourceRef::Cancellation(id) => self.cancellations.get(&id).map(Source::Cancellation),
        }
    }

    pub fn promotion(&self, id: i64) -> Option<&Promotion> {
        self.promotions.get(&id)
    }

    pub fn action(&self, id: i64) -> Option<&PromotionAction> {
        self.actions.get(&id)
    }

    pub fn tax_rate(&self, id: i64) -> Option<&TaxRate> {
        self.tax_rates.get(&id)
    }

    pub fn cancellation(&self, id: i64) -> Option<&UnitCancellation> {
        self.cancellations.get(&id)
    }

    pub fn tax_rates(&self) -> impl Iterator<Item = &TaxRate> {
        self.tax_rates.values()
    }

    /// Parent promotion of an action.
    pub fn promotion_of(&self, action: &PromotionAction) -> Option<&Promotion> {
        self.promotions.get(&action.promotion_id)
    }
}
