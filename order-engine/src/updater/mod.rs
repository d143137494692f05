//! Order updater - the recalculation pipeline
//!
//! Recomputes every derived total on an order in a strict sequence:
//!
//! 1. item count
//! 2. payment total, item total, shipment total
//! 3. adjustments: item promotions → order promotions → taxes →
//!    cancellations → per-item totals → order-level aggregation
//! 4. payment/shipment state (completed orders only)
//! 5. observer notification, then commit
//!
//! The order total is recomputed after every total-affecting step so
//! intermediate reads stay consistent. Running the pipeline twice with no
//! intervening mutation yields identical totals.
//!
//! The commit writes plain fields on `&mut Order` and bumps timestamps; it
//! has no callback mechanism that could re-enter the pipeline, so the
//! non-reentrancy requirement holds structurally. A failing source
//! computation propagates out before the commit and leaves the order's
//! timestamps untouched; per-item totals persisted earlier in the pass are
//! not rolled back (recomputation converges on retry).

mod states;
#[cfg(test)]
mod tests;

pub use states::{derive_payment_state, derive_shipment_state};

use rust_decimal::Decimal;
use shared::order::{
    AdjustableRef, AdjustmentId, Order, PaymentState, Shipment, ShipmentState,
};
use shared::util::now_millis;

use crate::adjustments::{AdjustmentLedger, BestDiscountChooser, PromotionChooser};
use crate::core::error::RecalcResult;
use crate::sources::{Adjustable, SourceRegistry};
use crate::taxation::TaxAdjuster;

/// Receives state-change and post-update notifications.
///
/// All methods default to no-ops. Observers get `&Order` after the fields
/// are already written; they cannot feed back into the pipeline.
pub trait RecalcObserver {
    fn payment_state_changed(
        &self,
        order: &Order,
        previous: Option<PaymentState>,
        current: PaymentState,
    ) {
        let _ = (order, previous, current);
    }

    fn shipment_state_changed(
        &self,
        order: &Order,
        previous: Option<ShipmentState>,
        current: Option<ShipmentState>,
    ) {
        let _ = (order, previous, current);
    }

    fn order_updated(&self, order: &Order) {
        let _ = order;
    }
}

/// Default observer: notifies no one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RecalcObserver for NoopObserver {}

/// Shipping-rate refresh seam used for completed orders. Rate computation
/// internals live outside the engine.
pub trait ShippingRates {
    fn refresh(&self, shipment: &mut Shipment);
}

/// Default rates seam: shipments keep their current cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepCurrentRates;

impl ShippingRates for KeepCurrentRates {
    fn refresh(&self, _shipment: &mut Shipment) {}
}

/// The order recalculator.
///
/// Holds the injected collaborators; call [`OrderUpdater::update`] after
/// any mutation that can move totals (item added/removed, quantity change,
/// coupon applied, payment captured, shipment created).
pub struct OrderUpdater<'a> {
    registry: &'a SourceRegistry,
    chooser: &'a dyn PromotionChooser,
    observer: &'a dyn RecalcObserver,
    shipping_rates: &'a dyn ShippingRates,
}

impl<'a> OrderUpdater<'a> {
    pub fn new(registry: &'a SourceRegistry) -> Self {
        Self {
            registry,
            chooser: &BestDiscountChooser,
            observer: &NoopObserver,
            shipping_rates: &KeepCurrentRates,
        }
    }

    pub fn with_chooser(mut self, chooser: &'a dyn PromotionChooser) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn RecalcObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_shipping_rates(mut self, shipping_rates: &'a dyn ShippingRates) -> Self {
        self.shipping_rates = shipping_rates;
        self
    }

    /// Run the full pipeline.
    pub fn update(&self, order: &mut Order, ledger: &mut AdjustmentLedger) -> RecalcResult<()> {
        self.update_item_count(order);
        self.update_totals(order, ledger)?;

        if order.is_complete() {
            self.update_payment_state(order);
            self.update_shipments(order);
            self.update_shipment_state(order);
        }

        self.observer.order_updated(order);
        self.persist_totals(order, ledger);
        Ok(())
    }

    /// Recompute monetary totals without the completed-order machinery.
    pub fn update_totals(
        &self,
        order: &mut Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        self.update_payment_total(order);
        self.update_item_total(order);
        self.update_shipment_total(order);
        self.update_adjustment_total(order, ledger)
    }

    fn update_item_count(&self, order: &mut Order) {
        order.item_count = order.line_items.iter().map(|li| li.quantity).sum();
    }

    fn update_payment_total(&self, order: &mut Order) {
        order.payment_total = order
            .payments
            .iter()
            .filter(|p| p.is_completed())
            .map(|p| p.captured_amount())
            .sum();
    }

    fn update_item_total(&self, order: &mut Order) {
        order.item_total = order.line_items.iter().map(|li| li.amount()).sum();
        self.recompute_total(order);
    }

    fn update_shipment_total(&self, order: &mut Order) {
        order.shipment_total = order.shipments.iter().map(|s| s.cost).sum();
        self.recompute_total(order);
    }

    fn update_adjustment_total(
        &self,
        order: &mut Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        self.recalculate_adjustments(order, ledger)?;

        let item_level: Decimal = order
            .line_items
            .iter()
            .map(|li| li.adjustment_total)
            .chain(order.shipments.iter().map(|s| s.adjustment_total))
            .sum();

        let order_level = ledger.for_adjustable(order.reference());
        let order_level_total: Decimal = order_level
            .iter()
            .filter(|a| a.eligible && !a.included)
            .map(|a| a.amount)
            .sum();
        let order_level_promo: Decimal = order_level
            .iter()
            .filter(|a| a.eligible && a.promotion_sourced())
            .map(|a| a.amount)
            .sum();

        order.adjustment_total = item_level + order_level_total;
        order.included_tax_total = order
            .line_items
            .iter()
            .map(|li| li.included_tax_total)
            .chain(order.shipments.iter().map(|s| s.included_tax_total))
            .sum();
        order.additional_tax_total = order
            .line_items
            .iter()
            .map(|li| li.additional_tax_total)
            .chain(order.shipments.iter().map(|s| s.additional_tax_total))
            .sum();
        order.promo_total = order
            .line_items
            .iter()
            .map(|li| li.promo_total)
            .chain(order.shipments.iter().map(|s| s.promo_total))
            .sum::<Decimal>()
            + order_level_promo;

        self.recompute_total(order);
        Ok(())
    }

    fn recalculate_adjustments(
        &self,
        order: &mut Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        self.update_item_promotions(order, ledger)?;
        self.update_order_promotions(order, ledger)?;
        self.update_taxes(order, ledger)?;
        self.update_cancellations(order, ledger)?;
        self.update_item_totals(order, ledger);
        Ok(())
    }

    /// Refresh and re-select the promotion adjustments of every line item
    /// and shipment, then write each entity's promo_total.
    fn update_item_promotions(
        &self,
        order: &mut Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        for idx in 0..order.line_items.len() {
            let promo_total = {
                let item = &order.line_items[idx];
                self.refresh_and_choose(ledger, &Adjustable::LineItem(item))?
            };
            let item = &mut order.line_items[idx];
            if item.promo_total != promo_total {
                item.promo_total = promo_total;
                item.updated_at = now_millis();
            }
        }

        for idx in 0..order.shipments.len() {
            let promo_total = {
                let shipment = &order.shipments[idx];
                self.refresh_and_choose(ledger, &Adjustable::Shipment(shipment))?
            };
            let shipment = &mut order.shipments[idx];
            if shipment.promo_total != promo_total {
                shipment.promo_total = promo_total;
                shipment.updated_at = now_millis();
            }
        }

        Ok(())
    }

    /// Refresh and re-select order-level promotion adjustments. Their sum
    /// folds into promo_total during aggregation, not here.
    fn update_order_promotions(
        &self,
        order: &Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        self.refresh_and_choose(ledger, &Adjustable::Order(order))?;
        Ok(())
    }

    fn refresh_and_choose(
        &self,
        ledger: &mut AdjustmentLedger,
        target: &Adjustable<'_>,
    ) -> RecalcResult<Decimal> {
        let adjustable = target.reference();
        for id in ledger.promotion_ids_for(adjustable) {
            ledger.refresh(id, self.registry, target)?;
        }

        let mut candidates = ledger.promotion_adjustments_mut(adjustable);
        self.chooser.choose(&mut candidates);

        Ok(candidates
            .iter()
            .filter(|a| a.eligible)
            .map(|a| a.amount)
            .sum())
    }

    /// Reconcile tax adjustments, then split each entity's tax into
    /// included and additional totals.
    fn update_taxes(&self, order: &mut Order, ledger: &mut AdjustmentLedger) -> RecalcResult<()> {
        TaxAdjuster::new(self.registry).adjust(order, ledger)?;

        for idx in 0..order.line_items.len() {
            let (included, additional) =
                tax_split(ledger, AdjustableRef::LineItem(order.line_items[idx].id));
            let item = &mut order.line_items[idx];
            if item.included_tax_total != included || item.additional_tax_total != additional {
                item.included_tax_total = included;
                item.additional_tax_total = additional;
                item.updated_at = now_millis();
            }
        }

        for idx in 0..order.shipments.len() {
            let (included, additional) =
                tax_split(ledger, AdjustableRef::Shipment(order.shipments[idx].id));
            let shipment = &mut order.shipments[idx];
            if shipment.included_tax_total != included
                || shipment.additional_tax_total != additional
            {
                shipment.included_tax_total = included;
                shipment.additional_tax_total = additional;
                shipment.updated_at = now_millis();
            }
        }

        Ok(())
    }

    /// Refresh cancellation adjustments on line items.
    fn update_cancellations(
        &self,
        order: &Order,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        for item in &order.line_items {
            let adjustable = AdjustableRef::LineItem(item.id);
            let ids: Vec<AdjustmentId> = ledger
                .for_adjustable(adjustable)
                .into_iter()
                .filter(|a| a.cancellation_sourced())
                .map(|a| a.id)
                .collect();
            let target = Adjustable::LineItem(item);
            for id in ids {
                ledger.refresh(id, self.registry, &target)?;
            }
        }
        Ok(())
    }

    /// adjustment_total = promo_total + additional_tax_total + cancellations.
    /// The cancellation total is transient, never stored on the entity.
    fn update_item_totals(&self, order: &mut Order, ledger: &AdjustmentLedger) {
        for idx in 0..order.line_items.len() {
            let cancellation_total: Decimal = ledger
                .for_adjustable(AdjustableRef::LineItem(order.line_items[idx].id))
                .into_iter()
                .filter(|a| a.cancellation_sourced() && a.eligible)
                .map(|a| a.amount)
                .sum();
            let item = &mut order.line_items[idx];
            let adjustment_total =
                item.promo_total + item.additional_tax_total + cancellation_total;
            if item.adjustment_total != adjustment_total {
                item.adjustment_total = adjustment_total;
                item.updated_at = now_millis();
            }
        }

        for shipment in &mut order.shipments {
            let adjustment_total = shipment.promo_total + shipment.additional_tax_total;
            if shipment.adjustment_total != adjustment_total {
                shipment.adjustment_total = adjustment_total;
                shipment.updated_at = now_millis();
            }
        }
    }

    fn recompute_total(&self, order: &mut Order) {
        order.total = order.item_total + order.shipment_total + order.adjustment_total;
    }

    fn update_payment_state(&self, order: &mut Order) {
        let previous = order.payment_state;
        let current = derive_payment_state(order);
        if previous != Some(current) {
            order.payment_state = Some(current);
            tracing::info!(
                order_id = order.id,
                ?previous,
                ?current,
                "payment state changed"
            );
            self.observer.payment_state_changed(order, previous, current);
        }
    }

    /// Refresh shipping rates and fold any changed costs back into the
    /// totals.
    fn update_shipments(&self, order: &mut Order) {
        for shipment in &mut order.shipments {
            self.shipping_rates.refresh(shipment);
        }
        self.update_shipment_total(order);
    }

    fn update_shipment_state(&self, order: &mut Order) {
        let previous = order.shipment_state;
        let current = derive_shipment_state(order);
        order.shipment_state = current;
        // Unlike payment state, shipment state always notifies
        self.observer.shipment_state_changed(order, previous, current);
    }

    /// Commit: bump the timestamps of everything this pass wrote. Plain
    /// field writes only - nothing here can re-enter the pipeline.
    fn persist_totals(&self, order: &mut Order, ledger: &mut AdjustmentLedger) {
        let now = now_millis();
        for adjustable in ledger.take_touched() {
            match adjustable {
                AdjustableRef::LineItem(id) => {
                    if let Some(item) = order.line_item_mut(id) {
                        item.updated_at = now;
                    }
                }
                AdjustableRef::Shipment(id) => {
                    if let Some(shipment) = order.shipment_mut(id) {
                        shipment.updated_at = now;
                    }
                }
                AdjustableRef::Order(_) => {}
            }
        }
        order.updated_at = now;
        tracing::debug!(order_id = order.id, total = %order.total, "order totals committed");
    }
}

/// Sum one adjustable's eligible tax adjustments into (included, additional).
fn tax_split(ledger: &AdjustmentLedger, adjustable: AdjustableRef) -> (Decimal, Decimal) {
    let mut included = Decimal::ZERO;
    let mut additional = Decimal::ZERO;
    for adjustment in ledger.for_adjustable(adjustable) {
        if !adjustment.tax_sourced() || !adjustment.eligible {
            continue;
        }
        if adjustment.included {
            included += adjustment.amount;
        } else {
            additional += adjustment.amount;
        }
    }
    (included, additional)
}
