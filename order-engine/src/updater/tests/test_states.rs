use super::*;
use std::cell::Cell;
use shared::order::{PaymentState, ShipmentState, ShipmentStatus};

#[derive(Default)]
struct CountingObserver {
    payment_changes: Cell<u32>,
    shipment_changes: Cell<u32>,
    updates: Cell<u32>,
}

impl RecalcObserver for CountingObserver {
    fn payment_state_changed(
        &self,
        _order: &Order,
        _previous: Option<PaymentState>,
        _current: PaymentState,
    ) {
        self.payment_changes.set(self.payment_changes.get() + 1);
    }

    fn shipment_state_changed(
        &self,
        _order: &Order,
        _previous: Option<ShipmentState>,
        _current: Option<ShipmentState>,
    ) {
        self.shipment_changes.set(self.shipment_changes.get() + 1);
    }

    fn order_updated(&self, _order: &Order) {
        self.updates.set(self.updates.get() + 1);
    }
}

#[test]
fn unpaid_completed_order_is_balance_due() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.payment_state, Some(PaymentState::BalanceDue));
}

#[test]
fn fully_paid_order_is_paid_and_overpaid_is_credit_owed() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.payments.push(completed_payment(10));
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.payment_state, Some(PaymentState::Paid));

    order.payments.push(completed_payment(5));
    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.payment_state, Some(PaymentState::CreditOwed));
}

#[test]
fn canceled_order_with_nothing_captured_is_void() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.cancel();
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.payment_state, Some(PaymentState::Void));
}

#[test]
fn order_with_only_dead_payments_is_failed() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order
        .payments
        .push(Payment::new(money(10), PaymentStatus::Failed));
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.payment_state, Some(PaymentState::Failed));
}

#[test]
fn payment_state_notifies_only_on_change() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();
    let observer = CountingObserver::default();
    let updater = OrderUpdater::new(&registry).with_observer(&observer);

    updater.update(&mut order, &mut ledger).unwrap();
    assert_eq!(observer.payment_changes.get(), 1); // None -> BalanceDue

    updater.update(&mut order, &mut ledger).unwrap();
    assert_eq!(observer.payment_changes.get(), 1, "no change, no event");

    order.payments.push(completed_payment(10));
    updater.update(&mut order, &mut ledger).unwrap();
    assert_eq!(observer.payment_changes.get(), 2); // BalanceDue -> Paid
}

#[test]
fn shipment_state_notifies_every_pass() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.shipments.push(shipment_with_cost(5));
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();
    let observer = CountingObserver::default();
    let updater = OrderUpdater::new(&registry).with_observer(&observer);

    updater.update(&mut order, &mut ledger).unwrap();
    updater.update(&mut order, &mut ledger).unwrap();
    assert_eq!(observer.shipment_changes.get(), 2, "unconditional notification");
    assert_eq!(order.shipment_state, Some(ShipmentState::Pending));
}

#[test]
fn mixed_shipments_make_the_order_partial() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.shipments.push(shipment_with_cost(5));
    order.shipments.push(shipment_with_cost(5));
    order.shipments[0].status = ShipmentStatus::Shipped;
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.shipment_state, Some(ShipmentState::Partial));

    order.shipments[1].status = ShipmentStatus::Shipped;
    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.shipment_state, Some(ShipmentState::Shipped));
}

#[test]
fn backordered_inventory_dominates_shipment_state() {
    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.shipments.push(shipment_with_cost(5));
    order.shipments[0].status = ShipmentStatus::Shipped;
    order.shipments[0].backordered = true;
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();

    run(&mut order, &mut ledger, &registry);
    assert_eq!(order.shipment_state, Some(ShipmentState::Backorder));
}

#[test]
fn cart_orders_skip_state_derivation() {
    let mut order = order_with_items(&[(10, 1)]);
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();
    let observer = CountingObserver::default();
    let updater = OrderUpdater::new(&registry).with_observer(&observer);

    updater.update(&mut order, &mut ledger).unwrap();

    assert_eq!(order.payment_state, None);
    assert_eq!(order.shipment_state, None);
    assert_eq!(observer.payment_changes.get(), 0);
    assert_eq!(observer.shipment_changes.get(), 0);
    assert_eq!(observer.updates.get(), 1, "post-update hook still runs");
}

#[test]
fn refreshed_shipping_rates_flow_into_the_totals() {
    struct FlatRateShipping;
    impl ShippingRates for FlatRateShipping {
        fn refresh(&self, shipment: &mut Shipment) {
            shipment.cost = money(9);
        }
    }

    let mut order = order_with_items(&[(10, 1)]);
    order.complete();
    order.shipments.push(shipment_with_cost(5));
    let registry = SourceRegistry::new();
    let mut ledger = AdjustmentLedger::new();
    let rates = FlatRateShipping;
    let updater = OrderUpdater::new(&registry).with_shipping_rates(&rates);

    updater.update(&mut order, &mut ledger).unwrap();

    assert_eq!(order.shipment_total, money(9));
    assert_eq!(order.total, money(19));
}
