//! Payment and shipment state derivation
//!
//! Pure functions over the order's current payments and shipments. The
//! updater applies the results and emits change notifications.

use std::collections::HashSet;

use rust_decimal::Decimal;
use shared::order::{Order, PaymentState, ShipmentState, ShipmentStatus};

/// Derive the order's payment state.
///
/// - `Failed`: payments exist, none can still settle, balance is nonzero
/// - `Void`: canceled order with nothing captured
/// - otherwise by the sign of the outstanding balance
pub fn derive_payment_state(order: &Order) -> PaymentState {
    let balance = order.outstanding_balance();

    if !order.payments.is_empty()
        && order.payments.iter().all(|p| !p.is_valid())
        && !balance.is_zero()
    {
        return PaymentState::Failed;
    }

    if order.is_canceled() && order.payment_total.is_zero() {
        return PaymentState::Void;
    }

    if balance > Decimal::ZERO {
        PaymentState::BalanceDue
    } else if balance < Decimal::ZERO {
        PaymentState::CreditOwed
    } else {
        PaymentState::Paid
    }
}

/// Derive the order's shipment state.
///
/// Backordered inventory trumps everything. Otherwise the distinct states
/// of all shipments decide: more than one distinct state is `Partial`,
/// exactly one maps through, no shipments leaves the state unset.
pub fn derive_shipment_state(order: &Order) -> Option<ShipmentState> {
    if order.backordered() {
        return Some(ShipmentState::Backorder);
    }

    let statuses: HashSet<ShipmentStatus> = order.shipments.iter().map(|s| s.status).collect();
    match statuses.len() {
        0 => None,
        1 => statuses
            .into_iter()
            .next()
            .map(ShipmentState::from_status),
        _ => Some(ShipmentState::Partial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{Payment, PaymentStatus, Shipment};
    use shared::Currency;

    fn order() -> Order {
        Order::new(Currency::Usd)
    }

    #[test]
    fn zero_balance_without_payments_is_paid() {
        let order = order();
        assert_eq!(derive_payment_state(&order), PaymentState::Paid);
    }

    #[test]
    fn balance_sign_drives_the_state() {
        let mut order = order();
        order.total = Decimal::from(10);
        assert_eq!(derive_payment_state(&order), PaymentState::BalanceDue);

        order.payment_total = Decimal::from(15);
        assert_eq!(derive_payment_state(&order), PaymentState::CreditOwed);

        order.payment_total = Decimal::from(10);
        assert_eq!(derive_payment_state(&order), PaymentState::Paid);
    }

    #[test]
    fn all_invalid_payments_with_a_balance_is_failed() {
        let mut order = order();
        order.total = Decimal::from(10);
        order
            .payments
            .push(Payment::new(Decimal::from(10), PaymentStatus::Failed));
        assert_eq!(derive_payment_state(&order), PaymentState::Failed);

        // A payment that can still settle keeps the order at balance_due
        order
            .payments
            .push(Payment::new(Decimal::from(10), PaymentStatus::Pending));
        assert_eq!(derive_payment_state(&order), PaymentState::BalanceDue);
    }

    #[test]
    fn canceled_order_with_nothing_captured_is_void() {
        let mut order = order();
        order.state = shared::order::OrderState::Canceled;
        assert_eq!(derive_payment_state(&order), PaymentState::Void);

        // Once money was captured the balance sign decides again
        order.payment_total = Decimal::from(5);
        assert_eq!(derive_payment_state(&order), PaymentState::CreditOwed);
    }

    fn shipment(status: ShipmentStatus) -> Shipment {
        let mut s = Shipment::new(Decimal::from(5));
        s.status = status;
        s
    }

    #[test]
    fn no_shipments_means_no_state() {
        assert_eq!(derive_shipment_state(&order()), None);
    }

    #[test]
    fn uniform_statuses_map_through() {
        let mut order = order();
        order.shipments.push(shipment(ShipmentStatus::Shipped));
        order.shipments.push(shipment(ShipmentStatus::Shipped));
        assert_eq!(derive_shipment_state(&order), Some(ShipmentState::Shipped));
    }

    #[test]
    fn mixed_statuses_are_partial() {
        let mut order = order();
        order.shipments.push(shipment(ShipmentStatus::Shipped));
        order.shipments.push(shipment(ShipmentStatus::Pending));
        assert_eq!(derive_shipment_state(&order), Some(ShipmentState::Partial));
    }

    #[test]
    fn backorder_trumps_shipment_statuses() {
        let mut order = order();
        order.shipments.push(shipment(ShipmentStatus::Shipped));
        order.shipments[0].backordered = true;
        assert_eq!(
            derive_shipment_state(&order),
            Some(ShipmentState::Backorder)
        );
    }
}
