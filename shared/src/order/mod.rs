//! Order aggregate and its derived totals
//!
//! The totals fields on [`Order`] are owned by the recalculation engine:
//! external code mutates line items, shipments, and payments, then asks the
//! engine to recompute. Nothing outside the engine writes the totals.

mod adjustment;
mod types;

pub use adjustment::{Adjustment, AdjustableRef, AdjustmentId, SourceRef};
pub use types::{LineItem, Payment, PaymentStatus, Refund, Shipment, ShipmentStatus};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Currency;
use crate::util::{now_millis, snowflake_id};

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    #[default]
    Cart,
    Complete,
    Canceled,
}

/// Derived payment state of the whole order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    BalanceDue,
    CreditOwed,
    Paid,
    Failed,
    Void,
}

/// Derived shipment state of the whole order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentState {
    Backorder,
    Canceled,
    Partial,
    Pending,
    Ready,
    Shipped,
}

impl ShipmentState {
    /// State of an order whose shipments all share one status.
    pub fn from_status(status: ShipmentStatus) -> Self {
        match status {
            ShipmentStatus::Pending => ShipmentState::Pending,
            ShipmentStatus::Ready => ShipmentState::Ready,
            ShipmentStatus::Shipped => ShipmentState::Shipped,
            ShipmentStatus::Canceled => ShipmentState::Canceled,
        }
    }
}

/// Order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub state: OrderState,
    pub currency: Currency,
    /// Tax zone resolved from the shipping address (resolution out of scope)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_zone_id: Option<i64>,

    pub line_items: Vec<LineItem>,
    pub shipments: Vec<Shipment>,
    pub payments: Vec<Payment>,

    // === Derived totals (written only by the recalculator) ===
    #[serde(default)]
    pub item_total: Decimal,
    #[serde(default)]
    pub shipment_total: Decimal,
    #[serde(default)]
    pub promo_total: Decimal,
    #[serde(default)]
    pub included_tax_total: Decimal,
    #[serde(default)]
    pub additional_tax_total: Decimal,
    #[serde(default)]
    pub adjustment_total: Decimal,
    #[serde(default)]
    pub payment_total: Decimal,
    /// item_total + shipment_total + adjustment_total
    #[serde(default)]
    pub total: Decimal,
    /// Sum of line item quantities
    #[serde(default)]
    pub item_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_state: Option<PaymentState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_state: Option<ShipmentState>,

    /// Checkout completion time. Stays set when a completed order is later
    /// canceled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn new(currency: Currency) -> Self {
        let now = now_millis();
        Self {
            id: snowflake_id(),
            state: OrderState::Cart,
            currency,
            tax_zone_id: None,
            line_items: Vec::new(),
            shipments: Vec::new(),
            payments: Vec::new(),
            item_total: Decimal::ZERO,
            shipment_total: Decimal::ZERO,
            promo_total: Decimal::ZERO,
            included_tax_total: Decimal::ZERO,
            additional_tax_total: Decimal::ZERO,
            adjustment_total: Decimal::ZERO,
            payment_total: Decimal::ZERO,
            total: Decimal::ZERO,
            item_count: 0,
            payment_state: None,
            shipment_state: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark checkout as completed.
    pub fn complete(&mut self) {
        self.state = OrderState::Complete;
        self.completed_at = Some(now_millis());
    }

    /// Cancel the order. A prior completion timestamp is kept.
    pub fn cancel(&mut self) {
        self.state = OrderState::Canceled;
    }

    /// Checkout has completed at some point (true for canceled orders that
    /// completed first).
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_canceled(&self) -> bool {
        self.state == OrderState::Canceled
    }

    /// Amount still owed by the customer (negative = credit owed back).
    pub fn outstanding_balance(&self) -> Decimal {
        self.total - self.payment_total
    }

    /// Any shipment carries backordered inventory.
    pub fn backordered(&self) -> bool {
        self.shipments.iter().any(|s| s.backordered)
    }

    pub fn reference(&self) -> AdjustableRef {
        AdjustableRef::Order(self.id)
    }

    pub fn line_item(&self, id: i64) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }

    pub fn line_item_mut(&mut self, id: i64) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|li| li.id == id)
    }

    pub fn shipment(&self, id: i64) -> Option<&Shipment> {
        self.shipments.iter().find(|s| s.id == id)
    }

    pub fn shipment_mut(&mut self, id: i64) -> Option<&mut Shipment> {
        self.shipments.iter_mut().find(|s| s.id == id)
    }
}
