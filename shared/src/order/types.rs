//! Line item, shipment, and payment types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::{now_millis, snowflake_id};

// ============================================================================
// Line Items
// ============================================================================

/// One product line in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub id: i64,
    /// Product the line was created from
    pub product_id: i64,
    /// Product name snapshot
    pub name: String,
    /// Unit price
    pub price: Decimal,
    pub quantity: i32,
    /// Tax category for rate matching (None = uncategorized)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_category_id: Option<i64>,

    // === Derived totals (written only by the recalculator) ===
    /// Sum of eligible promotion adjustment amounts (non-positive)
    #[serde(default)]
    pub promo_total: Decimal,
    /// Tax already contained in the price
    #[serde(default)]
    pub included_tax_total: Decimal,
    /// Tax charged on top of the price
    #[serde(default)]
    pub additional_tax_total: Decimal,
    /// promo_total + additional_tax_total + cancellations
    #[serde(default)]
    pub adjustment_total: Decimal,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl LineItem {
    pub fn new(product_id: i64, name: impl Into<String>, price: Decimal, quantity: i32) -> Self {
        Self {
            id: snowflake_id(),
            product_id,
            name: name.into(),
            price,
            quantity,
            tax_category_id: None,
            promo_total: Decimal::ZERO,
            included_tax_total: Decimal::ZERO,
            additional_tax_total: Decimal::ZERO,
            adjustment_total: Decimal::ZERO,
            updated_at: now_millis(),
        }
    }

    /// Undiscounted line amount: price × quantity.
    pub fn amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Line amount after promotions - the base for tax computation.
    pub fn discounted_amount(&self) -> Decimal {
        self.amount() + self.promo_total
    }

    /// Customer-facing line total including all adjustments.
    pub fn total(&self) -> Decimal {
        self.amount() + self.adjustment_total
    }
}

// ============================================================================
// Shipments
// ============================================================================

/// Fulfilment state of a single shipment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Ready,
    Shipped,
    Canceled,
}

/// One shipment of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: i64,
    /// Shipping charge
    pub cost: Decimal,
    pub status: ShipmentStatus,
    /// Any inventory unit in this shipment is on backorder
    #[serde(default)]
    pub backordered: bool,
    /// Tax category of the shipping charge (None = untaxed shipping)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_category_id: Option<i64>,

    // === Derived totals (written only by the recalculator) ===
    #[serde(default)]
    pub promo_total: Decimal,
    #[serde(default)]
    pub included_tax_total: Decimal,
    #[serde(default)]
    pub additional_tax_total: Decimal,
    #[serde(default)]
    pub adjustment_total: Decimal,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Shipment {
    pub fn new(cost: Decimal) -> Self {
        Self {
            id: snowflake_id(),
            cost,
            status: ShipmentStatus::Pending,
            backordered: false,
            tax_category_id: None,
            promo_total: Decimal::ZERO,
            included_tax_total: Decimal::ZERO,
            additional_tax_total: Decimal::ZERO,
            adjustment_total: Decimal::ZERO,
            updated_at: now_millis(),
        }
    }

    /// Shipping charge after promotions - the base for tax computation.
    pub fn discounted_cost(&self) -> Decimal {
        self.cost + self.promo_total
    }
}

// ============================================================================
// Payments
// ============================================================================

/// Processing state of a single payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Checkout,
    Pending,
    Processing,
    Completed,
    Failed,
    Void,
    Invalid,
}

/// Partial or full refund against a payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Refund {
    pub id: i64,
    pub amount: Decimal,
}

/// One payment against an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    #[serde(default)]
    pub refunds: Vec<Refund>,
}

impl Payment {
    pub fn new(amount: Decimal, status: PaymentStatus) -> Self {
        Self {
            id: snowflake_id(),
            amount,
            status,
            refunds: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Still able to settle: not failed, voided, or stored invalid.
    pub fn is_valid(&self) -> bool {
        !matches!(
            self.status,
            PaymentStatus::Failed | PaymentStatus::Void | PaymentStatus::Invalid
        )
    }

    pub fn refund_total(&self) -> Decimal {
        self.refunds.iter().map(|r| r.amount).sum()
    }

    /// Amount counted toward the order's payment total.
    pub fn captured_amount(&self) -> Decimal {
        self.amount - self.refund_total()
    }
}
