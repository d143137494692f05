//! Promotion model - a discount campaign with actions and coupon codes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Promotion campaign.
///
/// Eligibility rules (customer segments, first-order-only, etc.) are decided
/// upstream; the engine only needs the validity window, the active flag, and
/// whether a coupon code is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    pub id: i64,
    /// Internal name
    pub name: String,
    /// Label stamped on adjustments created by this promotion
    pub label: String,
    /// Coupon codes attached to this promotion (empty = applied automatically)
    #[serde(default)]
    pub codes: Vec<PromotionCode>,
    /// Validity window start (Unix milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<i64>,
    /// Validity window end (Unix milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

impl Promotion {
    /// Whether the promotion is active and inside its validity window.
    pub fn is_live(&self, now: i64) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|s| now >= s)
            && self.expires_at.is_none_or(|e| now < e)
    }

    /// Promotions with at least one code require a code reference on every
    /// adjustment they produce.
    pub fn code_required(&self) -> bool {
        !self.codes.is_empty()
    }

    pub fn code(&self, code_id: i64) -> Option<&PromotionCode> {
        self.codes.iter().find(|c| c.id == code_id)
    }
}

/// Coupon code belonging to a promotion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromotionCode {
    pub id: i64,
    /// The code as typed by the customer, e.g. "SUMMER10"
    pub value: String,
}

/// How a promotion action computes its discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionCalculator {
    /// Fixed amount off the adjustable
    FlatRate { amount: Decimal },
    /// Percentage of the adjustable's amount (0-100)
    Percent { percent: Decimal },
    /// Buy-N pricing: a fixed discount per full group of `group_size` units,
    /// flooring at group boundaries (quantity 3, group 2 → one group)
    QuantityGrouped { group_size: u32, per_group: Decimal },
    /// Waives a shipment's cost entirely
    FreeShipping,
}

/// Promotion action: yields one adjustment per target adjustable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionAction {
    pub id: i64,
    /// Parent promotion
    pub promotion_id: i64,
    pub calculator: PromotionCalculator,
}
