//! Adjustment record - a monetary delta attached to an adjustable entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::now_millis;

/// Ledger-assigned adjustment id. Ascending ids follow creation order.
pub type AdjustmentId = u64;

/// Entity an adjustment modifies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustableRef {
    Order(i64),
    LineItem(i64),
    Shipment(i64),
}

/// Where an adjustment's amount comes from.
///
/// The tag says what the reference claims to be; whether it still resolves
/// is decided against the source registry (dangling references are
/// tolerated and classified non-tax).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceRef {
    PromotionAction(i64),
    TaxRate(i64),
    Cancellation(i64),
}

/// A signed monetary delta on an order, line item, or shipment.
///
/// Negative amounts are discounts, positive amounts are charges. Amounts
/// are always in the owning order's currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Adjustment {
    /// 0 until the ledger assigns an id on insert
    pub id: AdjustmentId,
    /// Owning order
    pub order_id: i64,
    pub adjustable: AdjustableRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    pub amount: Decimal,
    /// Receipt label, e.g. "Summer Sale" or "IVA 21%"
    pub label: String,
    /// Counted toward totals (ineligible adjustments are retained but inert)
    pub eligible: bool,
    /// Frozen against recomputation
    #[serde(default)]
    pub finalized: bool,
    /// Included-in-price tax: shown on receipts, never changes the total
    #[serde(default)]
    pub included: bool,
    /// Coupon code that produced this adjustment. Required when the source
    /// promotion carries at least one code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_code_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Adjustment {
    pub fn new(
        order_id: i64,
        adjustable: AdjustableRef,
        source: Option<SourceRef>,
        amount: Decimal,
        label: impl Into<String>,
    ) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            order_id,
            adjustable,
            source,
            amount,
            label: label.into(),
            eligible: true,
            finalized: false,
            included: false,
            promotion_code_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tagged as coming from a promotion action.
    pub fn promotion_sourced(&self) -> bool {
        matches!(self.source, Some(SourceRef::PromotionAction(_)))
    }

    /// Tagged as coming from a tax rate.
    pub fn tax_sourced(&self) -> bool {
        matches!(self.source, Some(SourceRef::TaxRate(_)))
    }

    /// Tagged as coming from a unit cancellation.
    pub fn cancellation_sourced(&self) -> bool {
        matches!(self.source, Some(SourceRef::Cancellation(_)))
    }
}
