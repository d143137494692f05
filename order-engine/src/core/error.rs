use shared::order::AdjustmentId;
use thiserror::Error;

/// Result type used across the engine.
pub type RecalcResult<T> = Result<T, RecalcError>;

/// Recalculation errors.
///
/// Validation failures (missing coupon code) surface as typed variants so
/// the caller decides whether the order mutation fails; source computation
/// failures abort the pipeline and leave the order totals uncommitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecalcError {
    #[error("Adjustment not found: {0}")]
    AdjustmentNotFound(AdjustmentId),

    #[error("Line item not found: {0}")]
    LineItemNotFound(i64),

    #[error("Shipment not found: {0}")]
    ShipmentNotFound(i64),

    #[error("Promotion action not found: {0}")]
    PromotionActionNotFound(i64),

    #[error("Cancellation not found: {0}")]
    CancellationNotFound(i64),

    #[error("Promotion {promotion_id} requires a coupon code")]
    PromotionCodeRequired { promotion_id: i64 },

    #[error("Coupon code {code_id} does not belong to promotion {promotion_id}")]
    UnknownPromotionCode { promotion_id: i64, code_id: i64 },

    #[error("Invalid calculator configuration: {0}")]
    InvalidCalculator(String),

    #[error("Source computation failed: {0}")]
    SourceComputation(String),
}
