//! Unit cancellation model

use serde::{Deserialize, Serialize};

/// Short-ship record: units of a line item cancelled after completion.
///
/// The customer keeps the order but is not charged for the cancelled units;
/// the engine reflects this as a negative cancellation adjustment on the
/// line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitCancellation {
    pub id: i64,
    /// Line item the cancelled units belong to
    pub line_item_id: i64,
    /// Number of units cancelled
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
