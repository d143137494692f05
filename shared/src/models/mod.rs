//! Adjustment source models
//!
//! The entities an adjustment can point back to for recomputation:
//! promotions (with their actions and coupon codes), tax rates, and unit
//! cancellations. These are pure data; the amount computation lives in the
//! engine's `sources` module.

pub mod cancellation;
pub mod promotion;
pub mod tax_rate;

pub use cancellation::UnitCancellation;
pub use promotion::{Promotion, PromotionAction, PromotionCalculator, PromotionCode};
pub use tax_rate::TaxRate;
