//! Order total and adjustment recalculation engine
//!
//! Recomputes an order's totals from its line items, shipments, payments,
//! and adjustments, enforcing a strict evaluation order:
//!
//! ```text
//! mutation (item added, coupon applied, payment captured, ...)
//!        ↓
//!   OrderUpdater
//!        ↓
//! promotions → taxes → cancellations → per-item totals → order totals
//!        ↓
//! payment/shipment state derivation → observer notification → commit
//! ```
//!
//! The pipeline is synchronous, idempotent, and non-reentrant: the final
//! commit writes plain fields and exposes no callback path back into the
//! pipeline. Callers serialize per order; the engine never coordinates
//! concurrent recalculations of the same order.
//!
//! - **sources**: the `compute_amount` capability and the source registry
//! - **adjustments**: adjustment ledger, refresh, promotion chooser
//! - **taxation**: tax rate matching and the tax adjuster
//! - **updater**: the recalculation pipeline and state derivation
//! - **core / common**: config and logging bootstrap

pub mod adjustments;
pub mod common;
pub mod core;
pub mod money;
pub mod sources;
pub mod taxation;
pub mod updater;

// Re-exports
pub use crate::adjustments::{AdjustmentLedger, BestDiscountChooser, PromotionChooser};
pub use crate::core::config::EngineConfig;
pub use crate::core::error::{RecalcError, RecalcResult};
pub use crate::sources::{Adjustable, AdjustmentSource, Source, SourceRegistry};
pub use crate::taxation::TaxAdjuster;
pub use crate::updater::{NoopObserver, OrderUpdater, RecalcObserver, ShippingRates};
