//! Shared domain model for the storefront order engine
//!
//! Pure data types used by both the recalculation engine and any outer
//! surface (API, sync, reporting):
//!
//! - **money**: currency definitions and display formatting
//! - **models**: adjustment sources (promotions, tax rates, cancellations)
//! - **order**: order aggregate, line items, shipments, payments, adjustments
//! - **util**: timestamps and snowflake resource IDs

pub mod models;
pub mod money;
pub mod order;
pub mod util;

// Re-exports for convenience
pub use money::{format_amount, Currency, DEFAULT_CURRENCY};
pub use order::{
    Adjustment, AdjustableRef, AdjustmentId, LineItem, Order, OrderState, Payment, PaymentState,
    PaymentStatus, Refund, Shipment, ShipmentState, ShipmentStatus, SourceRef,
};
