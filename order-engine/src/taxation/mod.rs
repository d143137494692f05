//! Taxation
//!
//! - **matcher**: decides which tax rates apply to an entity
//! - **adjuster**: keeps each line item's and shipment's tax adjustments in
//!   step with the applicable rates

pub mod adjuster;
pub mod matcher;

pub use adjuster::TaxAdjuster;
pub use matcher::rate_applies;
