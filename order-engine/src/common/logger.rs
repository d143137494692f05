//! Logging Infrastructure
//!
//! Structured logging setup for both development and production
//! environments: console output with an env-filter, plain text for
//! development, JSON for production log shipping.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging system.
///
/// # Arguments
/// * `level` - Log level used when RUST_LOG is unset (e.g., "info", "debug")
/// * `json_format` - Whether to use JSON format (true for production)
///
/// # Examples
/// ```no_run
/// use order_engine::common::logger::init_logger;
///
/// // Development setup
/// init_logger("debug", false).unwrap();
/// ```
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_target(true).boxed())
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true).boxed()).try_init()?;
    }

    Ok(())
}
