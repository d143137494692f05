use shared::money::{Currency, DEFAULT_CURRENCY};

use crate::adjustments::{BestDiscountChooser, PromotionChooser};

/// Engine configuration.
///
/// # Environment variables
///
/// All items can be overridden via environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENGINE_DEFAULT_CURRENCY | USD | fallback currency for orphaned adjustments |
/// | ENGINE_PROMOTION_CHOOSER | best_discount | promotion selection strategy |
/// | ENGINE_LOG_LEVEL | info | log level |
/// | ENGINE_LOG_JSON | false | JSON log output (production) |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fallback currency when an adjustment cannot resolve its adjustable
    pub default_currency: Currency,
    /// Promotion selection strategy
    pub chooser: ChooserKind,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// JSON log output
    pub json_logs: bool,
}

/// Named promotion chooser strategies selectable via config.
///
/// Custom strategies bypass this and inject a `PromotionChooser`
/// implementation into the updater directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChooserKind {
    /// Single best discount per adjustable, ties broken by creation order
    #[default]
    BestDiscount,
}

impl ChooserKind {
    pub fn chooser(&self) -> &'static dyn PromotionChooser {
        match self {
            ChooserKind::BestDiscount => &BestDiscountChooser,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            default_currency: std::env::var("ENGINE_DEFAULT_CURRENCY")
                .ok()
                .and_then(|c| Currency::from_code(&c))
                .unwrap_or(DEFAULT_CURRENCY),
            chooser: match std::env::var("ENGINE_PROMOTION_CHOOSER").as_deref() {
                Ok("best_discount") | Err(_) => ChooserKind::BestDiscount,
                Ok(other) => {
                    tracing::warn!(strategy = other, "unknown promotion chooser, using default");
                    ChooserKind::BestDiscount
                }
            },
            log_level: std::env::var("ENGINE_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            json_logs: std::env::var("ENGINE_LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY,
            chooser: ChooserKind::BestDiscount,
            log_level: "info".into(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = EngineConfig::default();
        assert_eq!(config.default_currency, Currency::Usd);
        assert_eq!(config.chooser, ChooserKind::BestDiscount);
        assert!(!config.json_logs);
    }
}
