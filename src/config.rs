//! Cart & Logging Config

use std::path::PathBuf;

use clap::Args;
use rusty_money::iso::Currency;

use crate::pricing::{PriceError, currency_from_code};

/// Storage slot used by the storefront.
pub const DEFAULT_STORAGE_KEY: &str = "myparol_cart";

/// Cart settings.
#[derive(Debug, Clone, Args)]
pub struct CartConfig {
    /// Key of the storage slot holding the persisted cart
    #[arg(long, env = "CART_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// ISO code of the currency the storefront prices in
    #[arg(long, env = "CART_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Directory for file-backed storage (in-memory storage when unset)
    #[arg(long, env = "CART_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,
}

impl CartConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::UnknownCurrency`] if the code is not supported.
    pub fn currency(&self) -> Result<&'static Currency, PriceError> {
        currency_from_code(&self.currency)
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: "USD".to_string(),
            storage_dir: None,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[command(flatten)]
        cart: CartConfig,
    }

    #[test]
    fn default_matches_storefront() -> TestResult {
        let config = CartConfig::default();

        assert_eq!(config.storage_key, "myparol_cart");
        assert_eq!(config.currency()?, USD);
        assert!(config.storage_dir.is_none());

        Ok(())
    }

    #[test]
    fn parses_overrides_from_arguments() -> TestResult {
        let args = TestArgs::try_parse_from([
            "test",
            "--storage-key",
            "other_cart",
            "--currency",
            "GBP",
            "--storage-dir",
            "/tmp/carts",
        ])?;

        assert_eq!(args.cart.storage_key, "other_cart");
        assert_eq!(args.cart.currency()?.iso_alpha_code, "GBP");
        assert_eq!(args.cart.storage_dir, Some(PathBuf::from("/tmp/carts")));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_reported() {
        let config = CartConfig {
            currency: "XYZ".to_string(),
            ..CartConfig::default()
        };

        assert_eq!(
            config.currency(),
            Err(PriceError::UnknownCurrency("XYZ".to_string()))
        );
    }
}
