//! Utils

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CartConfig, LoggingConfig};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Catalog file to load (the bundled storefront catalog when unset)
    #[clap(short, long)]
    pub catalog: Option<PathBuf>,

    /// Product to add to the cart
    #[clap(short, long, default_value = "1")]
    pub product: String,

    /// Option to select before adding
    #[clap(short, long)]
    pub option: Option<String>,

    /// Number of units to add
    #[clap(short = 'n', long, default_value_t = 1)]
    pub quantity: u32,

    /// Cart settings
    #[command(flatten)]
    pub cart: CartConfig,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}
