//! Catalog Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
///
/// Either `price` and `shipping` are set, or `variants` lists the options.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Flat price (e.g., "89.99 USD")
    #[serde(default)]
    pub price: Option<String>,

    /// Flat per-unit shipping (e.g., "15.00 USD")
    #[serde(default)]
    pub shipping: Option<String>,

    /// Selectable variants, the first being the default
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Option label (e.g., "Small")
    pub label: String,

    /// Variant price
    pub price: String,

    /// Variant per-unit shipping
    pub shipping: String,
}
