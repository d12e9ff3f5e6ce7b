//! Catalog

use std::{cmp::Ordering, fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{
    pricing::{Amount, PriceError, parse_price},
    products::ProductId,
};

pub mod fixture;
pub mod selector;

pub use selector::{AddToCart, PriceDisplay, PricingSelector, SelectorError};

use fixture::{CatalogFixture, ProductFixture};

new_key_type! {
    /// Catalog Product Key
    pub struct ProductKey;
}

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid amount on a product or variant
    #[error("Invalid price for product {product}: {source}")]
    InvalidPrice {
        /// Product id
        product: String,
        /// Parsing failure
        #[source]
        source: PriceError,
    },

    /// Product has neither flat pricing nor variants
    #[error("Product {0} needs a price and shipping, or variants")]
    MissingPricing(String),

    /// Product has both flat pricing and variants
    #[error("Product {0} has both a flat price and variants")]
    AmbiguousPricing(String),

    /// Two variants of one product share a label
    #[error("Product {product} repeats variant {label}")]
    DuplicateVariant {
        /// Product id
        product: String,
        /// Repeated label
        label: String,
    },

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The catalog lists no products
    #[error("Catalog has no products")]
    Empty,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Selector could not be created
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// One purchasable option of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Option label, absent for products sold in a single form.
    pub label: Option<String>,

    /// Unit price
    pub price: Amount,

    /// Flat per-unit shipping
    pub shipping: Amount,
}

/// Catalog product with its variants, the first being the default.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    /// Product id
    pub id: ProductId,

    /// Product name, without any variant label
    pub name: String,

    /// Variants, never empty
    pub variants: Vec<Variant>,
}

impl CatalogProduct {
    /// Name of a line item for `variant`, e.g. `Bamboo Parol Kit (Small)`.
    pub fn line_name(&self, variant: &Variant) -> String {
        match &variant.label {
            Some(label) => format!("{} ({label})", self.name),
            None => self.name.clone(),
        }
    }

    fn from_fixture(
        id: &str,
        fixture: ProductFixture,
        currency: &mut Option<&'static Currency>,
    ) -> Result<Self, CatalogError> {
        let variants = match (fixture.price, fixture.shipping, fixture.variants) {
            (Some(price), Some(shipping), variants) if variants.is_empty() => vec![Variant {
                label: None,
                price: parse_amount(id, &price, currency)?,
                shipping: parse_amount(id, &shipping, currency)?,
            }],
            (None, None, variants) if !variants.is_empty() => {
                let mut parsed: Vec<Variant> = Vec::with_capacity(variants.len());

                for variant in variants {
                    if parsed
                        .iter()
                        .any(|other| other.label.as_deref() == Some(variant.label.as_str()))
                    {
                        return Err(CatalogError::DuplicateVariant {
                            product: id.to_string(),
                            label: variant.label,
                        });
                    }

                    parsed.push(Variant {
                        price: parse_amount(id, &variant.price, currency)?,
                        shipping: parse_amount(id, &variant.shipping, currency)?,
                        label: Some(variant.label),
                    });
                }

                parsed
            }
            (None, None, _) | (Some(_), None, _) | (None, Some(_), _) => {
                return Err(CatalogError::MissingPricing(id.to_string()));
            }
            (Some(_), Some(_), _) => {
                return Err(CatalogError::AmbiguousPricing(id.to_string()));
            }
        };

        Ok(Self {
            id: ProductId::new(id),
            name: fixture.name,
            variants,
        })
    }
}

/// Parse a catalog amount, fixing the catalog currency on first use.
fn parse_amount(
    id: &str,
    s: &str,
    currency: &mut Option<&'static Currency>,
) -> Result<Amount, CatalogError> {
    let amount = parse_price(s).map_err(|source| CatalogError::InvalidPrice {
        product: id.to_string(),
        source,
    })?;

    let found = amount.currency();

    match *currency {
        Some(expected) if expected != found => Err(CatalogError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        )),
        Some(_) => Ok(amount),
        None => {
            *currency = Some(found);
            Ok(amount)
        }
    }
}

fn listing_order(left: &ProductId, right: &ProductId) -> Ordering {
    match (left.as_str().parse::<u64>(), right.as_str().parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r).then_with(|| left.cmp(right)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

/// Products offered by the storefront, all priced in one currency.
#[derive(Debug)]
pub struct Catalog {
    products: SlotMap<ProductKey, CatalogProduct>,
    product_keys: FxHashMap<ProductId, ProductKey>,
    currency: &'static Currency,
}

impl Catalog {
    /// Load a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the YAML is invalid, an amount cannot be parsed,
    /// currencies differ, a product's pricing is incomplete or ambiguous, or no products
    /// are listed.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let mut products = SlotMap::with_key();
        let mut product_keys = FxHashMap::default();
        let mut currency = None;

        for (id, product_fixture) in fixture.products {
            let product = CatalogProduct::from_fixture(&id, product_fixture, &mut currency)?;
            let product_id = product.id.clone();
            let key = products.insert(product);

            product_keys.insert(product_id, key);
        }

        let currency = currency.ok_or(CatalogError::Empty)?;

        Ok(Self {
            products,
            product_keys,
            currency,
        })
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or is not a valid catalog.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Look a product up by id.
    pub fn get(&self, id: &str) -> Option<&CatalogProduct> {
        self.product_keys
            .get(&ProductId::new(id))
            .and_then(|key| self.products.get(*key))
    }

    /// All products in listing order: numeric ids by value (`2` before `10`), then any
    /// other ids alphabetically.
    pub fn products(&self) -> Vec<&CatalogProduct> {
        let mut products: Vec<&CatalogProduct> = self.products.values().collect();

        products.sort_by(|left, right| listing_order(&left.id, &right.id));

        products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every product is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// A pricing selector for a product, on its default variant.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] for unknown ids.
    pub fn selector(&self, id: &str) -> Result<PricingSelector<'_>, CatalogError> {
        let product = self
            .get(id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;

        Ok(PricingSelector::new(product)?)
    }
}
