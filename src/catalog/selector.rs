//! Pricing Selector
//!
//! Tracks the option chosen on a product page and derives what the page shows and what
//! the add button passes to the cart. It holds no cart state of its own.

use thiserror::Error;

use crate::{
    catalog::{CatalogProduct, Variant},
    notifications::Notifier,
    pricing::{Amount, PriceError, format_price, total},
    products::ProductId,
    storage::CartStorage,
    store::{CartError, CartStore},
};

/// Errors from option selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// The product offers nothing to select.
    #[error("product {0} has no options")]
    NoOptions(String),

    /// No option carries this label.
    #[error("product {product} has no option {label}")]
    UnknownOption {
        /// Product id
        product: String,
        /// Requested label
        label: String,
    },
}

/// Strings shown next to the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDisplay {
    /// Unit price, e.g. `$25.00`
    pub price: String,

    /// Shipping line, e.g. `+ $5.00 shipping`
    pub shipping: String,

    /// Combined line, e.g. `Total: $30.00`
    pub total: String,
}

/// Parameters bound to the add-to-cart trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToCart {
    /// Product id
    pub id: ProductId,

    /// Line name, carrying the option label when there is one
    pub name: String,

    /// Unit price
    pub price: Amount,

    /// Per-unit shipping
    pub shipping: Amount,
}

impl AddToCart {
    /// Add one unit to `store`.
    ///
    /// # Errors
    ///
    /// Returns the [`CartError`] from [`CartStore::add_item`].
    pub fn apply<S, N>(self, store: &mut CartStore<S, N>) -> Result<(), CartError>
    where
        S: CartStorage,
        N: Notifier,
    {
        store.add_item(self.id, self.name, self.price, self.shipping)
    }
}

/// Option selection for one catalog product.
#[derive(Debug, Clone)]
pub struct PricingSelector<'a> {
    product: &'a CatalogProduct,
    selected: &'a Variant,
}

impl<'a> PricingSelector<'a> {
    /// Start on the product's first option.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::NoOptions`] if the product has no variants.
    pub fn new(product: &'a CatalogProduct) -> Result<Self, SelectorError> {
        let selected = product
            .variants
            .first()
            .ok_or_else(|| SelectorError::NoOptions(product.id.to_string()))?;

        Ok(Self { product, selected })
    }

    /// Switch to the option labelled `label`. The selection is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::UnknownOption`] if no option has this label.
    pub fn select(&mut self, label: &str) -> Result<(), SelectorError> {
        let variant = self
            .product
            .variants
            .iter()
            .find(|variant| variant.label.as_deref() == Some(label))
            .ok_or_else(|| SelectorError::UnknownOption {
                product: self.product.id.to_string(),
                label: label.to_string(),
            })?;

        tracing::debug!(product = %self.product.id, label, "selected option");

        self.selected = variant;

        Ok(())
    }

    /// Product being priced.
    pub fn product(&self) -> &'a CatalogProduct {
        self.product
    }

    /// Currently selected option.
    pub fn selected(&self) -> &'a Variant {
        self.selected
    }

    /// Labels of the options, in catalog order. Empty for single-form products.
    pub fn options(&self) -> Vec<&'a str> {
        self.product
            .variants
            .iter()
            .filter_map(|variant| variant.label.as_deref())
            .collect()
    }

    /// Price, shipping and combined total for one unit of the selection.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the combined total is out of range.
    pub fn display(&self) -> Result<PriceDisplay, PriceError> {
        let Variant {
            price, shipping, ..
        } = self.selected;

        let combined = total([*price, *shipping], price.currency())?;

        Ok(PriceDisplay {
            price: format_price(price),
            shipping: format!("+ {} shipping", format_price(shipping)),
            total: format!("Total: {}", format_price(&combined)),
        })
    }

    /// What the add trigger sends for the current selection.
    pub fn add_to_cart(&self) -> AddToCart {
        AddToCart {
            id: self.product.id.clone(),
            name: self.product.line_name(self.selected),
            price: self.selected.price,
            shipping: self.selected.shipping,
        }
    }
}
