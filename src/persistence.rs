//! Persisted cart format.
//!
//! The storage slot holds a versioned JSON document:
//!
//! ```json
//! {"version":1,"currency":"USD","items":[
//!   {"id":"1","name":"Bamboo Parol Kit (Small)","price":"25.00","shipping":"5.00",
//!    "quantity":2,"image":"images/product1.jpg"}
//! ]}
//! ```
//!
//! A bare JSON array of items with numeric amounts is the older, unversioned layout. It is
//! still read, in the caller's currency, and is replaced by the versioned layout on the
//! next save. Derived totals are never stored.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    cart::{Cart, CartBuildError},
    items::LineItem,
    pricing::{PriceError, currency_from_code, from_decimal, to_decimal},
    products::{LineKey, ProductId},
};

/// Current persisted schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Persisted data that cannot be turned back into a cart.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("persisted cart is not valid: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither an item array nor a versioned object.
    #[error("persisted cart must be an array or an object")]
    UnexpectedShape,

    /// A versioned object without a numeric `version` field.
    #[error("persisted cart has no version")]
    MissingVersion,

    /// Written by a schema this build does not know.
    #[error("unsupported persisted cart version {0}")]
    UnsupportedVersion(u64),

    /// Amount or currency problems.
    #[error("persisted cart has an invalid amount: {0}")]
    Price(#[from] PriceError),

    /// Lines that break cart invariants.
    #[error("persisted cart lines are inconsistent: {0}")]
    Cart(#[from] CartBuildError),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCart {
    version: u64,
    currency: String,
    items: Vec<StoredLineItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredLineItem {
    id: ProductId,
    name: String,
    price: Decimal,
    shipping: Decimal,
    quantity: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl StoredLineItem {
    fn into_line_item(self, currency: &'static Currency) -> Result<LineItem, PriceError> {
        Ok(LineItem::with_quantity(
            LineKey::new(self.id, self.name),
            from_decimal(self.price, currency)?,
            from_decimal(self.shipping, currency)?,
            self.quantity,
        ))
    }

    /// Float amounts from the unversioned layout are rounded to the currency's precision.
    fn round_legacy_amounts(mut self, currency: &Currency) -> Self {
        self.price = self.price.round_dp(currency.exponent);
        self.shipping = self.shipping.round_dp(currency.exponent);
        self
    }
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id().clone(),
            name: item.name().to_string(),
            price: to_decimal(item.unit_price()),
            shipping: to_decimal(item.unit_shipping()),
            quantity: item.quantity(),
            image: Some(item.image().to_string()),
        }
    }
}

/// Serialize a cart's lines in the current schema.
///
/// # Errors
///
/// Returns [`PersistError::Json`] if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, PersistError> {
    let stored = StoredCart {
        version: SCHEMA_VERSION,
        currency: cart.currency().iso_alpha_code.to_string(),
        items: cart.iter().map(StoredLineItem::from).collect(),
    };

    Ok(serde_json::to_string(&stored)?)
}

/// Rebuild a cart from a stored value.
///
/// # Errors
///
/// Returns a [`PersistError`] when the value is malformed, comes from an unknown schema
/// version, is priced in a currency other than `currency`, or breaks a cart invariant.
pub fn decode(raw: &str, currency: &'static Currency) -> Result<Cart, PersistError> {
    let value: Value = serde_json::from_str(raw)?;

    let (stored_currency, items) = if value.is_array() {
        let items: Vec<StoredLineItem> = serde_json::from_value(value)?;

        (
            currency,
            items
                .into_iter()
                .map(|item| item.round_legacy_amounts(currency))
                .collect::<Vec<_>>(),
        )
    } else if value.is_object() {
        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .ok_or(PersistError::MissingVersion)?;

        if version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedVersion(version));
        }

        let stored: StoredCart = serde_json::from_value(value)?;

        (currency_from_code(&stored.currency)?, stored.items)
    } else {
        return Err(PersistError::UnexpectedShape);
    };

    if stored_currency != currency {
        return Err(PriceError::CurrencyMismatch {
            expected: currency.iso_alpha_code,
            actual: stored_currency.iso_alpha_code,
        }
        .into());
    }

    let items = items
        .into_iter()
        .map(|item| item.into_line_item(currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Cart::with_items(items, currency)?)
}
