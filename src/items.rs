//! Items

use std::num::NonZeroU32;

use crate::{
    pricing::{Amount, PriceError, line_amount},
    products::{LineKey, ProductId},
};

/// One product or variant entry in the cart with its own quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    key: LineKey,
    unit_price: Amount,
    unit_shipping: Amount,
    quantity: NonZeroU32,
    image: String,
}

impl LineItem {
    /// Creates a line item with a quantity of one.
    pub fn new(key: LineKey, unit_price: Amount, unit_shipping: Amount) -> Self {
        Self::with_quantity(key, unit_price, unit_shipping, NonZeroU32::MIN)
    }

    /// Creates a line item with the given quantity.
    pub fn with_quantity(
        key: LineKey,
        unit_price: Amount,
        unit_shipping: Amount,
        quantity: NonZeroU32,
    ) -> Self {
        let image = key.id().image_ref();

        Self {
            key,
            unit_price,
            unit_shipping,
            quantity,
            image,
        }
    }

    /// Returns the merge key of the item
    pub fn key(&self) -> &LineKey {
        &self.key
    }

    /// Returns the product id of the item
    pub fn id(&self) -> &ProductId {
        self.key.id()
    }

    /// Returns the display name of the item
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> &Amount {
        &self.unit_price
    }

    /// Flat shipping charge for a single unit.
    pub fn unit_shipping(&self) -> &Amount {
        &self.unit_shipping
    }

    /// Number of units, never zero.
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Display image reference.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the result does not fit in minor units.
    pub fn line_price(&self) -> Result<Amount, PriceError> {
        line_amount(&self.unit_price, self.quantity)
    }

    /// Unit shipping multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the result does not fit in minor units.
    pub fn line_shipping(&self) -> Result<Amount, PriceError> {
        line_amount(&self.unit_shipping, self.quantity)
    }

    /// Adds one unit, returning `false` when the quantity is already at its maximum.
    pub(crate) fn increment(&mut self) -> bool {
        match self.quantity.checked_add(1) {
            Some(quantity) => {
                self.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Drops one unit, returning `false` when the last unit would go.
    pub(crate) fn decrement(&mut self) -> bool {
        match NonZeroU32::new(self.quantity.get() - 1) {
            Some(quantity) => {
                self.quantity = quantity;
                true
            }
            None => false,
        }
    }
}
