//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{Amount, PriceError, ensure_unit_amount, total},
    products::LineKey,
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartBuildError {
    /// An item's amounts are not valid unit amounts for the cart (index, cause).
    #[error("Item {0} has invalid pricing: {1}")]
    InvalidItem(usize, #[source] PriceError),

    /// Two items share the same merge key (index of the second occurrence, key).
    #[error("Item {0} duplicates line {1}")]
    DuplicateLine(usize, LineKey),
}

/// A line already holds the largest quantity a line item can carry.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Line {0} is already at its maximum quantity")]
pub struct QuantityLimit(pub LineKey);

/// Derived view of a cart: unit count and money totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartSummary {
    /// Sum of all quantities.
    pub count: u64,

    /// Sum of unit price times quantity.
    pub subtotal: Amount,

    /// Sum of unit shipping times quantity.
    pub shipping: Amount,

    /// Subtotal plus shipping.
    pub total: Amount,
}

impl CartSummary {
    /// Summary of a cart with no items.
    pub fn empty(currency: &'static Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            count: 0,
            subtotal: zero,
            shipping: zero,
            total: zero,
        }
    }
}

/// Ordered line items priced in a single currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a cart holding the given items, in order.
    ///
    /// # Errors
    ///
    /// Returns a [`CartBuildError`] if an item is priced in another currency, carries a
    /// negative amount, or repeats an earlier item's merge key.
    pub fn with_items(
        items: impl Into<Vec<LineItem>>,
        currency: &'static Currency,
    ) -> Result<Self, CartBuildError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            ensure_unit_amount(item.unit_price(), currency)
                .and_then(|()| ensure_unit_amount(item.unit_shipping(), currency))
                .map_err(|error| CartBuildError::InvalidItem(i, error))?;

            if items.iter().take(i).any(|other| other.key() == item.key()) {
                return Err(CartBuildError::DuplicateLine(i, item.key().clone()));
            }

            Ok(())
        })?;

        Ok(Cart { items, currency })
    }

    /// Calculate the summary by folding over the current items.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if a total leaves the minor unit range.
    pub fn summary(&self) -> Result<CartSummary, PriceError> {
        let count = self
            .items
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum();

        let subtotal = total(
            self.items
                .iter()
                .map(LineItem::line_price)
                .collect::<Result<Vec<_>, _>>()?,
            self.currency,
        )?;

        let shipping = total(
            self.items
                .iter()
                .map(LineItem::line_shipping)
                .collect::<Result<Vec<_>, _>>()?,
            self.currency,
        )?;

        let grand_total = total([subtotal, shipping], self.currency)?;

        Ok(CartSummary {
            count,
            subtotal,
            shipping,
            total: grand_total,
        })
    }

    /// Add one unit: merges into the line with the same key, or appends a new line.
    ///
    /// Returns `true` when a new line was appended.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityLimit`] if the matching line cannot take another unit.
    pub fn add(
        &mut self,
        key: LineKey,
        unit_price: Amount,
        unit_shipping: Amount,
    ) -> Result<bool, QuantityLimit> {
        if let Some(item) = self.items.iter_mut().find(|item| item.key() == &key) {
            return if item.increment() {
                Ok(false)
            } else {
                Err(QuantityLimit(key))
            };
        }

        self.items
            .push(LineItem::new(key, unit_price, unit_shipping));

        Ok(true)
    }

    /// Add one unit to an existing line. Returns `false` when no line matches.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityLimit`] if the line cannot take another unit.
    pub fn increase(&mut self, id: &str, name: &str) -> Result<bool, QuantityLimit> {
        let Some(item) = self.items.iter_mut().find(|item| item.key().matches(id, name)) else {
            return Ok(false);
        };

        if item.increment() {
            Ok(true)
        } else {
            Err(QuantityLimit(item.key().clone()))
        }
    }

    /// Take one unit off an existing line, dropping the line at its last unit.
    ///
    /// Returns `false` when no line matches.
    pub fn decrease(&mut self, id: &str, name: &str) -> bool {
        let Some(position) = self.position(id, name) else {
            return false;
        };

        let kept = self
            .items
            .get_mut(position)
            .is_some_and(LineItem::decrement);

        if !kept {
            self.items.remove(position);
        }

        true
    }

    /// Remove a line entirely, returning it.
    pub fn remove(&mut self, id: &str, name: &str) -> Option<LineItem> {
        self.position(id, name)
            .map(|position| self.items.remove(position))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Find a line by its raw `(id, name)` pair.
    pub fn get(&self, id: &str, name: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key().matches(id, name))
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// The lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, id: &str, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.key().matches(id, name))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    const SMALL: &str = "Bamboo Parol Kit (Small)";
    const LARGE: &str = "Bamboo Parol Kit (Large)";

    fn usd(minor: i64) -> Amount {
        Money::from_minor(minor, USD)
    }

    fn add_small(cart: &mut Cart) -> Result<bool, QuantityLimit> {
        cart.add(LineKey::new("1", SMALL), usd(2500), usd(500))
    }

    #[test]
    fn new_cart_is_empty_with_zero_summary() -> TestResult {
        let cart = Cart::new(USD);

        assert!(cart.is_empty());
        assert_eq!(cart.summary()?, CartSummary::empty(USD));

        Ok(())
    }

    #[test]
    fn add_merges_on_matching_key() -> TestResult {
        let mut cart = Cart::new(USD);

        assert!(add_small(&mut cart)?);
        assert!(!add_small(&mut cart)?);

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.get("1", SMALL).map(|item| item.quantity().get()),
            Some(2)
        );

        let summary = cart.summary()?;

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, usd(6000));

        Ok(())
    }

    #[test]
    fn add_keeps_variants_apart() -> TestResult {
        let mut cart = Cart::new(USD);

        add_small(&mut cart)?;
        cart.add(LineKey::new("1", LARGE), usd(4500), usd(800))?;

        assert_eq!(cart.len(), 2);
        let names: Vec<&str> = cart.iter().map(LineItem::name).collect();
        assert_eq!(names, vec![SMALL, LARGE]);

        Ok(())
    }

    #[test]
    fn merge_keeps_first_unit_pricing() -> TestResult {
        let mut cart = Cart::new(USD);

        add_small(&mut cart)?;
        cart.add(LineKey::new("1", SMALL), usd(9900), usd(900))?;

        assert_eq!(
            cart.get("1", SMALL).map(|item| *item.unit_price()),
            Some(usd(2500))
        );

        Ok(())
    }

    #[test]
    fn decrease_from_one_removes_line() -> TestResult {
        let mut cart = Cart::new(USD);
        add_small(&mut cart)?;

        assert!(cart.decrease("1", SMALL));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn missing_lines_are_no_ops() -> TestResult {
        let mut cart = Cart::new(USD);
        add_small(&mut cart)?;
        let before = cart.clone();

        assert!(!cart.increase("1", LARGE)?);
        assert!(!cart.decrease("2", SMALL));
        assert!(cart.remove("1", LARGE).is_none());

        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn remove_returns_line() -> TestResult {
        let mut cart = Cart::new(USD);
        add_small(&mut cart)?;

        let removed = cart.remove("1", SMALL);

        assert_eq!(removed.map(|item| item.name().to_string()), Some(SMALL.to_string()));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn with_items_rejects_currency_mismatch() {
        let items = [LineItem::new(
            LineKey::new("1", SMALL),
            Money::from_minor(2500, GBP),
            usd(500),
        )];

        let result = Cart::with_items(items, USD);

        assert!(matches!(
            result,
            Err(CartBuildError::InvalidItem(0, PriceError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn with_items_rejects_duplicate_keys() {
        let items = [
            LineItem::new(LineKey::new("1", SMALL), usd(2500), usd(500)),
            LineItem::new(LineKey::new("1", LARGE), usd(4500), usd(800)),
            LineItem::new(LineKey::new("1", SMALL), usd(2500), usd(500)),
        ];

        let result = Cart::with_items(items, USD);

        assert!(matches!(result, Err(CartBuildError::DuplicateLine(2, _))));
    }

    #[test]
    fn summary_folds_every_line() -> TestResult {
        let mut cart = Cart::new(USD);
        add_small(&mut cart)?;
        add_small(&mut cart)?;
        cart.add(LineKey::new("2", "Capiz Shell Parol"), usd(4599), usd(1000))?;

        let summary = cart.summary()?;

        assert_eq!(summary.count, 3);
        assert_eq!(summary.subtotal, usd(2 * 2500 + 4599));
        assert_eq!(summary.shipping, usd(2 * 500 + 1000));
        assert_eq!(summary.total, usd(2 * 2500 + 4599 + 2 * 500 + 1000));

        Ok(())
    }

    #[test]
    fn add_and_increase_refuse_past_maximum_quantity() -> TestResult {
        let item = LineItem::with_quantity(
            LineKey::new("1", SMALL),
            usd(2500),
            usd(500),
            NonZeroU32::MAX,
        );
        let mut cart = Cart::with_items([item], USD)?;
        let before = cart.clone();

        assert_eq!(
            cart.increase("1", SMALL),
            Err(QuantityLimit(LineKey::new("1", SMALL)))
        );
        assert_eq!(
            add_small(&mut cart),
            Err(QuantityLimit(LineKey::new("1", SMALL)))
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn summary_reports_overflow() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add(LineKey::new("1", SMALL), usd(i64::MAX), usd(0))?;
        cart.add(LineKey::new("2", LARGE), usd(1), usd(0))?;

        assert_eq!(cart.summary(), Err(PriceError::Overflow));

        Ok(())
    }
}
