//! Cart store.
//!
//! [`CartStore`] owns the cart and is the only way to change it. Every mutation folds a
//! fresh summary over the resulting lines before it is accepted, writes the lines to the
//! storage slot, and then tells the notifier. A failed write is logged and does not undo
//! the mutation: what the user sees stays correct even when persistence is not.

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{Span, debug, error, info, warn};

use crate::{
    cart::{Cart, CartSummary, QuantityLimit},
    config::CartConfig,
    items::LineItem,
    notifications::{Notification, Notifier},
    persistence::{PersistError, decode, encode},
    pricing::{Amount, PriceError, ensure_unit_amount},
    products::{LineKey, ProductId},
    storage::{CartStorage, StorageError},
};

/// Errors returned by cart mutations. The cart is unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Price or shipping passed to an add is negative or in the wrong currency.
    #[error("invalid item parameters for {key}: {source}")]
    InvalidItemParameters {
        /// Line the add was aimed at.
        key: LineKey,
        /// What was wrong with the amounts.
        #[source]
        source: PriceError,
    },

    /// The line already holds the largest quantity it can carry.
    #[error(transparent)]
    QuantityLimit(#[from] QuantityLimit),

    /// The resulting totals would not fit in minor units.
    #[error("cart totals out of range: {0}")]
    Pricing(#[source] PriceError),
}

/// Errors writing the cart to storage.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The cart could not be serialized.
    #[error(transparent)]
    Encode(#[from] PersistError),

    /// The storage backend refused the write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What [`CartStore::load`] found in the storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored; the cart stays empty.
    Missing,

    /// The stored cart replaced the current one.
    Restored {
        /// Number of lines restored.
        lines: usize,
    },

    /// The slot could not be read or held malformed data; the cart was reset to empty.
    Discarded,
}

/// Sole owner of cart state.
#[derive(Debug)]
pub struct CartStore<S, N> {
    cart: Cart,
    summary: CartSummary,
    storage: S,
    notifier: N,
    storage_key: String,
}

impl<S: CartStorage, N: Notifier> CartStore<S, N> {
    /// Create a store with an empty cart. Nothing is read from storage until
    /// [`load`](Self::load) is called.
    pub fn new(
        storage: S,
        notifier: N,
        currency: &'static Currency,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            cart: Cart::new(currency),
            summary: CartSummary::empty(currency),
            storage,
            notifier,
            storage_key: storage_key.into(),
        }
    }

    /// Create a store using the key and currency from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::UnknownCurrency`] if the configured currency is unsupported.
    pub fn from_config(storage: S, notifier: N, config: &CartConfig) -> Result<Self, PriceError> {
        Ok(Self::new(
            storage,
            notifier,
            config.currency()?,
            config.storage_key.clone(),
        ))
    }

    /// Add one unit of a product, merging into the line with the same id and name.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidItemParameters`] if either amount is negative or not in
    /// the cart currency, [`CartError::QuantityLimit`] if the matching line cannot take
    /// another unit, and [`CartError::Pricing`] if the totals would overflow.
    #[tracing::instrument(
        skip_all,
        fields(id = tracing::field::Empty, name = tracing::field::Empty)
    )]
    pub fn add_item(
        &mut self,
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Amount,
        unit_shipping: Amount,
    ) -> Result<(), CartError> {
        let key = LineKey::new(id, name);

        let span = Span::current();
        span.record("id", tracing::field::display(key.id()));
        span.record("name", key.name());

        let currency = self.cart.currency();

        ensure_unit_amount(&unit_price, currency)
            .and_then(|()| ensure_unit_amount(&unit_shipping, currency))
            .map_err(|source| {
                warn!(error = %source, "rejected add with invalid pricing");

                CartError::InvalidItemParameters {
                    key: key.clone(),
                    source,
                }
            })?;

        let mut next = self.cart.clone();
        let appended = next
            .add(key.clone(), unit_price, unit_shipping)
            .map_err(reject_at_limit)?;

        self.commit(next)?;

        debug!(appended, count = self.summary.count, "added item");

        self.notifier.notify(Notification::item_added(key.name()));

        Ok(())
    }

    /// Add one unit to an existing line. Returns `false`, changing nothing, when no line
    /// has this id and name.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityLimit`] if the line cannot take another unit, and
    /// [`CartError::Pricing`] if the totals would overflow.
    #[tracing::instrument(skip(self))]
    pub fn increase_quantity(&mut self, id: &str, name: &str) -> Result<bool, CartError> {
        let mut next = self.cart.clone();

        if !next.increase(id, name).map_err(reject_at_limit)? {
            debug!("no matching line");
            return Ok(false);
        }

        self.commit(next)?;

        Ok(true)
    }

    /// Take one unit off an existing line; the line goes when its last unit does.
    /// Returns `false`, changing nothing, when no line has this id and name.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the totals cannot be recomputed.
    #[tracing::instrument(skip(self))]
    pub fn decrease_quantity(&mut self, id: &str, name: &str) -> Result<bool, CartError> {
        let mut next = self.cart.clone();

        if !next.decrease(id, name) {
            debug!("no matching line");
            return Ok(false);
        }

        self.commit(next)?;

        Ok(true)
    }

    /// Remove a whole line. Returns `false`, changing nothing and sending no
    /// notification, when no line has this id and name.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the totals cannot be recomputed.
    #[tracing::instrument(skip(self))]
    pub fn remove_item(&mut self, id: &str, name: &str) -> Result<bool, CartError> {
        let mut next = self.cart.clone();

        let Some(removed) = next.remove(id, name) else {
            debug!("no matching line");
            return Ok(false);
        };

        self.commit(next)?;

        self.notifier
            .notify(Notification::item_removed(removed.name()));

        Ok(true)
    }

    /// Remove every line.
    #[tracing::instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cart.clear();
        self.summary = CartSummary::empty(self.cart.currency());

        self.persist();

        self.notifier.notify(Notification::cart_cleared());
    }

    /// Current count and totals.
    pub fn summary(&self) -> CartSummary {
        self.summary
    }

    /// Current lines, in the order they were first added.
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// The cart itself, read-only.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.cart.currency()
    }

    /// Key of the storage slot.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Hydrate from the storage slot, replacing the current cart wholesale.
    ///
    /// Never fails: unreadable or malformed data is logged and leaves an empty cart.
    #[tracing::instrument(skip(self), fields(key = %self.storage_key))]
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.storage.read(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted cart");
                return LoadOutcome::Missing;
            }
            Err(error) => {
                error!(%error, "failed to read persisted cart, starting empty");
                self.reset();
                return LoadOutcome::Discarded;
            }
        };

        let restored = decode(&raw, self.cart.currency()).and_then(|cart| {
            let summary = cart.summary().map_err(PersistError::from)?;
            Ok((cart, summary))
        });

        match restored {
            Ok((cart, summary)) => {
                let lines = cart.len();

                self.cart = cart;
                self.summary = summary;

                info!(lines, count = summary.count, "restored persisted cart");

                LoadOutcome::Restored { lines }
            }
            Err(error) => {
                warn!(%error, "discarding malformed persisted cart");
                self.reset();

                LoadOutcome::Discarded
            }
        }
    }

    /// Write the current lines to the storage slot.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveError`] if serialization or the storage write fails.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let encoded = encode(&self.cart)?;

        self.storage.write(&self.storage_key, &encoded)?;

        Ok(())
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        let summary = next.summary().map_err(|error| {
            warn!(%error, "rejected mutation, totals out of range");
            CartError::Pricing(error)
        })?;

        self.cart = next;
        self.summary = summary;

        self.persist();

        Ok(())
    }

    fn persist(&mut self) {
        if let Err(error) = self.save() {
            error!(%error, key = %self.storage_key, "failed to persist cart");
        }
    }

    fn reset(&mut self) {
        self.cart = Cart::new(self.cart.currency());
        self.summary = CartSummary::empty(self.cart.currency());
    }
}

fn reject_at_limit(limit: QuantityLimit) -> CartError {
    warn!(error = %limit, "rejected mutation, quantity at limit");

    CartError::QuantityLimit(limit)
}

#[cfg(test)]
mod tests {
    use std::io;

    use mockall::predicate::eq;
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::{
        notifications::{MockNotifier, NoopNotifier, NotificationKind},
        storage::{MemoryStorage, MockCartStorage},
    };

    use super::*;

    const KEY: &str = "myparol_cart";
    const SMALL: &str = "Bamboo Parol Kit (Small)";

    fn usd(minor: i64) -> Amount {
        Money::from_minor(minor, USD)
    }

    fn memory_store() -> CartStore<MemoryStorage, NoopNotifier> {
        CartStore::new(MemoryStorage::new(), NoopNotifier, USD, KEY)
    }

    #[test]
    fn add_item_notifies_with_name() -> TestResult {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq(Notification::item_added(SMALL)))
            .times(2)
            .return_const(());

        let mut store = CartStore::new(MemoryStorage::new(), notifier, USD, KEY);

        store.add_item("1", SMALL, usd(2500), usd(500))?;
        store.add_item("1", SMALL, usd(2500), usd(500))?;

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.summary().total, usd(6000));

        Ok(())
    }

    #[test]
    fn add_item_rejects_negative_price_without_side_effects() {
        let mut storage = MockCartStorage::new();
        storage.expect_write().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut store = CartStore::new(storage, notifier, USD, KEY);

        let result = store.add_item("1", SMALL, usd(-2500), usd(500));

        assert!(matches!(
            result,
            Err(CartError::InvalidItemParameters {
                source: PriceError::Negative(_),
                ..
            })
        ));
        assert!(store.is_empty());
        assert_eq!(store.summary(), CartSummary::empty(USD));
    }

    #[test]
    fn add_item_rejects_foreign_currency() {
        let mut store = memory_store();

        let result = store.add_item("1", SMALL, usd(2500), Money::from_minor(500, GBP));

        assert_eq!(
            result,
            Err(CartError::InvalidItemParameters {
                key: LineKey::new("1", SMALL),
                source: PriceError::CurrencyMismatch {
                    expected: "USD",
                    actual: "GBP",
                },
            })
        );
    }

    #[test]
    fn add_item_rejects_overflowing_totals() -> TestResult {
        let mut store = memory_store();

        store.add_item("1", SMALL, usd(i64::MAX), usd(0))?;
        let before = store.cart().clone();

        let result = store.add_item("2", "Capiz Shell Parol", usd(1), usd(0));

        assert_eq!(result, Err(CartError::Pricing(PriceError::Overflow)));
        assert_eq!(store.cart(), &before);

        Ok(())
    }

    #[test]
    fn quantity_limit_rejects_without_side_effects() -> TestResult {
        let stored = r#"{"version":1,"currency":"USD","items":[{"id":"1","name":"Bamboo Parol Kit (Small)","price":"25.00","shipping":"5.00","quantity":4294967295}]}"#;

        let mut storage = MockCartStorage::new();
        storage
            .expect_read()
            .returning(move |_| Ok(Some(stored.to_string())));
        storage.expect_write().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut store = CartStore::new(storage, notifier, USD, KEY);
        assert_eq!(store.load(), LoadOutcome::Restored { lines: 1 });
        let before = store.summary();

        assert_eq!(
            store.increase_quantity("1", SMALL),
            Err(CartError::QuantityLimit(QuantityLimit(LineKey::new("1", SMALL))))
        );
        assert!(matches!(
            store.add_item("1", SMALL, usd(2500), usd(500)),
            Err(CartError::QuantityLimit(_))
        ));
        assert_eq!(store.summary(), before);
        assert_eq!(store.summary().count, u64::from(u32::MAX));

        Ok(())
    }

    #[test]
    fn every_mutation_writes_the_slot() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage
            .expect_write()
            .withf(|key, _| key == KEY)
            .times(5)
            .returning(|_, _| Ok(()));

        let mut store = CartStore::new(storage, NoopNotifier, USD, KEY);

        store.add_item("1", SMALL, usd(2500), usd(500))?;
        store.increase_quantity("1", SMALL)?;
        store.decrease_quantity("1", SMALL)?;
        store.remove_item("1", SMALL)?;
        store.clear();

        Ok(())
    }

    #[test]
    fn no_op_mutations_do_not_write_or_notify() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage.expect_write().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut store = CartStore::new(storage, notifier, USD, KEY);

        assert!(!store.increase_quantity("1", SMALL)?);
        assert!(!store.decrease_quantity("1", SMALL)?);
        assert!(!store.remove_item("1", SMALL)?);

        Ok(())
    }

    #[test]
    fn failed_save_keeps_the_mutation() -> TestResult {
        let mut storage = MockCartStorage::new();
        storage.expect_write().returning(|key, _| {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::other("quota exceeded"),
            })
        });

        let mut store = CartStore::new(storage, NoopNotifier, USD, KEY);

        store.add_item("1", SMALL, usd(2500), usd(500))?;

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.summary().total, usd(3000));
        assert!(matches!(store.save(), Err(SaveError::Storage(_))));

        Ok(())
    }

    #[test]
    fn remove_item_notifies_with_removed_name() -> TestResult {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|notification| notification.kind == NotificationKind::ItemAdded)
            .return_const(());
        notifier
            .expect_notify()
            .with(eq(Notification::item_removed(SMALL)))
            .times(1)
            .return_const(());

        let mut store = CartStore::new(MemoryStorage::new(), notifier, USD, KEY);

        store.add_item("1", SMALL, usd(2500), usd(500))?;

        assert!(store.remove_item("1", SMALL)?);
        assert!(store.is_empty());

        Ok(())
    }

    #[test]
    fn clear_notifies_even_when_empty() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq(Notification::cart_cleared()))
            .times(2)
            .return_const(());

        let mut store = CartStore::new(MemoryStorage::new(), notifier, USD, KEY);

        store.clear();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.summary(), CartSummary::empty(USD));
    }

    #[test]
    fn load_without_stored_value_is_missing() {
        let mut store = memory_store();

        assert_eq!(store.load(), LoadOutcome::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn load_replaces_cart_wholesale() -> TestResult {
        let mut source = memory_store();
        source.add_item("2", "Capiz Shell Parol", usd(8999), usd(1500))?;
        let persisted = source.storage().read(KEY)?;

        let mut storage = MockCartStorage::new();
        storage.expect_write().returning(|_, _| Ok(()));
        storage
            .expect_read()
            .returning(move |_| Ok(persisted.clone()));

        let mut store = CartStore::new(storage, NoopNotifier, USD, KEY);
        store.add_item("1", SMALL, usd(2500), usd(500))?;

        assert_eq!(store.load(), LoadOutcome::Restored { lines: 1 });
        assert!(store.cart().get("1", SMALL).is_none());
        assert_eq!(store.summary().total, usd(10499));

        Ok(())
    }

    #[test]
    fn load_discards_malformed_data() {
        let storage = MemoryStorage::with_value(KEY, "{\"version\":1,\"items\":");
        let mut store = CartStore::new(storage, NoopNotifier, USD, KEY);

        assert_eq!(store.load(), LoadOutcome::Discarded);
        assert!(store.is_empty());
        assert_eq!(store.summary(), CartSummary::empty(USD));
    }

    #[test]
    fn load_discards_on_read_failure() {
        let mut storage = MockCartStorage::new();
        storage.expect_read().withf(|key| key == KEY).returning(|key| {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::other("denied"),
            })
        });

        let mut store = CartStore::new(storage, NoopNotifier, USD, KEY);

        assert_eq!(store.load(), LoadOutcome::Discarded);
        assert!(store.is_empty());
    }

    #[test]
    fn from_config_uses_key_and_currency() -> TestResult {
        let config = CartConfig {
            storage_key: "alt_cart".to_string(),
            currency: "GBP".to_string(),
            storage_dir: None,
        };

        let mut store = CartStore::from_config(MemoryStorage::new(), NoopNotifier, &config)?;
        store.add_item("1", SMALL, Money::from_minor(2500, GBP), Money::from_minor(0, GBP))?;

        assert_eq!(store.storage_key(), "alt_cart");
        assert_eq!(store.currency(), GBP);
        assert!(store.storage().read("alt_cart")?.is_some());

        Ok(())
    }
}
