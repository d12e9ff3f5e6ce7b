//! Parol Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartBuildError, CartSummary, QuantityLimit},
    catalog::{
        AddToCart, Catalog, CatalogError, CatalogProduct, PriceDisplay, PricingSelector,
        SelectorError, Variant,
    },
    checkout::{
        CheckoutError, OrderConfirmation, PaymentLine, PaymentSummary, checkout, complete_order,
    },
    config::{CartConfig, LogFormat, LoggingConfig},
    items::LineItem,
    notifications::{NoopNotifier, Notification, NotificationKind, Notifier},
    persistence::PersistError,
    pricing::{Amount, PriceError, format_price, parse_price},
    products::{LineKey, ProductId},
    storage::{CartStorage, FileStorage, MemoryStorage, StorageError},
    store::{CartError, CartStore, LoadOutcome, SaveError},
};
