//! Parol Cart
//!
//! Shopping cart state, variant pricing and mock checkout for the `MyParol` storefront.
//!
//! [`store::CartStore`] owns the cart, keeps its summary in step with every mutation and
//! persists it to a keyed storage slot. [`catalog::PricingSelector`] turns a product page's
//! option choice into add-to-cart parameters, and [`checkout`] builds the payment summary
//! and completes the order.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod items;
pub mod notifications;
pub mod observability;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod storage;
pub mod store;
pub mod utils;
