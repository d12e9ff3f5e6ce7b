//! Checkout Example
//!
//! This example walks the storefront flow: restore the cart, pick an option on a product
//! page, add it, print the payment summary and place the order.
//!
//! Use `-p` to pick the product and `-o` to select one of its options
//! Use `-n` to specify the number of units to add
//! Set `CART_STORAGE_DIR` to keep the cart on disk between runs

use std::io;

use anyhow::Result;
use clap::Parser;
use parol_cart::{
    catalog::Catalog,
    checkout::{checkout, complete_order},
    notifications::{Notification, Notifier},
    observability::init_subscriber,
    pricing::format_price,
    storage::{CartStorage, FileStorage, MemoryStorage},
    store::CartStore,
    utils::ExampleCartArgs,
};

const STOREFRONT: &str = include_str!("../fixtures/catalog/myparol.yml");

/// Prints notifications the way the storefront toasts them
#[derive(Debug)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[expect(clippy::print_stdout, reason = "Example code")]
    fn notify(&self, notification: Notification) {
        println!("» {notification}");
    }
}

/// Checkout Example
pub fn main() -> Result<()> {
    let args = ExampleCartArgs::parse();

    init_subscriber(&args.logging)?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::from_yaml(STOREFRONT)?,
    };

    match args.cart.storage_dir.clone() {
        Some(dir) => {
            let store = CartStore::from_config(FileStorage::new(dir), ConsoleNotifier, &args.cart)?;
            run(&args, &catalog, store)
        }
        None => {
            let store = CartStore::from_config(MemoryStorage::new(), ConsoleNotifier, &args.cart)?;
            run(&args, &catalog, store)
        }
    }
}

#[expect(clippy::print_stdout, reason = "Example code")]
fn run<S: CartStorage>(
    args: &ExampleCartArgs,
    catalog: &Catalog,
    mut store: CartStore<S, ConsoleNotifier>,
) -> Result<()> {
    let outcome = store.load();
    println!("Cart: {outcome:?}");

    let mut selector = catalog.selector(&args.product)?;

    if let Some(option) = &args.option {
        selector.select(option)?;
    }

    let display = selector.display()?;
    println!(
        "\n{}\n{}\n{}\n{}",
        selector.product().name,
        display.price,
        display.shipping,
        display.total
    );

    for _ in 0..args.quantity {
        selector.add_to_cart().apply(&mut store)?;
    }

    let summary = store.summary();
    println!(
        "\n{} item(s), subtotal {}, shipping {}, total {}",
        summary.count,
        format_price(&summary.subtotal),
        format_price(&summary.shipping),
        format_price(&summary.total)
    );

    let payment = checkout(&store)?;
    payment.write_to(io::stdout())?;

    let confirmation = complete_order(&payment, &mut rand::thread_rng());
    println!(
        "\nThank you for your order! Reference: {} ({})",
        confirmation.reference(),
        format_price(&confirmation.total())
    );

    confirmation.acknowledge(&mut store);

    Ok(())
}
