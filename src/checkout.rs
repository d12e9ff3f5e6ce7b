//! Checkout
//!
//! Builds the payment summary shown before an order is placed and completes the (mock)
//! order. Completion draws a cosmetic reference number; nothing is charged, reserved or
//! recorded, and the reference is not guaranteed unique.

use std::io;

use rand::Rng;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    notifications::{Notification, Notifier},
    pricing::{Amount, PriceError, format_price},
    storage::CartStorage,
    store::CartStore,
};

/// Prefix of every order reference.
pub const ORDER_REFERENCE_PREFIX: &str = "MYPAROL-";

/// Order references are drawn from `0..ORDER_REFERENCE_RANGE`.
pub const ORDER_REFERENCE_RANGE: u32 = 10_000;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was attempted with no lines in the cart.
    #[error("Your cart is empty!")]
    EmptyCart,

    /// A line total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PriceError),

    /// The summary could not be written.
    #[error("failed to write payment summary: {0}")]
    Io(#[from] io::Error),
}

/// One row of the payment summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLine {
    /// `"{name} (x{quantity})"`
    pub description: String,

    /// Unit price times quantity
    pub amount: Amount,
}

/// What the customer is about to pay.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    lines: Vec<PaymentLine>,
    subtotal: Amount,
    shipping: Amount,
    total: Amount,
}

impl PaymentSummary {
    /// Rows, one per cart line, in cart order.
    pub fn lines(&self) -> &[PaymentLine] {
        &self.lines
    }

    /// Sum of the line amounts.
    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }

    /// Shipping for all units.
    pub fn shipping(&self) -> Amount {
        self.shipping
    }

    /// Amount due.
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Render the summary as a table.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Io`] if `out` cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), CheckoutError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Amount"]);

        for line in &self.lines {
            builder.push_record([line.description.clone(), format_price(&line.amount)]);
        }

        builder.push_record(["Subtotal".to_string(), format_price(&self.subtotal)]);
        builder.push_record(["Shipping".to_string(), format_price(&self.shipping)]);
        builder.push_record(["Total".to_string(), format_price(&self.total)]);

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);
        theme.insert_horizontal_line(self.lines.len() + 1, separator);

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Rows::last(), Color::BOLD);
        table.modify(Columns::new(1..2), Alignment::right());

        writeln!(out, "{table}")?;

        Ok(())
    }
}

/// Build the payment summary for the current cart.
///
/// An empty cart sends the empty-cart notification and is refused.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] if the cart has no lines, or
/// [`CheckoutError::Pricing`] if a line total is out of range.
pub fn checkout<S, N>(store: &CartStore<S, N>) -> Result<PaymentSummary, CheckoutError>
where
    S: CartStorage,
    N: Notifier,
{
    if store.is_empty() {
        warn!("checkout attempted with an empty cart");
        store.notify(Notification::empty_cart());

        return Err(CheckoutError::EmptyCart);
    }

    let lines = store
        .items()
        .iter()
        .map(|item| {
            Ok(PaymentLine {
                description: format!("{} (x{})", item.name(), item.quantity()),
                amount: item.line_price()?,
            })
        })
        .collect::<Result<Vec<_>, PriceError>>()?;

    let summary = store.summary();

    Ok(PaymentSummary {
        lines,
        subtotal: summary.subtotal,
        shipping: summary.shipping,
        total: summary.total,
    })
}

/// A placed (mock) order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    reference: String,
    total: Amount,
}

impl OrderConfirmation {
    /// Order reference, e.g. `MYPAROL-4821`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Amount the order was placed for.
    pub fn total(&self) -> Amount {
        self.total
    }

    /// The customer has seen the confirmation: empty the cart.
    pub fn acknowledge<S, N>(self, store: &mut CartStore<S, N>)
    where
        S: CartStorage,
        N: Notifier,
    {
        info!(reference = %self.reference, "order acknowledged");

        store.clear();
    }
}

/// Place the order described by `summary`.
pub fn complete_order<R>(summary: &PaymentSummary, rng: &mut R) -> OrderConfirmation
where
    R: Rng,
{
    let number = rng.gen_range(0..ORDER_REFERENCE_RANGE);
    let reference = format!("{ORDER_REFERENCE_PREFIX}{number}");

    info!(%reference, total = %format_price(&summary.total), "order placed");

    OrderConfirmation {
        reference,
        total: summary.total,
    }
}
