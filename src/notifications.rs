//! Notifications
//!
//! Short user-facing messages emitted after cart actions. Delivery is fire-and-forget:
//! the presentation side shows and dismisses them, nothing is acknowledged.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::mpsc::Sender,
};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A unit was added through the add-to-cart action.
    ItemAdded,

    /// A whole line was removed.
    ItemRemoved,

    /// Every line was removed.
    CartCleared,

    /// Checkout was attempted without any lines.
    EmptyCart,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification kind
    pub kind: NotificationKind,

    /// Display text
    pub message: String,
}

impl Notification {
    /// `"{name} added to cart!"`
    pub fn item_added(name: &str) -> Self {
        Self {
            kind: NotificationKind::ItemAdded,
            message: format!("{name} added to cart!"),
        }
    }

    /// `"{name} removed from cart!"`
    pub fn item_removed(name: &str) -> Self {
        Self {
            kind: NotificationKind::ItemRemoved,
            message: format!("{name} removed from cart!"),
        }
    }

    /// `"Cart cleared!"`
    pub fn cart_cleared() -> Self {
        Self {
            kind: NotificationKind::CartCleared,
            message: "Cart cleared!".to_string(),
        }
    }

    /// `"Your cart is empty!"`
    pub fn empty_cart() -> Self {
        Self {
            kind: NotificationKind::EmptyCart,
            message: "Your cart is empty!".to_string(),
        }
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.message)
    }
}

/// Receiver side of the notification channel.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Deliver a notification. Must not fail the caller.
    fn notify(&self, notification: Notification);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

impl Notifier for Sender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}
