//! Pricing

use std::num::NonZeroU32;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// A money amount in a supported ISO currency.
pub type Amount = Money<'static, Currency>;

/// Errors raised while parsing, validating or summing amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount could not be parsed as a decimal number.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Unit amounts must be zero or positive.
    #[error("amount must not be negative, got {0}")]
    Negative(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The amount is not expressed in the expected currency.
    #[error("expected currency {expected}, found {actual}")]
    CurrencyMismatch {
        /// Currency the cart is priced in.
        expected: &'static str,
        /// Currency of the offending amount.
        actual: &'static str,
    },

    /// Minor unit arithmetic left the range of `i64`.
    #[error("amount overflowed")]
    Overflow,
}

/// Resolve an ISO 4217 currency from its alphabetic code.
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] if the code is not an ISO currency.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PriceError> {
    let code = code.trim();

    iso::find(code).ok_or_else(|| PriceError::UnknownCurrency(code.to_string()))
}

/// Parse a bare amount such as `"25.00"`, as found on an add-to-cart control, into a
/// validated unit amount in `currency`.
///
/// # Errors
///
/// Returns [`PriceError::InvalidAmount`] when the text is not a decimal within the
/// currency's precision, and [`PriceError::Negative`] when it is below zero.
pub fn parse_amount(s: &str, currency: &'static Currency) -> Result<Amount, PriceError> {
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidAmount(s.to_string()))?;

    let amount = from_decimal(amount, currency)?;

    ensure_unit_amount(&amount, currency)?;

    Ok(amount)
}

/// Parse a price string with its currency (e.g. `"2.99 USD"`).
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, the currency is
/// not supported, or the amount is not a valid non-negative unit amount.
pub fn parse_price(s: &str) -> Result<Amount, PriceError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceError::InvalidAmount(s.to_string()));
    };

    parse_amount(amount, currency_from_code(code)?)
}

/// Convert a decimal amount in major units into money.
///
/// # Errors
///
/// Returns [`PriceError::InvalidAmount`] for precision finer than the currency's minor
/// unit and [`PriceError::Overflow`] when the amount does not fit in minor units.
pub fn from_decimal(amount: Decimal, currency: &'static Currency) -> Result<Amount, PriceError> {
    if amount.normalize().scale() > currency.exponent {
        return Err(PriceError::InvalidAmount(amount.to_string()));
    }

    let minor_per_major = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(PriceError::Overflow)?;

    let minor_units = amount
        .checked_mul(Decimal::from(minor_per_major))
        .and_then(|value| value.to_i64())
        .ok_or(PriceError::Overflow)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Express an amount as a decimal in major units, at the currency's precision
/// (e.g. `25.00`).
pub fn to_decimal(amount: &Amount) -> Decimal {
    Decimal::new(amount.to_minor_units(), amount.currency().exponent)
}

/// Check that an amount is usable as a per-unit price or shipping charge.
///
/// # Errors
///
/// Returns [`PriceError::CurrencyMismatch`] or [`PriceError::Negative`].
pub fn ensure_unit_amount(amount: &Amount, currency: &'static Currency) -> Result<(), PriceError> {
    let actual = amount.currency();

    if actual != currency {
        return Err(PriceError::CurrencyMismatch {
            expected: currency.iso_alpha_code,
            actual: actual.iso_alpha_code,
        });
    }

    if amount.to_minor_units() < 0 {
        return Err(PriceError::Negative(format_price(amount)));
    }

    Ok(())
}

/// Multiply a unit amount by a quantity.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the product leaves the minor unit range.
pub fn line_amount(unit: &Amount, quantity: NonZeroU32) -> Result<Amount, PriceError> {
    let minor_units = unit
        .to_minor_units()
        .checked_mul(i64::from(quantity.get()))
        .ok_or(PriceError::Overflow)?;

    Ok(Money::from_minor(minor_units, unit.currency()))
}

/// Sum a sequence of amounts, all of which must be in `currency`.
///
/// An empty sequence sums to zero.
///
/// # Errors
///
/// Returns [`PriceError::CurrencyMismatch`] or [`PriceError::Overflow`].
pub fn total<I>(amounts: I, currency: &'static Currency) -> Result<Amount, PriceError>
where
    I: IntoIterator<Item = Amount>,
{
    let minor_units = amounts.into_iter().try_fold(0_i64, |acc, amount| {
        let actual = amount.currency();

        if actual != currency {
            return Err(PriceError::CurrencyMismatch {
                expected: currency.iso_alpha_code,
                actual: actual.iso_alpha_code,
            });
        }

        acc.checked_add(amount.to_minor_units())
            .ok_or(PriceError::Overflow)
    })?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Format an amount for display, e.g. `$25.00`.
///
/// Uses the currency's symbol and precision without digit grouping, so `1234.56 USD`
/// shows as `$1234.56`.
pub fn format_price(amount: &Amount) -> String {
    let currency = amount.currency();
    let major_units = to_decimal(amount);

    let sign = if major_units.is_sign_negative() { "-" } else { "" };
    let digits = major_units.abs();

    if currency.symbol_first {
        format!("{sign}{}{digits}", currency.symbol)
    } else {
        format!("{sign}{digits} {}", currency.symbol)
    }
}
