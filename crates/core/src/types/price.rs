//! Monetary amounts as returned by the Shopify Storefront API.
//!
//! Shopify encodes amounts as decimal strings (`"19.99"`) next to an ISO 4217
//! currency code. The string is kept verbatim so display code never loses
//! precision; arithmetic goes through [`rust_decimal::Decimal`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency used for carts that do not exist remotely yet.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Errors produced when interpreting a [`Money`] amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid decimal amount '{0}'")]
    InvalidAmount(String),
    #[error("Currency mismatch: {0} vs {1}")]
    CurrencyMismatch(String, String),
}

/// A decimal-string amount with its currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency, formatted the way Shopify does (`"0.0"`).
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new("0.0", currency_code)
    }

    /// Build an amount from a decimal value.
    #[must_use]
    pub fn from_decimal(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self::new(amount.normalize().to_string(), currency_code)
    }

    /// Parse the amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` if the amount is not a decimal number.
    pub fn decimal(&self) -> Result<Decimal, MoneyError> {
        Decimal::from_str(self.amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(self.amount.clone()))
    }

    /// Whether the amount parses to zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.decimal().is_ok_and(|d| d.is_zero())
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns an error if either amount is unparseable or the currencies differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        if self.currency_code != other.currency_code {
            return Err(MoneyError::CurrencyMismatch(
                self.currency_code.clone(),
                other.currency_code.clone(),
            ));
        }
        Ok(Self::from_decimal(
            self.decimal()? + other.decimal()?,
            self.currency_code.clone(),
        ))
    }

    /// Multiply the amount by a quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is unparseable.
    pub fn times(&self, quantity: u32) -> Result<Self, MoneyError> {
        Ok(Self::from_decimal(
            self.decimal()? * Decimal::from(quantity),
            self.currency_code.clone(),
        ))
    }

    /// Format for display with two decimal places (e.g., `19.99 USD`).
    #[must_use]
    pub fn display(&self) -> String {
        self.decimal().map_or_else(
            |_| format!("{} {}", self.amount, self.currency_code),
            |d| format!("{} {}", d.round_dp(2), self.currency_code),
        )
    }
}
