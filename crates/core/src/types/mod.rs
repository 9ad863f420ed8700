//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::*;
pub use price::{DEFAULT_CURRENCY, Money, MoneyError};
pub use quantity::{Quantity, QuantityError};
