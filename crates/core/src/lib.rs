//! Shopfront Core - Shared types library.
//!
//! This crate provides the value types shared by the Shopfront components:
//! - `storefront` - Storefront API client and cart synchronization
//! - `cli` - Command-line driver for cart and catalog operations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify IDs, money, and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
