//! CLI subcommands.

pub mod cart;
pub mod featured;

use thiserror::Error;

use shopfront_storefront::{CartError, ConfigError};

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// No cart to act on.
    #[error("{0}")]
    Unavailable(&'static str),
}
