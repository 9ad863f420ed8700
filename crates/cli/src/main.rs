//! Shopfront CLI - drive a shopper's cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart (no request if no cart exists yet)
//! shopfront cart show
//!
//! # Add two units of a variant, creating the cart if needed
//! shopfront cart add gid://shopify/ProductVariant/123 -q 2
//!
//! # Step a line down by one (removes it at quantity one)
//! shopfront cart adjust gid://shopify/ProductVariant/123 minus
//!
//! # Print the hosted checkout URL
//! shopfront cart checkout
//!
//! # Resolve the homepage grid products
//! shopfront featured grid
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE`, `SHOPIFY_STOREFRONT_PUBLIC_TOKEN` - Storefront API access
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SENTRY_DSN` - Report warnings and errors to Sentry (optional)
//! - `RUST_LOG` - Log filter (default: `shopfront=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Cart ID file used when `--store-file` is not given.
const DEFAULT_STORE_FILE: &str = ".shopfront/cart-id";

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront cart and catalog tools")]
struct Cli {
    /// File holding this shopper's cart ID
    #[arg(long, global = true, default_value = DEFAULT_STORE_FILE)]
    store_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Resolve homepage product slots
    Featured {
        #[arg(value_enum)]
        slot: FeaturedSlot,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Create a new cart, replacing the stored one
    Create,
    /// Add a variant to the cart
    Add {
        /// Product variant ID
        variant: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set the quantity of a line
    Update {
        /// Cart line ID
        line: String,

        /// New quantity (at least 1)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove lines from the cart
    Remove {
        /// Cart line IDs
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Step the line holding a variant up, down, or out
    Adjust {
        /// Product variant ID
        variant: String,

        #[arg(value_enum)]
        direction: Direction,
    },
    /// Print the hosted checkout URL
    Checkout,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Plus,
    Minus,
    Delete,
}

#[derive(Clone, Copy, ValueEnum)]
enum FeaturedSlot {
    /// Three-item homepage grid
    Grid,
    /// Homepage carousel
    Carousel,
}

/// Initialize Sentry when `SENTRY_DSN` is set.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry events/breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // Flush Sentry before exit() skips destructors
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let session = commands::cart::open_session(&cli.store_file);

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session).await?,
            CartAction::Create => commands::cart::create(&session).await?,
            CartAction::Add { variant, quantity } => {
                commands::cart::add(&session, &variant, quantity).await?;
            }
            CartAction::Update { line, quantity } => {
                commands::cart::update(&session, &line, quantity).await?;
            }
            CartAction::Remove { lines } => commands::cart::remove(&session, &lines).await?,
            CartAction::Adjust { variant, direction } => {
                let adjustment = match direction {
                    Direction::Plus => shopfront_storefront::Adjustment::Increment,
                    Direction::Minus => shopfront_storefront::Adjustment::Decrement,
                    Direction::Delete => shopfront_storefront::Adjustment::Remove,
                };
                commands::cart::adjust(&session, &variant, adjustment).await?;
            }
            CartAction::Checkout => commands::cart::checkout(&session).await?,
        },
        Commands::Featured { slot } => {
            let chain = match slot {
                FeaturedSlot::Grid => shopfront_storefront::FallbackChain::homepage_grid(),
                FeaturedSlot::Carousel => shopfront_storefront::FallbackChain::homepage_carousel(),
            };
            commands::featured::show(session.client(), &chain).await?;
        }
    }
    Ok(())
}
