//! Storefront Widget
//!
//! Session-local storefront: a fixed product catalog rendered into a page
//! document, sorting and filtering, an in-memory cart and review/video prompts.
//! Payment is handed off to an external checkout page through URL parameters.
//!
//! ## Features
//! - Catalog rendering, sorting and category filtering
//! - Shopping cart with per-line remove and grand total
//! - Single-item and whole-cart checkout handoff
//! - Per-product reviews and demo video links

use thiserror::Error;

pub mod checkout;
pub mod config;
pub mod console;
pub mod domain;
pub mod page;
pub mod widget;

pub use config::{ConfigError, WidgetConfig};
pub use domain::aggregates::{Cart, CartLine, Catalog, CatalogError, CategoryFilter, Product, SortCriteria};
pub use domain::value_objects::{CurrencyFormatter, Money, MoneyError, ProductId, Quantity};
pub use page::Host;
pub use widget::{Boot, Storefront};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Cart total unavailable: {0}")]
    Money(#[from] MoneyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cart serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
