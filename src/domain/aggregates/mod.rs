//! Aggregates module
pub mod product;
pub mod catalog;
pub mod cart;

pub use product::{Product, ProductEntry};
pub use catalog::{Catalog, CatalogError, CategoryFilter, SortCriteria};
pub use cart::{Cart, CartLine, PricedLine};
