//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{Money, ProductId};
use crate::domain::events::{DomainEvent, ProductEvent};

/// A catalog product. Everything but the review list is fixed at startup.
#[derive(Clone, Debug, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    #[serde(serialize_with = "price_as_number")]
    price: Money,
    image: String,
    category: String,
    reviews: Vec<String>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Catalog file entry, validated before it becomes a [`Product`].
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProductEntry {
    #[validate(range(min = 1))]
    pub id: u32,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom = "price_in_range")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[validate(length(min = 1))]
    pub category: String,
}

/// Upper bound on a catalog price, in whole currency units (one lakh crore).
pub const MAX_PRICE_UNITS: i64 = 1_000_000_000_000;

fn price_in_range(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() { return Err(ValidationError::new("negative_price")); }
    if *price > Decimal::from(MAX_PRICE_UNITS) { return Err(ValidationError::new("price_too_large")); }
    Ok(())
}

fn price_as_number<S: Serializer>(price: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    rust_decimal::serde::float::serialize(&price.amount(), serializer)
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, image: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id, name: name.into(), price, image: image.into(), category: category.into(),
            reviews: vec![], events: vec![],
        }
    }

    pub fn from_entry(entry: ProductEntry, currency: &str) -> Self {
        Self::new(ProductId::new(entry.id), entry.name, Money::new(entry.price, currency), entry.image, entry.category)
    }

    pub fn id(&self) -> ProductId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> &Money { &self.price }
    pub fn image(&self) -> &str { &self.image }
    pub fn category(&self) -> &str { &self.category }
    pub fn reviews(&self) -> &[String] { &self.reviews }

    /// Appends a review; reviews are never edited or removed.
    pub fn add_review(&mut self, review: impl Into<String>) {
        self.reviews.push(review.into());
        self.raise_event(DomainEvent::Product(ProductEvent::ReviewAdded { product_id: self.id, review_count: self.reviews.len() }));
    }

    /// Text shown by the review summary dialog.
    pub fn review_summary(&self) -> String {
        self.reviews.iter().fold(String::from("Reviews:\n"), |mut acc, r| {
            acc.push('\n');
            acc.push_str(r);
            acc.push('\n');
            acc
        })
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
