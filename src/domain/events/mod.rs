//! Domain events
use crate::domain::value_objects::{ProductId, Quantity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Product(ProductEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    LineAdded { product_id: ProductId },
    QuantityIncremented { product_id: ProductId, quantity: Quantity },
    LineRemoved { product_id: ProductId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductEvent {
    ReviewAdded { product_id: ProductId, review_count: usize },
}
