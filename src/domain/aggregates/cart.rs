//! Cart Aggregate

use serde::Serialize;
use crate::domain::aggregates::{Catalog, Product};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, MoneyError, ProductId, Quantity};

/// Session-local cart. Lines keep the order in which each product was first added.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    events: Vec<DomainEvent>,
}

/// A catalog product reference plus how many of it are in the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// A cart line resolved against the catalog.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PricedLine<'a> {
    pub product: &'a Product,
    pub quantity: Quantity,
}

impl PricedLine<'_> {
    pub fn line_total(&self) -> Result<Money, MoneyError> { self.product.price().multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> { self.lines.iter().find(|l| l.product_id == product_id) }
    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Adds one unit: bumps the existing line for this product or appends a new one.
    pub fn add(&mut self, product_id: ProductId) -> Quantity {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            existing.quantity = existing.quantity.increment();
            let quantity = existing.quantity;
            self.raise_event(DomainEvent::Cart(CartEvent::QuantityIncremented { product_id, quantity }));
            return quantity;
        }
        self.lines.push(CartLine { product_id, quantity: Quantity::ONE });
        self.raise_event(DomainEvent::Cart(CartEvent::LineAdded { product_id }));
        Quantity::ONE
    }

    /// Drops the whole line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else { return false };
        self.lines.remove(index);
        self.raise_event(DomainEvent::Cart(CartEvent::LineRemoved { product_id }));
        true
    }

    /// Lines joined with their catalog products; ids missing from the catalog are skipped.
    pub fn priced<'a>(&self, catalog: &'a Catalog) -> Vec<PricedLine<'a>> {
        self.lines
            .iter()
            .filter_map(|l| catalog.get(l.product_id).map(|product| PricedLine { product, quantity: l.quantity }))
            .collect()
    }

    /// Grand total, summed fresh from the lines on every call.
    pub fn total(&self, catalog: &Catalog) -> Result<Money, MoneyError> {
        self.priced(catalog).iter().try_fold(Money::zero(catalog.currency()), |acc, l| acc.add(&l.line_total()?))
    }

    /// JSON array of `{product, quantity}` records handed to checkout.
    pub fn to_json(&self, catalog: &Catalog) -> Result<String, serde_json::Error> { serde_json::to_string(&self.priced(catalog)) }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
