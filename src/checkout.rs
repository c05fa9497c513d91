//! Checkout handoff URLs.
//!
//! Payment happens on an external page; the widget only builds the link that
//! carries the purchase intent there.

use crate::domain::aggregates::{Cart, Catalog, Product};

#[derive(Debug, Clone)]
pub struct CheckoutLinks {
    payment_url: String,
}

impl CheckoutLinks {
    pub fn new(payment_url: impl Into<String>) -> Self { Self { payment_url: payment_url.into() } }

    fn separator(&self) -> char { if self.payment_url.contains('?') { '&' } else { '?' } }

    /// Single product. The name goes into the query as-is, unescaped.
    pub fn single(&self, product: &Product) -> String {
        format!(
            "{}{}productId={}&productName={}&productPrice={}",
            self.payment_url,
            self.separator(),
            product.id(),
            product.name(),
            product.price().amount().normalize()
        )
    }

    /// Whole cart as one URL-encoded JSON parameter.
    pub fn cart(&self, cart: &Cart, catalog: &Catalog) -> Result<String, serde_json::Error> {
        let json = cart.to_json(catalog)?;
        Ok(format!("{}{}cart={}", self.payment_url, self.separator(), urlencoding::encode(&json)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ProductId;

    #[test]
    fn test_single_product_link() {
        let catalog = Catalog::sample();
        let links = CheckoutLinks::new("payment.html");
        let url = links.single(catalog.get(ProductId::new(1)).unwrap());
        assert_eq!(url, "payment.html?productId=1&productName=phone 1&productPrice=3329");
    }

    #[test]
    fn test_cart_link_round_trips() {
        let catalog = Catalog::sample();
        let mut cart = Cart::new();
        cart.add(ProductId::new(2));
        cart.add(ProductId::new(2));
        let url = CheckoutLinks::new("payment.html").cart(&cart, &catalog).unwrap();
        let encoded = url.strip_prefix("payment.html?cart=").unwrap();
        assert!(!encoded.contains('"') && !encoded.contains(' '));
        let json: serde_json::Value = serde_json::from_str(&urlencoding::decode(encoded).unwrap()).unwrap();
        assert_eq!(json[0]["product"]["id"], serde_json::json!(2));
        assert_eq!(json[0]["quantity"], serde_json::json!(2));
    }

    #[test]
    fn test_existing_query_string() {
        let catalog = Catalog::sample();
        let links = CheckoutLinks::new("https://pay.example/checkout?store=7");
        assert!(links.single(catalog.get(ProductId::new(4)).unwrap()).starts_with("https://pay.example/checkout?store=7&productId=4&"));
    }
}
