//! Catalog Aggregate
//!
//! The fixed product list the widget is started with, plus the two read-only
//! views over it: sorted and category-filtered.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::domain::aggregates::product::{Product, ProductEntry};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{Money, ProductId};

const DEFAULT_CURRENCY: &str = "INR";

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_currency")]
    currency: String,
    products: Vec<ProductEntry>,
}

fn default_currency() -> String { DEFAULT_CURRENCY.to_string() }

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog entry {index} is invalid: {source}")]
    Invalid { index: usize, source: validator::ValidationErrors },

    #[error("Duplicate product id {0}")]
    DuplicateId(ProductId),
}

impl Catalog {
    pub fn new(products: Vec<Product>, currency: &str) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        if let Some(dup) = products.iter().find(|p| !seen.insert(p.id())) {
            return Err(CatalogError::DuplicateId(dup.id()));
        }
        Ok(Self { products, currency: currency.to_string() })
    }

    /// The seven-phone demo catalog.
    pub fn sample() -> Self {
        let phone = |id: u32, price: i64, image: &str| {
            Product::new(ProductId::new(id), format!("phone {id}"), Money::inr(Decimal::new(price, 0)), image, "phone")
        };
        Self {
            products: vec![
                phone(1, 3329, "321.jpg"),
                phone(2, 4949, "322.jpg"),
                phone(3, 5279, "r4.jpg"),
                phone(4, 6999, "r6.jpg"),
                phone(5, 7999, "r7.jpg"),
                phone(6, 8252, "r4.jpg"),
                phone(7, 5374, "322.jpg"),
            ],
            currency: default_currency(),
        }
    }

    /// Parses `{"currency": "INR", "products": [...]}`; every entry must validate.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut products = Vec::with_capacity(file.products.len());
        for (index, entry) in file.products.into_iter().enumerate() {
            entry.validate().map_err(|source| CatalogError::Invalid { index, source })?;
            products.push(Product::from_entry(entry, &file.currency));
        }
        Self::new(products, &file.currency)
    }

    pub fn currency(&self) -> &str { &self.currency }
    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
    pub fn get(&self, id: ProductId) -> Option<&Product> { self.products.iter().find(|p| p.id() == id) }
    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> { self.products.iter_mut().find(|p| p.id() == id) }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products.iter().map(Product::category).filter(|c| seen.insert(*c)).collect()
    }

    /// Full catalog in the requested order. Ties keep catalog order.
    pub fn sorted(&self, criteria: SortCriteria) -> Vec<&Product> {
        let mut list: Vec<&Product> = self.products.iter().collect();
        match criteria {
            SortCriteria::NameAsc => list.sort_by(|a, b| locale_cmp(a.name(), b.name())),
            SortCriteria::NameDesc => list.sort_by(|a, b| locale_cmp(b.name(), a.name())),
            SortCriteria::PriceAsc => list.sort_by(|a, b| a.price().amount().cmp(&b.price().amount())),
            SortCriteria::PriceDesc => list.sort_by(|a, b| b.price().amount().cmp(&a.price().amount())),
            SortCriteria::Catalog => {}
        }
        list
    }

    /// Catalog-ordered subset matching the filter.
    pub fn filtered(&self, filter: &CategoryFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p.category())).collect()
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        self.products.iter_mut().flat_map(Product::take_events).collect()
    }
}

thread_local! {
    static ROOT_COLLATOR: Option<Collator> = Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|e| tracing::warn!(error = %e, "root collation data unavailable, names sort by code point"))
        .ok();
}

/// Unicode root collation: base letters first, then accents, then case
/// (lowercase before uppercase). Collation ties fall back to code point order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR
        .with(|collator| collator.as_ref().map_or(Ordering::Equal, |c| c.compare(a, b)))
        .then_with(|| a.cmp(b))
}

/// Value of the sort selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortCriteria {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    #[default]
    Catalog,
}

impl SortCriteria {
    pub const OPTIONS: [SortCriteria; 5] = [Self::Catalog, Self::NameAsc, Self::NameDesc, Self::PriceAsc, Self::PriceDesc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Catalog => "default",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::PriceAsc => "Price (Low to High)",
            Self::PriceDesc => "Price (High to Low)",
            Self::Catalog => "Default",
        }
    }
}

impl FromStr for SortCriteria {
    type Err = std::convert::Infallible;
    /// Unknown values fall back to catalog order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name-asc" => Self::NameAsc,
            "name-desc" => Self::NameDesc,
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            _ => Self::Catalog,
        })
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Value of the category selector; `all` selects everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(String),
}

impl CategoryFilter {
    pub const ALL: &'static str = "all";

    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Category(c) => c == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == Self::ALL { Self::All } else { Self::Category(value.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&Product]) -> Vec<u32> { list.iter().map(|p| p.id().value()).collect() }

    #[test]
    fn test_sample_catalog() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.categories(), ["phone"]);
        assert_eq!(catalog.get(ProductId::new(6)).unwrap().image(), "r4.jpg");
    }

    #[test]
    fn test_price_sorts() {
        let catalog = Catalog::sample();
        let asc = catalog.sorted(SortCriteria::PriceAsc);
        assert!(asc.windows(2).all(|w| w[0].price().amount() <= w[1].price().amount()));
        let mut desc = ids(&catalog.sorted(SortCriteria::PriceDesc));
        desc.reverse();
        assert_eq!(ids(&asc), desc);
        let mut perm = ids(&asc);
        perm.sort_unstable();
        assert_eq!(perm, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ids(&asc), [1, 2, 3, 7, 4, 5, 6]);
    }

    #[test]
    fn test_sort_does_not_mutate_catalog() {
        let catalog = Catalog::sample();
        let _ = catalog.sorted(SortCriteria::NameDesc);
        assert_eq!(ids(&catalog.products().iter().collect::<Vec<_>>()), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_name_sorts() {
        let catalog = Catalog::sample();
        assert_eq!(ids(&catalog.sorted(SortCriteria::NameAsc)), [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ids(&catalog.sorted(SortCriteria::NameDesc)), [7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_unknown_sort_is_catalog_order() {
        let catalog = Catalog::sample();
        let criteria: SortCriteria = "rating-desc".parse().unwrap();
        assert_eq!(criteria, SortCriteria::Catalog);
        assert_eq!(ids(&catalog.sorted(criteria)), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Zebra", "apple"), Ordering::Greater);
        assert_eq!(locale_cmp("abc", "ABC"), Ordering::Less);
        assert_eq!(locale_cmp("phone 10", "phone 2"), Ordering::Less);
        assert_eq!(locale_cmp("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(locale_cmp("eclair", "Éclair"), Ordering::Less);
    }

    #[test]
    fn test_name_sort_places_accented_names_with_their_base_letter() {
        let json = r#"{"products": [
            {"id": 1, "name": "Zebra", "price": 1, "category": "x"},
            {"id": 2, "name": "Éclair", "price": 1, "category": "x"},
            {"id": 3, "name": "apple", "price": 1, "category": "x"},
            {"id": 4, "name": "eclair", "price": 1, "category": "x"},
            {"id": 5, "name": "Apple", "price": 1, "category": "x"}
        ]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        fn names<'a>(list: Vec<&'a Product>) -> Vec<&'a str> { list.into_iter().map(Product::name).collect() }
        assert_eq!(names(catalog.sorted(SortCriteria::NameAsc)), ["apple", "Apple", "eclair", "Éclair", "Zebra"]);
        assert_eq!(names(catalog.sorted(SortCriteria::NameDesc)), ["Zebra", "Éclair", "eclair", "Apple", "apple"]);
    }

    #[test]
    fn test_filter() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.filtered(&"phone".into()).len(), 7);
        assert_eq!(ids(&catalog.filtered(&"all".into())), ids(&catalog.sorted(SortCriteria::Catalog)));
        assert!(catalog.filtered(&"laptop".into()).is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"products": [
            {"id": 1, "name": "phone 1", "price": 3329.00, "image": "321.jpg", "category": "phone"},
            {"id": 2, "name": "case", "price": "199.50", "category": "accessory"}
        ]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.currency(), "INR");
        assert_eq!(catalog.categories(), ["phone", "accessory"]);
        assert_eq!(catalog.get(ProductId::new(2)).unwrap().price().amount(), Decimal::new(19950, 2));
    }

    #[test]
    fn test_from_json_rejects_bad_entries() {
        let dup = r#"{"products": [
            {"id": 1, "name": "a", "price": 1, "category": "x"},
            {"id": 1, "name": "b", "price": 2, "category": "x"}
        ]}"#;
        assert!(matches!(Catalog::from_json(dup), Err(CatalogError::DuplicateId(id)) if id.value() == 1));
        let negative = r#"{"products": [{"id": 1, "name": "a", "price": -5, "category": "x"}]}"#;
        assert!(matches!(Catalog::from_json(negative), Err(CatalogError::Invalid { index: 0, .. })));
        let huge = r#"{"products": [
            {"id": 1, "name": "a", "price": 1, "category": "x"},
            {"id": 2, "name": "b", "price": "79228162514264337593543950335", "category": "x"}
        ]}"#;
        assert!(matches!(Catalog::from_json(huge), Err(CatalogError::Invalid { index: 1, .. })));
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::Parse(_))));
    }
}
