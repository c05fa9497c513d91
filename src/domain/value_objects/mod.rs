//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog identity of a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn inr(amount: Decimal) -> Self { Self::new(amount, "INR") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
    pub fn multiply(&self, qty: Quantity) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(Decimal::from(qty.value())).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
}

impl Default for Money { fn default() -> Self { Self::zero("INR") } }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum MoneyError { CurrencyMismatch, Overflow }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrencyMismatch => write!(f, "Currency mismatch"),
            Self::Overflow => write!(f, "Amount out of range"),
        }
    }
}

/// Quantity of one product held in the cart; never zero
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    pub fn new(value: u32) -> Option<Self> { (value > 0).then_some(Self(value)) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn increment(&self) -> Self { Self(self.0.saturating_add(1)) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Currency display in the `en-IN` locale: two fraction digits and lakh/crore
/// digit grouping (`₹1,00,000.00`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormatter { symbol: String }

impl CurrencyFormatter {
    pub fn en_in() -> Self { Self { symbol: "₹".to_string() } }

    pub fn format(&self, money: &Money) -> String {
        let rounded = money.amount().round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        format!("{sign}{}{}.{fraction}", self.symbol, group_indian(whole))
    }
}

impl Default for CurrencyFormatter { fn default() -> Self { Self::en_in() } }

/// Last three digits form one group, every two digits before that another.
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 { return whole.to_string(); }
    let (head, tail) = whole.split_at(whole.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
