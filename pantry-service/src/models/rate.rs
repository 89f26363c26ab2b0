//! Item rate table: item name → unit price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RATE_ITEM_HEADER: &str = "Item";
pub const RATE_HEADER: &str = "Rate";

/// Physical column order of the rates sheet.
pub const RATE_HEADERS: [&str; 2] = [RATE_ITEM_HEADER, RATE_HEADER];

/// Largest accepted unit rate.
pub const MAX_RATE: i64 = 1_000_000;

/// One priced item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRate {
    pub item: String,
    pub rate: Decimal,
}

/// Ordered item → rate lookup.
///
/// Key order is first-insertion order and defines the bill's item columns.
/// Re-inserting an existing key replaces its rate in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: Vec<ItemRate>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace (last write wins). Keys are trimmed.
    pub fn insert(&mut self, item: &str, rate: Decimal) {
        let item = item.trim();
        match self.rates.iter_mut().find(|r| r.item == item) {
            Some(existing) => existing.rate = rate,
            None => self.rates.push(ItemRate {
                item: item.to_string(),
                rate,
            }),
        }
    }

    /// Rate for an exact item name, if priced.
    pub fn get(&self, item: &str) -> Option<Decimal> {
        self.rates.iter().find(|r| r.item == item).map(|r| r.rate)
    }

    /// Rate for an item, zero when the item has no rate.
    pub fn rate_or_zero(&self, item: &str) -> Decimal {
        self.get(item).unwrap_or(Decimal::ZERO)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.rates.iter().any(|r| r.item == item)
    }

    /// Item names in column order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.rates.iter().map(|r| r.item.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRate> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Decimal)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (S, Decimal)>>(iter: T) -> Self {
        let mut table = RateTable::new();
        for (item, rate) in iter {
            table.insert(item.as_ref(), rate);
        }
        table
    }
}
