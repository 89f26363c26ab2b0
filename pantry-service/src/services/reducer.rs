//! Signed-quantity reducer.
//!
//! Folds the flat entry log into per-group quantities. Issued entries count
//! `+quantity`, returned entries `-quantity`.

use crate::models::{Action, BillGroup, Entry, UsageRow};
use std::collections::BTreeMap;

/// Entry field usable as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Date,
    PersonId,
    Name,
    CouponId,
    Item,
    Action,
    PantryHandler,
}

impl GroupField {
    /// Text value of this field for an entry. Dates render as ISO so they
    /// sort chronologically.
    pub fn value(&self, entry: &Entry) -> String {
        match self {
            GroupField::Date => entry.date.format("%Y-%m-%d").to_string(),
            GroupField::PersonId => entry.person_id.clone(),
            GroupField::Name => entry.name.clone(),
            GroupField::CouponId => entry.coupon_id.clone(),
            GroupField::Item => entry.item.clone(),
            GroupField::Action => entry.action.as_str().to_string(),
            GroupField::PantryHandler => entry.pantry_handler.clone().unwrap_or_default(),
        }
    }
}

/// Quantities per inner key (item or action name).
pub type Quantities = BTreeMap<String, i64>;

/// Accumulate `weight(entry)` into `outer(entry)` → `inner(entry)`.
fn fold<K, O, I, W>(entries: &[Entry], outer: O, inner: I, weight: W) -> BTreeMap<K, Quantities>
where
    K: Ord,
    O: Fn(&Entry) -> K,
    I: Fn(&Entry) -> String,
    W: Fn(&Entry) -> i64,
{
    let mut groups: BTreeMap<K, Quantities> = BTreeMap::new();
    for entry in entries {
        *groups
            .entry(outer(entry))
            .or_default()
            .entry(inner(entry))
            .or_insert(0) += weight(entry);
    }
    groups
}

/// Net signed quantity per item, grouped by the given fields in order.
pub fn reduce(entries: &[Entry], group_keys: &[GroupField]) -> BTreeMap<Vec<String>, Quantities> {
    fold(
        entries,
        |e| group_keys.iter().map(|k| k.value(e)).collect::<Vec<_>>(),
        |e| e.item.clone(),
        Entry::signed_quantity,
    )
}

/// Billing mode: net signed quantity per item for every
/// (date, person, coupon) group.
///
/// Every item in `known_items` is present in every group, zero when the
/// group has no entries for it. Items outside `known_items` keep whatever
/// they summed to.
pub fn reduce_for_billing<'a>(
    entries: &[Entry],
    known_items: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<BillGroup, Quantities> {
    let mut groups = fold(
        entries,
        |e| BillGroup {
            date: e.date,
            person_id: e.person_id.clone(),
            coupon_id: e.coupon_id.clone(),
        },
        |e| e.item.clone(),
        Entry::signed_quantity,
    );

    let known_items: Vec<&str> = known_items.into_iter().collect();
    for quantities in groups.values_mut() {
        for item in &known_items {
            quantities.entry(item.to_string()).or_insert(0);
        }
    }

    groups
}

/// Usage mode: issued and returned totals per (person, item), with
/// `net = issued - returned`. Totals are unsigned sums per action.
pub fn reduce_for_usage(entries: &[Entry]) -> Vec<UsageRow> {
    let groups = fold(
        entries,
        |e| (e.person_id.clone(), e.item.clone()),
        |e| e.action.as_str().to_string(),
        |e| i64::from(e.quantity),
    );

    groups
        .into_iter()
        .map(|((person_id, item), by_action)| {
            let issued = by_action.get(Action::Issued.as_str()).copied().unwrap_or(0);
            let returned = by_action.get(Action::Returned.as_str()).copied().unwrap_or(0);
            UsageRow {
                person_id,
                item,
                issued,
                returned,
                net: issued - returned,
            }
        })
        .collect()
}
