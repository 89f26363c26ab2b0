//! Pantry entry model: one issuance or return of an item against a coupon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sheet header for the entry date.
pub const DATE_HEADER: &str = "Date";
/// Sheet header for the badge / APM identifier.
pub const PERSON_ID_HEADER: &str = "APM ID";
pub const NAME_HEADER: &str = "Name";
pub const ITEM_HEADER: &str = "Item";
pub const QUANTITY_HEADER: &str = "Quantity";
pub const ACTION_HEADER: &str = "Action";
pub const COUPON_HEADER: &str = "Coupon No";
pub const PANTRY_HANDLER_HEADER: &str = "Pantry Boy";

/// Physical column order of the entries sheet.
pub const ENTRY_HEADERS: [&str; 8] = [
    DATE_HEADER,
    PERSON_ID_HEADER,
    NAME_HEADER,
    ITEM_HEADER,
    QUANTITY_HEADER,
    ACTION_HEADER,
    COUPON_HEADER,
    PANTRY_HANDLER_HEADER,
];

/// Direction of an entry. The recorded quantity never carries a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Issued,
    Returned,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Issued => "Issued",
            Action::Returned => "Returned",
        }
    }

    /// Parse the exact sheet spelling (after trimming).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Issued" => Some(Action::Issued),
            "Returned" => Some(Action::Returned),
            _ => None,
        }
    }

    /// Apply this action's direction to an unsigned quantity.
    pub fn signed(&self, quantity: u32) -> i64 {
        match self {
            Action::Issued => i64::from(quantity),
            Action::Returned => -i64::from(quantity),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingested row of the entry log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// 0-based data-row index in the entries sheet.
    pub row: usize,
    pub date: NaiveDate,
    pub person_id: String,
    pub name: String,
    pub coupon_id: String,
    pub item: String,
    pub quantity: u32,
    pub action: Action,
    pub pantry_handler: Option<String>,
}

impl Entry {
    /// Quantity with the direction applied: `+q` for issued, `-q` for returned.
    pub fn signed_quantity(&self) -> i64 {
        self.action.signed(self.quantity)
    }

    /// Sheet values in physical column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.person_id.clone(),
            self.name.clone(),
            self.item.clone(),
            self.quantity.to_string(),
            self.action.as_str().to_string(),
            self.coupon_id.clone(),
            self.pantry_handler.clone().unwrap_or_default(),
        ]
    }
}

/// Input for recording an entry from the entry form.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub person_id: String,
    pub name: String,
    pub coupon_id: String,
    pub item: String,
    pub quantity: u32,
    pub action: Action,
    pub pantry_handler: Option<String>,
}

impl NewEntry {
    /// Trim free-text fields and drop an empty handler.
    pub fn normalized(self) -> Self {
        let pantry_handler = self
            .pantry_handler
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        Self {
            person_id: self.person_id.trim().to_string(),
            name: self.name.trim().to_string(),
            coupon_id: self.coupon_id.trim().to_string(),
            item: self.item.trim().to_string(),
            pantry_handler,
            ..self
        }
    }

    /// Materialize as an entry at the given row.
    pub fn into_entry(self, row: usize) -> Entry {
        Entry {
            row,
            date: self.date,
            person_id: self.person_id,
            name: self.name,
            coupon_id: self.coupon_id,
            item: self.item,
            quantity: self.quantity,
            action: self.action,
            pantry_handler: self.pantry_handler,
        }
    }
}

/// Admin correction of an existing entry.
#[derive(Debug, Clone, Copy)]
pub struct EntryUpdate {
    pub quantity: u32,
    pub action: Action,
}

/// Autocompletion lists for the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySuggestions {
    pub person_ids: Vec<String>,
    pub names: Vec<String>,
    pub pantry_handlers: Vec<String>,
}
