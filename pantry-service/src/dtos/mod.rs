//! Request and response bodies for the HTTP API.

use crate::models::{
    Action, BillWarning, Entry, EntryFilter, EntryUpdate, FormDraft, NewEntry, TimeWindow,
    UsageRow,
};
use crate::services::ComposeOptions;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct DraftRequest {
    /// Draft returned by the previous interaction, if any.
    pub draft: Option<FormDraft>,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub draft: FormDraft,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordEntryRequest {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "APM ID is required"))]
    pub person_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Coupon No is required"))]
    pub coupon_id: String,
    #[validate(length(min = 1, message = "Item is required"))]
    pub item: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    pub action: Action,
    pub pantry_handler: Option<String>,
}

impl RecordEntryRequest {
    pub fn into_new_entry(self, today: NaiveDate) -> NewEntry {
        NewEntry {
            date: self.date.unwrap_or(today),
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

#[derive(Debug, Serialize)]
pub struct RecordEntryResponse {
    pub entry: Entry,
    /// Draft to send back with the next entry.
    pub draft: FormDraft,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    pub action: Action,
}

impl From<UpdateEntryRequest> for EntryUpdate {
    fn from(req: UpdateEntryRequest) -> Self {
        EntryUpdate {
            quantity: req.quantity,
            action: req.action,
        }
    }
}

/// Filter query shared by the entry list and usage report.
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub window: Option<TimeWindow>,
    pub person: Option<String>,
    pub item: Option<String>,
    pub action: Option<Action>,
}

impl From<EntryQuery> for EntryFilter {
    fn from(q: EntryQuery) -> Self {
        EntryFilter {
            window: q.window.unwrap_or_default(),
            person: q.person,
            item: q.item,
            action: q.action,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BillQuery {
    pub window: Option<TimeWindow>,
    pub person: Option<String>,
    pub item: Option<String>,
    pub action: Option<Action>,
    /// Emit per-item amount columns.
    pub amounts: Option<bool>,
    /// Append the summary row (default on).
    pub total_row: Option<bool>,
}

impl BillQuery {
    pub fn filter(&self) -> EntryFilter {
        EntryFilter {
            window: self.window.unwrap_or_default(),
            person: self.person.clone(),
            item: self.item.clone(),
            action: self.action,
        }
    }

    pub fn options(&self) -> ComposeOptions {
        let defaults = ComposeOptions::default();
        ComposeOptions {
            item_amounts: self.amounts.unwrap_or(defaults.item_amounts),
            total_row: self.total_row.unwrap_or(defaults.total_row),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<Entry>,
    pub warnings: Vec<BillWarning>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub rows: Vec<UsageRow>,
    pub warnings: Vec<BillWarning>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertRateRequest {
    #[validate(length(min = 1, message = "Item is required"))]
    pub item: String,
    pub rate: Decimal,
}
