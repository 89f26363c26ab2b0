//! Domain models for pantry-service.

mod bill;
mod draft;
mod entry;
mod filter;
mod rate;

pub use bill::{
    Bill, BillGroup, BillOutcome, BillReport, BillRow, BillWarning, RowLabel, UsageRow,
    COUPON_COLUMN, DATE_COLUMN, PERSON_COLUMN, SUBTOTAL_COLUMN, TAX_COLUMN, TOTAL_COLUMN,
    TOTAL_ROW_LABEL,
};
pub use draft::{FormDraft, DEFAULT_DRAFT_TTL_MINUTES};
pub use entry::{
    Action, Entry, EntrySuggestions, EntryUpdate, NewEntry, ACTION_HEADER, COUPON_HEADER,
    DATE_HEADER, ENTRY_HEADERS, ITEM_HEADER, NAME_HEADER, PANTRY_HANDLER_HEADER,
    PERSON_ID_HEADER, QUANTITY_HEADER,
};
pub use filter::{EntryFilter, TimeWindow};
pub use rate::{ItemRate, RateTable, MAX_RATE, RATE_HEADER, RATE_HEADERS, RATE_ITEM_HEADER};
