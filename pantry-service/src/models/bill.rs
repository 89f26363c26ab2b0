//! Bill model: one tax-inclusive row per (date, person, coupon) group.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DATE_COLUMN: &str = "Date";
pub const PERSON_COLUMN: &str = "APM ID";
pub const COUPON_COLUMN: &str = "Coupon No";
pub const SUBTOTAL_COLUMN: &str = "Subtotal";
pub const TAX_COLUMN: &str = "GST 5%";
pub const TOTAL_COLUMN: &str = "Total";
/// Label written in the date column of the summary row.
pub const TOTAL_ROW_LABEL: &str = "Total";

/// Billing group key. Field order gives the presentation sort:
/// date, then person, then coupon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillGroup {
    pub date: NaiveDate,
    pub person_id: String,
    pub coupon_id: String,
}

/// What a bill row stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowLabel {
    Group(BillGroup),
    Total,
}

impl RowLabel {
    /// Values of the three key columns.
    pub fn key_cells(&self) -> [String; 3] {
        match self {
            RowLabel::Group(group) => [
                group.date.format("%Y-%m-%d").to_string(),
                group.person_id.clone(),
                group.coupon_id.clone(),
            ],
            RowLabel::Total => [TOTAL_ROW_LABEL.to_string(), String::new(), String::new()],
        }
    }
}

/// One composed bill line. `quantities` and `amounts` are aligned with
/// `Bill::items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRow {
    pub label: RowLabel,
    pub quantities: Vec<i64>,
    pub amounts: Vec<Decimal>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Composed bill with a fixed column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Item columns, in rate-table order.
    pub items: Vec<String>,
    /// Whether per-item amount columns are emitted.
    pub item_amounts: bool,
    pub rows: Vec<BillRow>,
    pub total_row: Option<BillRow>,
}

impl Bill {
    /// Canonical column order: key columns, items (each followed by its
    /// amount column when enabled), subtotal, tax, total.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            DATE_COLUMN.to_string(),
            PERSON_COLUMN.to_string(),
            COUPON_COLUMN.to_string(),
        ];
        for item in &self.items {
            columns.push(item.clone());
            if self.item_amounts {
                columns.push(format!("{} Amount", item));
            }
        }
        columns.push(SUBTOTAL_COLUMN.to_string());
        columns.push(TAX_COLUMN.to_string());
        columns.push(TOTAL_COLUMN.to_string());
        columns
    }

    /// Group rows followed by the total row, if any.
    pub fn all_rows(&self) -> impl Iterator<Item = &BillRow> {
        self.rows.iter().chain(self.total_row.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Net quantity for an item in a row, by item name.
    pub fn quantity(&self, row: &BillRow, item: &str) -> Option<i64> {
        self.items
            .iter()
            .position(|i| i == item)
            .and_then(|idx| row.quantities.get(idx).copied())
    }

    /// Amount for an item in a row, by item name.
    pub fn amount(&self, row: &BillRow, item: &str) -> Option<Decimal> {
        self.items
            .iter()
            .position(|i| i == item)
            .and_then(|idx| row.amounts.get(idx).copied())
    }
}

/// Non-fatal conditions surfaced alongside a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum BillWarning {
    /// Rows dropped at ingestion because their date did not parse.
    DateParseSkipped(usize),
}

/// Result of a billing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "bill", rename_all = "snake_case")]
pub enum BillOutcome {
    Ready(Bill),
    /// No entries matched; not an error.
    EmptyInput,
}

/// Bill plus any warnings raised while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillReport {
    pub outcome: BillOutcome,
    pub warnings: Vec<BillWarning>,
}

/// Issued / returned reconciliation for one (person, item) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub person_id: String,
    pub item: String,
    pub issued: i64,
    pub returned: i64,
    /// `issued - returned`.
    pub net: i64,
}
