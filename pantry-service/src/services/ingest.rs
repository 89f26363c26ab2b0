//! Ingestion: raw sheet records → typed entries and rates.

use crate::error::PantryError;
use crate::models::{
    Action, Entry, RateTable, ACTION_HEADER, COUPON_HEADER, DATE_HEADER, ITEM_HEADER,
    NAME_HEADER, PANTRY_HANDLER_HEADER, PERSON_ID_HEADER, QUANTITY_HEADER, MAX_RATE,
    RATE_HEADER, RATE_ITEM_HEADER,
};
use crate::services::metrics::DATE_PARSE_SKIPPED_TOTAL;
use crate::services::sheet::Record;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Entries parsed from the log plus the count of rows dropped for an
/// unparseable date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingestion {
    pub entries: Vec<Entry>,
    pub skipped_dates: usize,
}

/// Parse a sheet date. Timestamps keep only their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_quantity(row: usize, raw: &str) -> Result<u32, PantryError> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| PantryError::invalid_entry(row, format!("quantity '{}' is not a number", raw)))?;

    if value < 0 {
        return Err(PantryError::invalid_entry(
            row,
            format!("quantity {} is negative; direction comes from the action", value),
        ));
    }

    u32::try_from(value)
        .map_err(|_| PantryError::invalid_entry(row, format!("quantity {} is too large", value)))
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_blank(record: &Record) -> bool {
    crate::models::ENTRY_HEADERS
        .iter()
        .all(|h| record.get(h).trim().is_empty())
}

/// Build an entry from the text cells of a record. The stored quantity and
/// action cells are not read.
pub fn entry_from_cells(record: &Record, date: NaiveDate, quantity: u32, action: Action) -> Entry {
    Entry {
        row: record.row,
        date,
        person_id: record.get(PERSON_ID_HEADER).trim().to_string(),
        name: record.get(NAME_HEADER).trim().to_string(),
        coupon_id: record.get(COUPON_HEADER).trim().to_string(),
        item: record.get(ITEM_HEADER).trim().to_string(),
        quantity,
        action,
        pantry_handler: optional_text(record.get(PANTRY_HANDLER_HEADER)),
    }
}

/// Convert entry-log records into entries.
///
/// Blank rows are ignored. A row whose date does not parse is dropped and
/// counted; it is checked before any other field. A negative or
/// non-numeric quantity, or an unknown action, fails the whole ingestion.
pub fn ingest_entries(records: &[Record]) -> Result<Ingestion, PantryError> {
    let mut ingestion = Ingestion::default();

    for record in records {
        if is_blank(record) {
            continue;
        }

        let Some(date) = parse_date(record.get(DATE_HEADER)) else {
            ingestion.skipped_dates += 1;
            continue;
        };

        let quantity = parse_quantity(record.row, record.get(QUANTITY_HEADER))?;
        let action = Action::parse(record.get(ACTION_HEADER)).ok_or_else(|| {
            PantryError::invalid_entry(
                record.row,
                format!("unknown action '{}'", record.get(ACTION_HEADER).trim()),
            )
        })?;

        ingestion
            .entries
            .push(entry_from_cells(record, date, quantity, action));
    }

    if ingestion.skipped_dates > 0 {
        warn!(
            skipped = ingestion.skipped_dates,
            "Skipped entry rows with unparseable dates"
        );
        DATE_PARSE_SKIPPED_TOTAL.inc_by(ingestion.skipped_dates as u64);
    }

    Ok(ingestion)
}

/// Check a rate is within `0..=MAX_RATE`.
pub fn check_rate(item: &str, rate: Decimal) -> Result<(), PantryError> {
    if rate < Decimal::ZERO {
        return Err(PantryError::InvalidRate {
            item: item.to_string(),
            reason: format!("{} is negative", rate),
        });
    }
    if rate > Decimal::from(MAX_RATE) {
        return Err(PantryError::InvalidRate {
            item: item.to_string(),
            reason: format!("{} exceeds the maximum of {}", rate, MAX_RATE),
        });
    }
    Ok(())
}

/// Parse a rate cell: a decimal in `0..=MAX_RATE`.
pub fn parse_rate(item: &str, raw: &str) -> Result<Decimal, PantryError> {
    let raw = raw.trim();
    let rate = Decimal::from_str(raw).map_err(|_| PantryError::InvalidRate {
        item: item.to_string(),
        reason: format!("'{}' is not a number", raw),
    })?;

    check_rate(item, rate)?;
    Ok(rate)
}

/// Convert rate-sheet records into a rate table. Rows without an item are
/// ignored; duplicate items resolve last-write-wins.
pub fn ingest_rates(records: &[Record]) -> Result<RateTable, PantryError> {
    let mut table = RateTable::new();
    for record in records {
        let item = record.get(RATE_ITEM_HEADER).trim();
        if item.is_empty() {
            continue;
        }
        let rate = parse_rate(item, record.get(RATE_HEADER))?;
        table.insert(item, rate);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ENTRY_HEADERS;
    use crate::services::sheet::Table;
    use rust_decimal_macros::dec;

    fn entry_records(rows: &[[&str; 8]]) -> Vec<Record> {
        let mut table = Table::new(&ENTRY_HEADERS);
        for row in rows {
            table.append_row(row.iter().map(|c| c.to_string()).collect());
        }
        table.records()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(parse_date("2024-01-05"), expected);
        assert_eq!(parse_date(" 2024-01-05 "), expected);
        assert_eq!(parse_date("05/01/2024"), expected);
        assert_eq!(parse_date("2024-01-05 17:45:10"), expected);
        assert_eq!(parse_date("2024-01-05T08:00:00"), expected);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_ingest_trims_and_keeps_coupon_text() {
        let records = entry_records(&[[
            "2024-01-01", " A1 ", "Asha ", " Tea", "2", "Issued", " 0042 ", "",
        ]]);

        let ingestion = ingest_entries(&records).unwrap();
        assert_eq!(ingestion.skipped_dates, 0);

        let entry = &ingestion.entries[0];
        assert_eq!(entry.person_id, "A1");
        assert_eq!(entry.name, "Asha");
        assert_eq!(entry.item, "Tea");
        assert_eq!(entry.coupon_id, "0042");
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.action, Action::Issued);
        assert_eq!(entry.pantry_handler, None);
    }

    #[test]
    fn test_bad_dates_are_skipped_and_counted() {
        let records = entry_records(&[
            ["2024-01-01", "A1", "", "Tea", "1", "Issued", "1", ""],
            ["not a date", "A1", "", "Tea", "1", "Issued", "1", ""],
            ["", "A2", "", "Tea", "1", "Issued", "1", ""],
        ]);

        let ingestion = ingest_entries(&records).unwrap();
        assert_eq!(ingestion.entries.len(), 1);
        assert_eq!(ingestion.skipped_dates, 2);
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let records = entry_records(&[["", "", "", "", "", "", "", ""]]);
        let ingestion = ingest_entries(&records).unwrap();
        assert!(ingestion.entries.is_empty());
        assert_eq!(ingestion.skipped_dates, 0);
    }

    #[test]
    fn test_negative_quantity_is_invalid_entry() {
        let records = entry_records(&[
            ["2024-01-01", "A1", "", "Tea", "1", "Issued", "1", ""],
            ["2024-01-01", "A1", "", "Tea", "-3", "Returned", "1", ""],
        ]);

        let err = ingest_entries(&records).unwrap_err();
        assert!(matches!(err, PantryError::InvalidEntry { row: 1, .. }));
    }

    #[test]
    fn test_unknown_action_is_invalid_entry() {
        let records = entry_records(&[["2024-01-01", "A1", "", "Tea", "1", "Lost", "1", ""]]);
        assert!(matches!(
            ingest_entries(&records),
            Err(PantryError::InvalidEntry { row: 0, .. })
        ));
    }

    #[test]
    fn test_zero_quantity_is_accepted() {
        let records = entry_records(&[["2024-01-01", "A1", "", "Tea", "0", "Issued", "1", ""]]);
        let ingestion = ingest_entries(&records).unwrap();
        assert_eq!(ingestion.entries[0].quantity, 0);
    }

    #[test]
    fn test_ingest_rates_last_write_wins() {
        let mut table = Table::new(&["Item", "Rate"]);
        for (item, rate) in [("Tea", "10"), ("", "99"), ("Coffee", "15.50"), ("Tea", "12")] {
            table.append_row(vec![item.to_string(), rate.to_string()]);
        }

        let rates = ingest_rates(&table.records()).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.get("Tea"), Some(dec!(12)));
        assert_eq!(rates.get("Coffee"), Some(dec!(15.50)));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        assert!(matches!(
            parse_rate("Tea", "-1"),
            Err(PantryError::InvalidRate { .. })
        ));
        assert!(parse_rate("Tea", "abc").is_err());
        assert_eq!(parse_rate("Tea", "0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rate_above_maximum_is_rejected() {
        assert_eq!(parse_rate("Tea", "1000000").unwrap(), dec!(1000000));
        assert!(matches!(
            parse_rate("Tea", "1000000.01"),
            Err(PantryError::InvalidRate { .. })
        ));
        assert!(matches!(
            parse_rate("Tea", "79228162514264337593543950335"),
            Err(PantryError::InvalidRate { .. })
        ));
    }
}
