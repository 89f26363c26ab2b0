//! Entry log repository over the entries sheet.

use crate::error::PantryError;
use crate::models::{
    Entry, EntrySuggestions, EntryUpdate, NewEntry, DATE_HEADER, ENTRY_HEADERS, NAME_HEADER,
    PANTRY_HANDLER_HEADER, PERSON_ID_HEADER,
};
use crate::services::ingest::{entry_from_cells, ingest_entries, parse_date, Ingestion};
use crate::services::metrics::{ENTRIES_RECORDED_TOTAL, STORE_OP_DURATION};
use crate::services::sheet::Sheet;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// Number of values offered per autocompletion list.
pub const SUGGESTION_LIMIT: usize = 10;

fn column_index(header: &str) -> usize {
    ENTRY_HEADERS
        .iter()
        .position(|h| *h == header)
        .unwrap_or_default()
}

/// Entry-form checks applied before a row is appended.
pub fn validate_new_entry(entry: &NewEntry) -> Result<(), PantryError> {
    if entry.person_id.is_empty() {
        return Err(PantryError::Validation("APM ID is required".to_string()));
    }
    if entry.name.is_empty() {
        return Err(PantryError::Validation("Name is required".to_string()));
    }
    if entry.item.is_empty() {
        return Err(PantryError::Validation("Item is required".to_string()));
    }
    if entry.coupon_id.is_empty() || !entry.coupon_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(PantryError::Validation(format!(
            "Coupon No '{}' must be numeric",
            entry.coupon_id
        )));
    }
    if entry.quantity < 1 {
        return Err(PantryError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn first_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .collect()
}

/// Typed access to the entries sheet.
#[derive(Clone)]
pub struct EntryLog {
    sheet: Arc<dyn Sheet>,
}

impl EntryLog {
    pub fn new(sheet: Arc<dyn Sheet>) -> Self {
        Self { sheet }
    }

    /// Read and ingest the whole log.
    #[instrument(skip(self), fields(sheet = %self.sheet.name()))]
    pub async fn load(&self) -> Result<Ingestion, PantryError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["load_entries"])
            .start_timer();

        let records = self.sheet.read_all().await?;
        let ingestion = ingest_entries(&records)?;

        timer.observe_duration();
        Ok(ingestion)
    }

    /// Validate and append an entry.
    #[instrument(skip(self, input), fields(person_id = %input.person_id, item = %input.item))]
    pub async fn record(&self, input: NewEntry) -> Result<Entry, PantryError> {
        let input = input.normalized();
        validate_new_entry(&input)?;

        let timer = STORE_OP_DURATION
            .with_label_values(&["record_entry"])
            .start_timer();

        let values = input.clone().into_entry(0).to_row();
        let row = self.sheet.append_row(values).await?;
        let entry = input.into_entry(row);

        timer.observe_duration();

        ENTRIES_RECORDED_TOTAL
            .with_label_values(&[entry.action.as_str()])
            .inc();
        info!(row = row, action = %entry.action, quantity = entry.quantity, "Entry recorded");

        Ok(entry)
    }

    /// Rewrite quantity and action of the entry at `index`.
    #[instrument(skip(self))]
    pub async fn update(&self, index: usize, update: EntryUpdate) -> Result<Entry, PantryError> {
        if update.quantity < 1 {
            return Err(PantryError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let timer = STORE_OP_DURATION
            .with_label_values(&["update_entry"])
            .start_timer();

        let records = self.sheet.read_all().await?;
        let record = records
            .get(index)
            .cloned()
            .ok_or(PantryError::RowOutOfRange {
                index,
                len: records.len(),
            })?;

        // Stored quantity and action are replaced, so a row holding invalid
        // values there can still be repaired.
        let date = parse_date(record.get(DATE_HEADER)).ok_or_else(|| {
            PantryError::Validation(format!("Row {} has no readable date", index))
        })?;
        let entry = entry_from_cells(&record, date, update.quantity, update.action);
        self.sheet.update_row(index, entry.to_row()).await?;

        timer.observe_duration();
        info!(row = index, action = %entry.action, quantity = entry.quantity, "Entry updated");

        Ok(entry)
    }

    /// Delete the entry at `index`. Later rows shift up by one.
    #[instrument(skip(self))]
    pub async fn delete(&self, index: usize) -> Result<(), PantryError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_entry"])
            .start_timer();

        self.sheet.delete_row(index).await?;

        timer.observe_duration();
        info!(row = index, "Entry deleted");
        Ok(())
    }

    /// Autocompletion lists for the entry form.
    #[instrument(skip(self))]
    pub async fn suggestions(&self) -> Result<EntrySuggestions, PantryError> {
        let person_ids = self
            .sheet
            .column_values(column_index(PERSON_ID_HEADER))
            .await?;
        let names = self.sheet.column_values(column_index(NAME_HEADER)).await?;
        let pantry_handlers = self
            .sheet
            .column_values(column_index(PANTRY_HANDLER_HEADER))
            .await?;

        Ok(EntrySuggestions {
            person_ids: first_unique(person_ids),
            names: first_unique(names),
            pantry_handlers: first_unique(pantry_handlers),
        })
    }

    /// Readiness probe: the sheet can be read.
    pub async fn health_check(&self) -> Result<(), PantryError> {
        self.sheet.column_values(0).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use crate::services::sheet::{MemorySheet, Table};
    use chrono::NaiveDate;

    fn log() -> EntryLog {
        EntryLog::new(Arc::new(MemorySheet::new("entries", &ENTRY_HEADERS)))
    }

    fn new_entry(person: &str, coupon: &str, item: &str, qty: u32) -> NewEntry {
        NewEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            person_id: person.to_string(),
            name: format!("Name {}", person),
            coupon_id: coupon.to_string(),
            item: item.to_string(),
            quantity: qty,
            action: Action::Issued,
            pantry_handler: Some("Ravi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_then_load() {
        let log = log();
        let first = log.record(new_entry(" A1 ", "007", "Tea", 2)).await.unwrap();
        let second = log.record(new_entry("B2", "8", "Coffee", 1)).await.unwrap();

        assert_eq!(first.row, 0);
        assert_eq!(first.person_id, "A1");
        assert_eq!(second.row, 1);

        let ingestion = log.load().await.unwrap();
        assert_eq!(ingestion.entries, vec![first, second]);
        assert_eq!(ingestion.skipped_dates, 0);
    }

    #[tokio::test]
    async fn test_record_keeps_coupon_leading_zeros() {
        let log = log();
        log.record(new_entry("A1", "0042", "Tea", 1)).await.unwrap();
        let loaded = log.load().await.unwrap();
        assert_eq!(loaded.entries[0].coupon_id, "0042");
    }

    #[tokio::test]
    async fn test_record_rejects_bad_input() {
        let log = log();

        let err = log.record(new_entry("A1", "12a", "Tea", 1)).await.unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));

        let err = log.record(new_entry("A1", "12", "Tea", 0)).await.unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));

        let err = log.record(new_entry("  ", "12", "Tea", 1)).await.unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));

        assert!(log.load().await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_update_rewrites_in_place() {
        let log = log();
        log.record(new_entry("A1", "1", "Tea", 2)).await.unwrap();
        log.record(new_entry("B2", "2", "Coffee", 1)).await.unwrap();

        let updated = log
            .update(
                0,
                EntryUpdate {
                    quantity: 5,
                    action: Action::Returned,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.row, 0);

        let entries = log.load().await.unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].quantity, 5);
        assert_eq!(entries[0].action, Action::Returned);
        assert_eq!(entries[0].item, "Tea");
        assert_eq!(entries[1].person_id, "B2");
    }

    #[tokio::test]
    async fn test_update_repairs_row_with_invalid_quantity() {
        let mut table = Table::new(&ENTRY_HEADERS);
        table.append_row(
            ["2024-01-05", "A1", "Asha", "Tea", "-3", "Issued", "0042", ""]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        let log = EntryLog::new(Arc::new(MemorySheet::with_table("entries", table)));
        assert!(matches!(
            log.load().await.unwrap_err(),
            PantryError::InvalidEntry { .. }
        ));

        let repaired = log
            .update(
                0,
                EntryUpdate {
                    quantity: 3,
                    action: Action::Issued,
                },
            )
            .await
            .unwrap();
        assert_eq!(repaired.quantity, 3);
        assert_eq!(repaired.coupon_id, "0042");
        assert_eq!(repaired.pantry_handler, None);

        let entries = log.load().await.unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 3);
        assert_eq!(entries[0].action, Action::Issued);
        assert_eq!(entries[0].name, "Asha");
    }

    #[tokio::test]
    async fn test_update_and_delete_out_of_range() {
        let log = log();
        let update = EntryUpdate {
            quantity: 1,
            action: Action::Issued,
        };
        assert!(matches!(
            log.update(3, update).await.unwrap_err(),
            PantryError::RowOutOfRange { index: 3, len: 0 }
        ));
        assert!(matches!(
            log.delete(0).await.unwrap_err(),
            PantryError::RowOutOfRange { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_shifts_rows() {
        let log = log();
        log.record(new_entry("A1", "1", "Tea", 1)).await.unwrap();
        log.record(new_entry("B2", "2", "Tea", 1)).await.unwrap();

        log.delete(0).await.unwrap();

        let entries = log.load().await.unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].person_id, "B2");
        assert_eq!(entries[0].row, 0);
    }

    #[tokio::test]
    async fn test_suggestions_are_sorted_and_unique() {
        let log = log();
        for person in ["C3", "A1", "B2", "A1"] {
            log.record(new_entry(person, "1", "Tea", 1)).await.unwrap();
        }

        let suggestions = log.suggestions().await.unwrap();
        assert_eq!(suggestions.person_ids, vec!["A1", "B2", "C3"]);
        assert_eq!(suggestions.names, vec!["Name A1", "Name B2", "Name C3"]);
        assert_eq!(suggestions.pantry_handlers, vec!["Ravi"]);
    }

    #[tokio::test]
    async fn test_suggestions_are_capped() {
        let log = log();
        for n in 0..15 {
            log.record(new_entry(&format!("P{:02}", n), "1", "Tea", 1))
                .await
                .unwrap();
        }
        let suggestions = log.suggestions().await.unwrap();
        assert_eq!(suggestions.person_ids.len(), SUGGESTION_LIMIT);
        assert_eq!(suggestions.person_ids[0], "P00");
    }
}
