//! Rate table repository over the rates sheet.

use crate::error::PantryError;
use crate::models::{ItemRate, RateTable, RATE_HEADER, RATE_HEADERS, RATE_ITEM_HEADER};
use crate::services::ingest::{check_rate, ingest_rates};
use crate::services::metrics::STORE_OP_DURATION;
use crate::services::sheet::Sheet;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct RateBook {
    sheet: Arc<dyn Sheet>,
}

impl RateBook {
    pub fn new(sheet: Arc<dyn Sheet>) -> Self {
        Self { sheet }
    }

    #[instrument(skip(self), fields(sheet = %self.sheet.name()))]
    pub async fn load(&self) -> Result<RateTable, PantryError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["load_rates"])
            .start_timer();

        let records = self.sheet.read_all().await?;
        let table = ingest_rates(&records)?;

        timer.observe_duration();
        Ok(table)
    }

    /// Set the rate for an item, adding the item if it is new.
    #[instrument(skip(self))]
    pub async fn upsert(&self, item: &str, rate: Decimal) -> Result<ItemRate, PantryError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(PantryError::Validation("Item is required".to_string()));
        }
        check_rate(item, rate)?;

        let timer = STORE_OP_DURATION
            .with_label_values(&["upsert_rate"])
            .start_timer();

        let records = self.sheet.read_all().await?;
        let existing = records
            .iter()
            .rev()
            .find(|r| r.get(RATE_ITEM_HEADER).trim() == item)
            .map(|r| r.row);

        let rate_col = RATE_HEADERS
            .iter()
            .position(|h| *h == RATE_HEADER)
            .unwrap_or(1);

        match existing {
            Some(row) => {
                self.sheet
                    .update_cell(row, rate_col, rate.to_string())
                    .await?;
                info!(item = %item, rate = %rate, row = row, "Rate updated");
            }
            None => {
                let row = self
                    .sheet
                    .append_row(vec![item.to_string(), rate.to_string()])
                    .await?;
                info!(item = %item, rate = %rate, row = row, "Rate added");
            }
        }

        timer.observe_duration();

        Ok(ItemRate {
            item: item.to_string(),
            rate,
        })
    }
}
