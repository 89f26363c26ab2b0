//! CSV rendering of a composed bill.

use crate::error::PantryError;
use crate::models::{Bill, BillRow};
use rust_decimal::Decimal;

/// Download name for the exported bill.
pub const EXPORT_FILE_NAME: &str = "Pantry_Final_Billing.csv";

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn record(bill: &Bill, row: &BillRow) -> Vec<String> {
    let mut cells: Vec<String> = row.label.key_cells().into_iter().collect();
    for (idx, quantity) in row.quantities.iter().enumerate() {
        cells.push(quantity.to_string());
        if bill.item_amounts {
            cells.push(money(row.amounts.get(idx).copied().unwrap_or_default()));
        }
    }
    cells.push(money(row.subtotal));
    cells.push(money(row.tax));
    cells.push(money(row.total));
    cells
}

/// Render the bill as CSV in canonical column order, total row last.
pub fn bill_to_csv(bill: &Bill) -> Result<Vec<u8>, PantryError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(bill.columns())?;
    for row in bill.all_rows() {
        writer.write_record(record(bill, row))?;
    }
    writer
        .into_inner()
        .map_err(|e| PantryError::Storage(anyhow::anyhow!("CSV flush failed: {}", e)))
}
