//! Bill composer: turns billing-mode quantities into tax-inclusive rows.

use crate::error::PantryError;
use crate::models::{
    Bill, BillGroup, BillOutcome, BillReport, BillRow, BillWarning, EntryFilter, RateTable,
    RowLabel,
};
use crate::services::ingest::Ingestion;
use crate::services::reducer::{reduce_for_billing, Quantities};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Decimal places for every money value.
pub const MONEY_DP: u32 = 2;

/// GST applied to every subtotal: 5%.
pub fn gst_rate() -> Decimal {
    Decimal::new(5, 2)
}

/// Round half away from zero to two places.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// Emit an amount column after each item quantity.
    pub item_amounts: bool,
    /// Append a summary row.
    pub total_row: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            item_amounts: false,
            total_row: true,
        }
    }
}

/// Compose one row per group. Item columns come from the rate table; an
/// item without a rate bills at zero.
pub fn compose(
    grouped: &BTreeMap<BillGroup, Quantities>,
    rates: &RateTable,
    options: ComposeOptions,
) -> Result<Bill, PantryError> {
    let items: Vec<String> = rates.items().map(str::to_string).collect();

    let rows = grouped
        .iter()
        .map(|(group, quantities)| compose_row(group, quantities, &items, rates))
        .collect::<Result<Vec<BillRow>, PantryError>>()?;

    let total_row = if options.total_row && !rows.is_empty() {
        Some(sum_rows(&rows, items.len())?)
    } else {
        None
    };

    Ok(Bill {
        items,
        item_amounts: options.item_amounts,
        rows,
        total_row,
    })
}

fn overflow(context: &str) -> PantryError {
    PantryError::AmountOverflow(context.to_string())
}

fn checked_sum<'a>(
    values: impl IntoIterator<Item = &'a Decimal>,
    context: &str,
) -> Result<Decimal, PantryError> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(*v).ok_or_else(|| overflow(context))
    })
}

/// Item amounts are summed unrounded; rounding applies once to the
/// subtotal and separately to each displayed amount.
fn compose_row(
    group: &BillGroup,
    quantities: &Quantities,
    items: &[String],
    rates: &RateTable,
) -> Result<BillRow, PantryError> {
    let mut row_quantities = Vec::with_capacity(items.len());
    let mut exact = Vec::with_capacity(items.len());

    for item in items {
        let quantity = quantities.get(item).copied().unwrap_or(0);
        let amount = Decimal::from(quantity)
            .checked_mul(rates.rate_or_zero(item))
            .ok_or_else(|| overflow(item))?;
        row_quantities.push(quantity);
        exact.push(amount);
    }

    let subtotal = round_money(checked_sum(&exact, "subtotal")?);
    let tax = round_money(
        subtotal
            .checked_mul(gst_rate())
            .ok_or_else(|| overflow("tax"))?,
    );
    let total = round_money(subtotal.checked_add(tax).ok_or_else(|| overflow("total"))?);

    Ok(BillRow {
        label: RowLabel::Group(group.clone()),
        quantities: row_quantities,
        amounts: exact.into_iter().map(round_money).collect(),
        subtotal,
        tax,
        total,
    })
}

/// Column-wise sum of the displayed row values.
fn sum_rows(rows: &[BillRow], width: usize) -> Result<BillRow, PantryError> {
    let mut quantities = vec![0i64; width];
    let mut amounts = vec![Decimal::ZERO; width];

    for row in rows {
        for (acc, q) in quantities.iter_mut().zip(&row.quantities) {
            *acc = acc.checked_add(*q).ok_or_else(|| overflow("total quantity"))?;
        }
        for (acc, a) in amounts.iter_mut().zip(&row.amounts) {
            *acc = acc.checked_add(*a).ok_or_else(|| overflow("total amount"))?;
        }
    }

    Ok(BillRow {
        label: RowLabel::Total,
        quantities,
        amounts,
        subtotal: checked_sum(rows.iter().map(|r| &r.subtotal), "subtotal")?,
        tax: checked_sum(rows.iter().map(|r| &r.tax), "tax")?,
        total: checked_sum(rows.iter().map(|r| &r.total), "total")?,
    })
}

/// Filter, reduce and compose an ingested log into a bill report.
///
/// An empty selection is reported as [`BillOutcome::EmptyInput`]; skipped
/// dates from ingestion travel along as warnings either way.
pub fn build_bill_report(
    ingestion: &Ingestion,
    filter: &EntryFilter,
    today: NaiveDate,
    rates: &RateTable,
    options: ComposeOptions,
) -> Result<BillReport, PantryError> {
    let mut warnings = Vec::new();
    if ingestion.skipped_dates > 0 {
        warnings.push(BillWarning::DateParseSkipped(ingestion.skipped_dates));
    }

    let selected = filter.apply(&ingestion.entries, today);
    let outcome = if selected.is_empty() {
        BillOutcome::EmptyInput
    } else {
        let grouped = reduce_for_billing(&selected, rates.items());
        BillOutcome::Ready(compose(&grouped, rates, options)?)
    };

    Ok(BillReport { outcome, warnings })
}
