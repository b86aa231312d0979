//! Persisted monthly summary: one row per month, keyed by its display label.

use chrono::NaiveDate;
use tracing::info;

use crate::aggregate::{CategoryTotals, Period, aggregate};
use crate::domain::{Cell, KnownCategory, LedgerRow};
use crate::sheet::{Sheet, SheetError};

/// Global (all users) totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAggregate {
    pub period: Period,
    /// e.g. `"August 2025"`; the summary table's row key.
    pub label: String,
    pub totals: CategoryTotals,
}

impl MonthlyAggregate {
    /// Recomputes the month containing `date` from the full ledger.
    pub fn compute(rows: &[LedgerRow], date: NaiveDate) -> Self {
        let period = Period::month_of(date);
        Self {
            period,
            label: period_label(date),
            totals: aggregate(rows, period, None),
        }
    }

    /// Cells in summary column order: label, the six buckets, total.
    pub fn to_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(KnownCategory::ALL.len() + 2);
        cells.push(Cell::Text(self.label.clone()));
        cells.extend(self.totals.iter().map(|(_, amount)| Cell::Int(amount)));
        cells.push(Cell::Int(self.totals.total()));
        cells
    }
}

pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated { row: usize },
    Appended { row: usize },
}

/// Writes `agg` into the summary table.
///
/// The first row whose label matches gets its differing cells rewritten in one batch
/// (cells that already hold the right value are left alone); otherwise a row is
/// appended at the end.
/// If the table already holds duplicate labels only the first is touched; stores
/// should refuse duplicates on write instead of relying on this.
pub fn upsert_monthly<S: Sheet + ?Sized>(
    sheet: &mut S,
    agg: &MonthlyAggregate,
) -> Result<UpsertOutcome, SheetError> {
    let rows = sheet.read_all_summary_rows()?;
    let cells = agg.to_cells();

    match rows.iter().position(|r| r.period_label() == agg.label) {
        Some(row) => {
            let existing = &rows[row].cells;
            let changed: Vec<(usize, Cell)> = cells
                .into_iter()
                .enumerate()
                .filter(|(col, value)| existing.get(*col) != Some(value))
                .collect();
            if !changed.is_empty() {
                sheet.update_summary_cells(row, changed)?;
            }
            info!(period = %agg.label, row, total = agg.totals.total(), "monthly summary updated");
            Ok(UpsertOutcome::Updated { row })
        }
        None => {
            sheet.append_summary_row(cells)?;
            info!(period = %agg.label, row = rows.len(), total = agg.totals.total(), "monthly summary appended");
            Ok(UpsertOutcome::Appended { row: rows.len() })
        }
    }
}

/// Re-scans the ledger and upserts the month containing `date`.
pub fn refresh_month<S: Sheet + ?Sized>(
    sheet: &mut S,
    date: NaiveDate,
) -> Result<(MonthlyAggregate, UpsertOutcome), SheetError> {
    let rows = sheet.read_all_records()?;
    let agg = MonthlyAggregate::compute(&rows, date);
    let outcome = upsert_monthly(sheet, &agg)?;
    Ok((agg, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExpenseRecord, ParsedExpense};
    use crate::sheet::{MemorySheet, SqliteSheet, SummaryRow};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).expect("valid date")
    }

    fn push(sheet: &mut dyn Sheet, date: NaiveDate, category: &str, amount: i64) {
        let at = date.and_hms_opt(10, 0, 0).expect("valid time");
        let record = ExpenseRecord::new(
            ParsedExpense {
                category: category.to_string(),
                amount,
                description: "x".to_string(),
            },
            "1",
            at,
        );
        sheet.append_record(&record).expect("append");
    }

    #[test]
    fn label_is_english_month_and_year() {
        assert_eq!(period_label(day(3)), "August 2025");
    }

    #[test]
    fn cells_hold_label_six_buckets_and_total() {
        let mut sheet = MemorySheet::default();
        push(&mut sheet, day(1), "makan", 25000);
        push(&mut sheet, day(2), "makan", 25000);
        push(&mut sheet, day(2), "transport", 10000);

        let rows = sheet.read_all_records().expect("read");
        let agg = MonthlyAggregate::compute(&rows, day(3));
        assert_eq!(
            agg.to_cells(),
            vec![
                Cell::from("August 2025"),
                Cell::Int(50000),
                Cell::Int(10000),
                Cell::Int(0),
                Cell::Int(0),
                Cell::Int(0),
                Cell::Int(0),
                Cell::Int(60000),
            ]
        );
    }

    #[test]
    fn first_upsert_appends_then_updates_in_place() {
        let mut sheet = MemorySheet::default();
        sheet.summary.push(SummaryRow {
            cells: vec![Cell::from("July 2025"); 8],
        });

        push(&mut sheet, day(1), "makan", 25000);
        let (_, outcome) = refresh_month(&mut sheet, day(1)).expect("refresh");
        assert_eq!(outcome, UpsertOutcome::Appended { row: 1 });

        push(&mut sheet, day(2), "hiburan", 30000);
        let (agg, outcome) = refresh_month(&mut sheet, day(2)).expect("refresh");
        assert_eq!(outcome, UpsertOutcome::Updated { row: 1 });
        assert_eq!(sheet.summary.len(), 2);
        assert_eq!(sheet.summary[1].cells, agg.to_cells());
        assert_eq!(sheet.summary[1].get("💰 Total"), Some(&Cell::Int(55000)));
        assert_eq!(sheet.summary[0].period_label(), "July 2025");
    }

    #[test]
    fn repeated_upsert_is_idempotent() {
        let mut sheet = MemorySheet::default();
        push(&mut sheet, day(1), "makan", 25000);

        let (first, _) = refresh_month(&mut sheet, day(1)).expect("refresh");
        let snapshot = sheet.summary.clone();
        let writes_before = sheet.cell_writes;

        let outcome = upsert_monthly(&mut sheet, &first).expect("upsert");
        assert_eq!(outcome, UpsertOutcome::Updated { row: 0 });
        assert_eq!(sheet.summary, snapshot);
        assert_eq!(sheet.cell_writes, writes_before);
    }

    #[test]
    fn drifted_row_is_repaired_by_the_next_refresh() {
        let mut sheet = SqliteSheet::open_in_memory().expect("open");
        push(&mut sheet, day(1), "makan", 25000);
        refresh_month(&mut sheet, day(1)).expect("refresh");

        // Bucket written but total left behind.
        sheet
            .update_summary_cell(0, 1, Cell::Int(99000))
            .expect("update");

        push(&mut sheet, day(2), "transport", 10000);
        let (agg, outcome) = refresh_month(&mut sheet, day(2)).expect("refresh");
        assert_eq!(outcome, UpsertOutcome::Updated { row: 0 });

        let rows = sheet.read_all_summary_rows().expect("read");
        assert_eq!(rows[0].cells, agg.to_cells());
        assert_eq!(rows[0].get("🍽️ Makan"), Some(&Cell::Int(25000)));
        assert_eq!(rows[0].get("💰 Total"), Some(&Cell::Int(35000)));
    }

    #[test]
    fn duplicate_labels_only_touch_the_first_match() {
        let stale = SummaryRow {
            cells: {
                let mut cells = vec![Cell::from("August 2025")];
                cells.extend((0..7).map(|_| Cell::Int(1)));
                cells
            },
        };
        let mut sheet = MemorySheet {
            summary: vec![stale.clone(), stale.clone()],
            ..MemorySheet::default()
        };
        push(&mut sheet, day(5), "belanja", 12000);

        let (agg, outcome) = refresh_month(&mut sheet, day(5)).expect("refresh");
        assert_eq!(outcome, UpsertOutcome::Updated { row: 0 });
        assert_eq!(sheet.summary[0].cells, agg.to_cells());
        assert_eq!(sheet.summary[1], stale);
    }

    #[test]
    fn unknown_category_lands_in_lainnya_column() {
        let mut sheet = SqliteSheet::open_in_memory().expect("open");
        push(&mut sheet, day(4), "hobi", 40000);
        push(&mut sheet, day(4), "lainnya", 2000);

        refresh_month(&mut sheet, day(4)).expect("refresh");
        let rows = sheet.read_all_summary_rows().expect("read");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("📦 Lainnya"), Some(&Cell::Int(42000)));
        assert_eq!(rows[0].get("💰 Total"), Some(&Cell::Int(42000)));

        let ledger = sheet.read_all_records().expect("read");
        assert_eq!(ledger[0].category, Cell::from("Hobi"));
    }

    #[test]
    fn sqlite_upsert_keeps_one_row_per_month() {
        let mut sheet = SqliteSheet::open_in_memory().expect("open");
        push(&mut sheet, day(1), "makan", 25000);
        refresh_month(&mut sheet, day(1)).expect("refresh");
        push(&mut sheet, day(2), "makan", 25000);
        refresh_month(&mut sheet, day(2)).expect("refresh");
        refresh_month(&mut sheet, day(2)).expect("refresh");

        let sept = NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date");
        push(&mut sheet, sept, "transport", 10000);
        let (_, outcome) = refresh_month(&mut sheet, sept).expect("refresh");
        assert_eq!(outcome, UpsertOutcome::Appended { row: 1 });

        let rows = sheet.read_all_summary_rows().expect("read");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period_label(), "August 2025");
        assert_eq!(rows[0].get("🍽️ Makan"), Some(&Cell::Int(50000)));
        assert_eq!(rows[1].period_label(), "September 2025");
        assert_eq!(rows[1].get("💰 Total"), Some(&Cell::Int(10000)));
    }
}
