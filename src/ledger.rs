use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ExpenseRecord;
use crate::parser::{ParseError, parse_expense_message};
use crate::sheet::{Sheet, SheetError};
use crate::summary::{MonthlyAggregate, UpsertOutcome, refresh_month};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to append expense to the ledger: {0}")]
    Append(#[source] SheetError),
}

#[derive(Debug)]
pub enum Recorded {
    /// Record appended and the month's summary row upserted.
    Complete {
        record: ExpenseRecord,
        summary: MonthlyAggregate,
        outcome: UpsertOutcome,
    },
    /// Record appended, but the summary could not be refreshed.
    SummaryStale {
        record: ExpenseRecord,
        error: SheetError,
    },
}

impl Recorded {
    pub fn record(&self) -> &ExpenseRecord {
        match self {
            Recorded::Complete { record, .. } | Recorded::SummaryStale { record, .. } => record,
        }
    }
}

/// Parses `text`, appends it as a ledger row stamped `at`, then refreshes that month's
/// summary. Nothing is written when parsing fails, and the summary is not touched
/// when the append fails.
pub fn record_expense<S: Sheet + ?Sized>(
    sheet: &mut S,
    text: &str,
    user_id: &str,
    at: NaiveDateTime,
) -> Result<Recorded, RecordError> {
    let parsed = parse_expense_message(text)?;
    let record = ExpenseRecord::new(parsed, user_id, at);

    sheet.append_record(&record).map_err(RecordError::Append)?;
    info!(
        user = %record.user_id,
        category = %record.category.display(),
        amount = record.amount,
        description = %record.description,
        "expense recorded"
    );

    match refresh_month(sheet, record.date) {
        Ok((summary, outcome)) => Ok(Recorded::Complete {
            record,
            summary,
            outcome,
        }),
        Err(error) => {
            warn!(error = %error, "monthly summary not refreshed");
            Ok(Recorded::SummaryStale { record, error })
        }
    }
}
