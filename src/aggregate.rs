use chrono::{Datelike, NaiveDate};
use std::fmt;
use tracing::debug;

use crate::amount::to_int;
use crate::domain::{KnownCategory, LedgerRow};

/// Time window a ledger scan is restricted to.
///
/// Matching is textual against the stored date cell: a day must equal `YYYY-MM-DD`, a
/// month must be a `YYYY-MM` prefix. Dates stored in any other shape never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn key(&self) -> String {
        match self {
            Period::Day(date) => date.format("%Y-%m-%d").to_string(),
            Period::Month { year, month } => format!("{year:04}-{month:02}"),
        }
    }

    pub fn matches(&self, raw_date: &str) -> bool {
        match self {
            Period::Day(_) => raw_date == self.key(),
            Period::Month { .. } => raw_date.starts_with(&self.key()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Per-category totals over the six fixed buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    amounts: [i64; 6],
}

impl CategoryTotals {
    pub fn add(&mut self, bucket: KnownCategory, amount: i64) {
        let slot = &mut self.amounts[bucket.index()];
        *slot = slot.saturating_add(amount);
    }

    pub fn get(&self, bucket: KnownCategory) -> i64 {
        self.amounts[bucket.index()]
    }

    /// Always the sum of the six buckets.
    pub fn total(&self) -> i64 {
        self.amounts.iter().fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (KnownCategory, i64)> + '_ {
        KnownCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// What a single scan of the ledger yields for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodView {
    pub count: usize,
    pub totals: CategoryTotals,
    /// Buckets in the order their first record appeared.
    seen: Vec<KnownCategory>,
}

impl PeriodView {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn total(&self) -> i64 {
        self.totals.total()
    }

    pub fn by_first_seen(&self) -> Vec<(KnownCategory, i64)> {
        self.seen.iter().map(|c| (*c, self.totals.get(*c))).collect()
    }

    /// All six buckets, largest first. Ties keep canonical category order.
    pub fn by_amount(&self) -> Vec<(KnownCategory, i64)> {
        let mut rows: Vec<_> = self.totals.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// Scans every row and accumulates the ones inside `period` (and owned by `user`, if
/// given). Unknown categories count towards `lainnya`; unreadable amounts count as 0.
pub fn collect_view(rows: &[LedgerRow], period: Period, user: Option<&str>) -> PeriodView {
    let mut view = PeriodView {
        count: 0,
        totals: CategoryTotals::default(),
        seen: Vec::new(),
    };

    for row in rows {
        if row.date.is_empty() {
            debug!(category = %row.category, "skipping ledger row without a date");
            continue;
        }
        let date = row.date.to_string();
        if !period.matches(&date) {
            debug!(date = %date, period = %period, "skipping ledger row outside period");
            continue;
        }
        if let Some(user) = user {
            if !row.belongs_to(user) {
                debug!(owner = %row.user_id, "skipping ledger row of another user");
                continue;
            }
        }

        let bucket = row.category().bucket();
        view.totals.add(bucket, to_int(&row.amount));
        view.count += 1;
        if !view.seen.contains(&bucket) {
            view.seen.push(bucket);
        }
    }

    view
}

pub fn aggregate(rows: &[LedgerRow], period: Period, user: Option<&str>) -> CategoryTotals {
    collect_view(rows, period, user).totals
}
