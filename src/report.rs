use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::aggregate::PeriodView;
use crate::amount::format_rupiah;

pub const NO_EXPENSES_TODAY: &str = "📊 Belum ada pengeluaran hari ini.";
pub const NO_EXPENSES_THIS_MONTH: &str = "📊 Belum ada pengeluaran bulan ini.";

/// `total / day_of_month`, rounded to the nearest rupiah with halves going to the even
/// neighbour.
pub fn daily_average(total: i64, day_of_month: u32) -> i64 {
    if day_of_month == 0 {
        return 0;
    }
    (total as f64 / f64::from(day_of_month)).round_ties_even() as i64
}

/// Share of `total`, in percent. 0 when `total` is 0.
pub fn percentage(amount: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    amount as f64 / total as f64 * 100.0
}

struct DailyReport<'a> {
    view: &'a PeriodView,
    today: NaiveDate,
}

impl fmt::Display for DailyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        writeln!(f, "📊 RINGKASAN PENGELUARAN HARI INI")?;
        writeln!(f, "📅 Tanggal: {}", self.today.format("%d %B %Y"))?;
        writeln!(f)?;
        writeln!(f, "📝 Jumlah transaksi: {}", view.count)?;
        writeln!(f, "💰 Total pengeluaran: {}", format_rupiah(view.total()))?;
        writeln!(f)?;
        writeln!(f, "📋 PENGELUARAN PER KATEGORI HARI INI:")?;
        for (category, amount) in view.by_first_seen() {
            writeln!(
                f,
                "{} {}: {}",
                category.icon(),
                category.label(),
                format_rupiah(amount)
            )?;
        }
        Ok(())
    }
}

struct MonthlyReport<'a> {
    view: &'a PeriodView,
    today: NaiveDate,
}

impl fmt::Display for MonthlyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let total = view.total();
        writeln!(f, "📊 RINGKASAN PENGELUARAN BULAN INI")?;
        writeln!(f, "📅 Bulan: {}", self.today.format("%B %Y"))?;
        writeln!(f)?;
        writeln!(f, "📝 Total transaksi: {}", view.count)?;
        writeln!(f, "💰 Total pengeluaran: {}", format_rupiah(total))?;
        writeln!(
            f,
            "📊 Rata-rata per hari: {}",
            format_rupiah(daily_average(total, self.today.day()))
        )?;
        writeln!(f)?;
        writeln!(f, "📋 PENGELUARAN PER KATEGORI BULAN INI:")?;
        for (category, amount) in view.by_amount() {
            writeln!(
                f,
                "{} {}: {} ({:.1}%)",
                category.icon(),
                category.label(),
                format_rupiah(amount),
                percentage(amount, total)
            )?;
        }
        Ok(())
    }
}

/// Today's view for one user. Categories appear in the order they were first spent on.
pub fn render_daily(view: &PeriodView, today: NaiveDate) -> String {
    if view.is_empty() {
        return NO_EXPENSES_TODAY.to_string();
    }
    DailyReport { view, today }.to_string()
}

/// This month's view for one user: all six buckets, largest first, with their share.
pub fn render_monthly(view: &PeriodView, today: NaiveDate) -> String {
    if view.is_empty() {
        return NO_EXPENSES_THIS_MONTH.to_string();
    }
    MonthlyReport { view, today }.to_string()
}

pub fn render_combined(daily: &PeriodView, monthly: &PeriodView, today: NaiveDate) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        render_daily(daily, today).trim_end(),
        "=".repeat(40),
        render_monthly(monthly, today).trim_end()
    )
}
