mod aggregate;
mod amount;
mod cli;
mod config;
mod domain;
mod ledger;
mod parser;
mod report;
mod sheet;
mod summary;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::aggregate::{Period, collect_view};
use crate::amount::format_rupiah;
use crate::cli::{AddArgs, Cli, Command, LedgerArgs, ViewArgs};
use crate::config::{AppConfig, app_paths, load_or_init_config, write_config};
use crate::ledger::{RecordError, Recorded, record_expense};
use crate::report::{render_combined, render_daily, render_monthly};
use crate::sheet::{LEDGER_HEADERS, SUMMARY_HEADERS, Sheet, SqliteSheet};
use crate::summary::UpsertOutcome;

const GUIDE: &str = "📖 PANDUAN PENGGUNAAN

Catat pengeluaran dengan format:
  catat add <kategori> <jumlah> <deskripsi>

Contoh:
  catat add makan 25000 nasi goreng
  catat add transport 10000 ojek ke kantor

Kategori: makan, transport, belanja, hiburan, kesehatan, lainnya.
Kategori lain tetap dicatat apa adanya, tapi dihitung sebagai Lainnya.
Jumlah ditulis tanpa titik atau koma.

Perintah lain:
  catat start      — sapaan pembuka
  catat guide      — panduan ini
  catat ringkasan  — ringkasan harian dan bulanan";

fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;
    init_tracing(&cfg.log_filter);

    match cli.command {
        Command::Start(args) => {
            let name = args.name.as_deref().unwrap_or("User");
            println!("🤖 Halo {name}! Selamat datang di catat, pencatat pengeluaran!");
            println!("Ketik `catat guide` untuk panduan.");
            Ok(())
        }
        Command::Guide => {
            println!("{GUIDE}");
            Ok(())
        }
        Command::User { id } => {
            cfg.default_user = Some(id.clone());
            write_config(&cfg_path, &cfg)?;
            println!("Default user set to {id}.");
            Ok(())
        }
        cmd => {
            let (mut sheet, db_path) = SqliteSheet::open(&paths, &cfg.ledger_name)?;

            match cmd {
                Command::Add(args) => {
                    handle_add(&mut sheet, &cfg, args)?;
                    tracing::debug!(db = %db_path.display(), "ledger written");
                }
                Command::Today(args) => {
                    let (user, now) = resolve_view(&cfg, &args)?;
                    let rows = sheet.read_all_records()?;
                    let view = collect_view(&rows, Period::Day(now.date()), Some(&user));
                    println!("{}", render_daily(&view, now.date()).trim_end());
                }
                Command::Month(args) => {
                    let (user, now) = resolve_view(&cfg, &args)?;
                    let rows = sheet.read_all_records()?;
                    let view = collect_view(&rows, Period::month_of(now.date()), Some(&user));
                    println!("{}", render_monthly(&view, now.date()).trim_end());
                }
                Command::Summary(args) => {
                    let (user, now) = resolve_view(&cfg, &args)?;
                    let rows = sheet.read_all_records()?;
                    let today = now.date();
                    let daily = collect_view(&rows, Period::Day(today), Some(&user));
                    let monthly = collect_view(&rows, Period::month_of(today), Some(&user));
                    println!("{}", render_combined(&daily, &monthly, today));
                }
                Command::Sheet => print_summary_sheet(&sheet)?,
                Command::Ledger(args) => print_ledger(&sheet, &args)?,
                Command::Start(_) | Command::Guide | Command::User { .. } => unreachable!(),
            }

            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_add(sheet: &mut SqliteSheet, cfg: &AppConfig, args: AddArgs) -> Result<()> {
    let (user, now) = resolve_view(cfg, &args.view)?;
    let text = args.text.join(" ");

    let recorded = match record_expense(sheet, &text, &user, now) {
        Ok(recorded) => recorded,
        Err(err @ RecordError::Parse(_)) => return Err(err.into()),
        Err(err @ RecordError::Append(_)) => {
            return Err(anyhow::Error::new(err).context("❌ Gagal menyimpan pengeluaran."));
        }
    };

    let record = recorded.record();
    println!("✅ Pengeluaran berhasil dicatat!");
    println!(
        "{} - {} - {}",
        record.category.display(),
        format_rupiah(record.amount),
        record.description
    );

    match recorded {
        Recorded::Complete {
            summary, outcome, ..
        } => {
            let (verb, row) = match outcome {
                UpsertOutcome::Updated { row } => ("updated", row),
                UpsertOutcome::Appended { row } => ("added", row),
            };
            println!(
                "Monthly summary {verb} for {} ({}, row {}): {}",
                summary.label,
                summary.period,
                row + 1,
                format_rupiah(summary.totals.total())
            );
        }
        Recorded::SummaryStale { error, .. } => {
            eprintln!("⚠️ Ringkasan bulanan belum diperbarui: {error}");
        }
    }
    Ok(())
}

fn resolve_view(cfg: &AppConfig, args: &ViewArgs) -> Result<(String, NaiveDateTime)> {
    let user = args
        .user
        .clone()
        .or_else(|| cfg.default_user.clone())
        .context("No user given. Pass --user, set CATAT_USER, or run `catat user <id>`")?;
    let now = parse_at_or_now(args.at.as_deref())?;
    Ok((user, now))
}

fn parse_at_or_now(raw: Option<&str>) -> Result<NaiveDateTime> {
    let Some(s) = raw else {
        return Ok(Local::now().naive_local());
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .with_context(|| format!("Invalid --at timestamp: {s}"))
}

fn parse_month(raw: &str) -> Result<Period> {
    let (y, m) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("Invalid --month. Expected YYYY-MM"))?;
    let year: i32 = y.parse().context("Invalid --month year")?;
    let month: u32 = m.parse().context("Invalid --month value")?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid --month. Expected YYYY-MM"))?;
    Ok(Period::month_of(first))
}

fn print_ledger(sheet: &SqliteSheet, args: &LedgerArgs) -> Result<()> {
    let period = args.month.as_deref().map(parse_month).transpose()?;
    let rows: Vec<Vec<String>> = sheet
        .read_all_records()?
        .iter()
        .filter(|r| period.is_none_or(|p| p.matches(&r.date.to_string())))
        .map(|r| r.cells().iter().map(|c| c.to_string()).collect())
        .collect();

    if rows.is_empty() {
        println!("(no expenses)");
        return Ok(());
    }
    print_table(&LEDGER_HEADERS, &rows);
    Ok(())
}

fn print_summary_sheet(sheet: &SqliteSheet) -> Result<()> {
    let rows: Vec<Vec<String>> = sheet
        .read_all_summary_rows()?
        .iter()
        .map(|r| r.cells.iter().map(|c| c.to_string()).collect())
        .collect();

    if rows.is_empty() {
        println!("(no monthly summary yet)");
        return Ok(());
    }
    print_table(&SUMMARY_HEADERS, &rows);
    Ok(())
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if headers.is_empty() {
        println!("(no columns)");
        return;
    }

    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w.saturating_sub(cell.chars().count());
            print!(" {cell}{} |", " ".repeat(pad));
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}
