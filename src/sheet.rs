use anyhow::Context;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{AppPaths, ledger_slug};
use crate::domain::{Cell, ExpenseRecord, LedgerRow};

pub const LEDGER_HEADERS: [&str; 7] = [
    "📅 Tanggal",
    "⏰ Waktu",
    "🏷️ Kategori",
    "📝 Deskripsi",
    "💰 Jumlah (Rp)",
    "👤 User ID",
    "📊 Status",
];

pub const SUMMARY_HEADERS: [&str; 8] = [
    "📅 Bulan-Tahun",
    "🍽️ Makan",
    "🚗 Transport",
    "🛒 Belanja",
    "🎮 Hiburan",
    "💊 Kesehatan",
    "📦 Lainnya",
    "💰 Total",
];

const SUMMARY_COLUMNS: [&str; 8] = [
    "bulan_tahun",
    "makan",
    "transport",
    "belanja",
    "hiburan",
    "kesehatan",
    "lainnya",
    "total",
];

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet storage failed: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("summary cell ({row}, {col}) is out of range")]
    OutOfRange { row: usize, col: usize },
    #[error("summary row must have {expected} cells, got {got}")]
    RowShape { expected: usize, got: usize },
}

/// One row of the monthly summary table, in [`SUMMARY_HEADERS`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub cells: Vec<Cell>,
}

impl SummaryRow {
    pub fn get(&self, header: &str) -> Option<&Cell> {
        let idx = SUMMARY_HEADERS.iter().position(|h| *h == header)?;
        self.cells.get(idx)
    }

    pub fn period_label(&self) -> String {
        self.get(SUMMARY_HEADERS[0])
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// The tabular store behind the ledger and its summary table.
///
/// Reads must reflect every earlier write. Row indexes are zero-based positions in
/// [`Sheet::read_all_summary_rows`] order.
pub trait Sheet {
    fn read_all_records(&self) -> Result<Vec<LedgerRow>, SheetError>;
    fn append_record(&mut self, record: &ExpenseRecord) -> Result<(), SheetError>;
    fn read_all_summary_rows(&self) -> Result<Vec<SummaryRow>, SheetError>;
    fn update_summary_cell(&mut self, row: usize, col: usize, value: Cell)
    -> Result<(), SheetError>;
    fn append_summary_row(&mut self, cells: Vec<Cell>) -> Result<(), SheetError>;

    /// Writes several cells of one summary row. Stores that can should apply the
    /// whole batch or none of it.
    fn update_summary_cells(
        &mut self,
        row: usize,
        updates: Vec<(usize, Cell)>,
    ) -> Result<(), SheetError> {
        for (col, value) in updates {
            self.update_summary_cell(row, col, value)?;
        }
        Ok(())
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Empty => ToSqlOutput::Owned(Value::Null),
            Cell::Int(n) => ToSqlOutput::from(*n),
            Cell::Float(x) => ToSqlOutput::from(*x),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Empty,
            ValueRef::Integer(n) => Cell::Int(n),
            ValueRef::Real(x) => Cell::Float(x),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Cell::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        })
    }
}

/// SQLite-backed sheet. Cell columns carry no type affinity, so whatever was written
/// (or hand-edited) comes back as-is.
pub struct SqliteSheet {
    conn: Connection,
}

impl SqliteSheet {
    pub fn open(paths: &AppPaths, ledger_name: &str) -> anyhow::Result<(Self, PathBuf)> {
        let slug = ledger_slug(ledger_name);
        let dir = paths.data_dir.join("ledgers").join(slug);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create ledger dir {}", dir.display()))?;

        let db_path = dir.join("catat.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open DB {}", db_path.display()))?;

        let sheet = Self { conn };
        sheet.migrate()?;
        Ok((sheet, db_path))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let sheet = Self {
            conn: Connection::open_in_memory()?,
        };
        sheet.migrate()?;
        Ok(sheet)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ledger (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                tanggal,
                waktu,
                kategori,
                deskripsi,
                jumlah,
                user_id,
                status
            );

            CREATE TABLE IF NOT EXISTS summary (
                row_pos INTEGER PRIMARY KEY,
                bulan_tahun,
                makan,
                transport,
                belanja,
                hiburan,
                kesehatan,
                lainnya,
                total
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_summary_period ON summary(bulan_tahun);
            "#,
        )?;
        Ok(())
    }

    fn summary_row_pos(&self, row: usize) -> Result<Option<i64>, SheetError> {
        let mut stmt = self
            .conn
            .prepare("SELECT row_pos FROM summary ORDER BY row_pos ASC LIMIT 1 OFFSET ?1")?;
        let mut rows = stmt.query([row as i64])?;
        match rows.next()? {
            Some(r) => Ok(Some(r.get(0)?)),
            None => Ok(None),
        }
    }
}

impl Sheet for SqliteSheet {
    fn read_all_records(&self) -> Result<Vec<LedgerRow>, SheetError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT tanggal, waktu, kategori, deskripsi, jumlah, user_id, status
            FROM ledger
            ORDER BY row_id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(LedgerRow {
                date: row.get(0)?,
                time: row.get(1)?,
                category: row.get(2)?,
                description: row.get(3)?,
                amount: row.get(4)?,
                user_id: row.get(5)?,
                status: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn append_record(&mut self, record: &ExpenseRecord) -> Result<(), SheetError> {
        self.conn.execute(
            r#"
            INSERT INTO ledger (tanggal, waktu, kategori, deskripsi, jumlah, user_id, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params_from_iter(record.to_cells()),
        )?;
        Ok(())
    }

    fn read_all_summary_rows(&self) -> Result<Vec<SummaryRow>, SheetError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM summary ORDER BY row_pos ASC",
            SUMMARY_COLUMNS.join(", ")
        ))?;

        let rows = stmt.query_map([], |row| {
            let mut cells = Vec::with_capacity(SUMMARY_COLUMNS.len());
            for i in 0..SUMMARY_COLUMNS.len() {
                cells.push(row.get::<_, Cell>(i)?);
            }
            Ok(SummaryRow { cells })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn update_summary_cell(
        &mut self,
        row: usize,
        col: usize,
        value: Cell,
    ) -> Result<(), SheetError> {
        let column = SUMMARY_COLUMNS
            .get(col)
            .ok_or(SheetError::OutOfRange { row, col })?;
        let row_pos = self
            .summary_row_pos(row)?
            .ok_or(SheetError::OutOfRange { row, col })?;

        self.conn.execute(
            &format!("UPDATE summary SET {column} = ?1 WHERE row_pos = ?2"),
            rusqlite::params![value, row_pos],
        )?;
        Ok(())
    }

    fn update_summary_cells(
        &mut self,
        row: usize,
        updates: Vec<(usize, Cell)>,
    ) -> Result<(), SheetError> {
        let first_col = updates.first().map_or(0, |(col, _)| *col);
        let row_pos = self
            .summary_row_pos(row)?
            .ok_or(SheetError::OutOfRange { row, col: first_col })?;

        // Dropping the transaction on an early return rolls it back.
        let tx = self.conn.transaction()?;
        for (col, value) in updates {
            let column = SUMMARY_COLUMNS
                .get(col)
                .ok_or(SheetError::OutOfRange { row, col })?;
            tx.execute(
                &format!("UPDATE summary SET {column} = ?1 WHERE row_pos = ?2"),
                rusqlite::params![value, row_pos],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn append_summary_row(&mut self, cells: Vec<Cell>) -> Result<(), SheetError> {
        if cells.len() != SUMMARY_COLUMNS.len() {
            return Err(SheetError::RowShape {
                expected: SUMMARY_COLUMNS.len(),
                got: cells.len(),
            });
        }

        self.conn.execute(
            &format!(
                "INSERT INTO summary (row_pos, {}) VALUES ((SELECT COALESCE(MAX(row_pos), 0) + 1 FROM summary), ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                SUMMARY_COLUMNS.join(", ")
            ),
            params_from_iter(cells),
        )?;
        Ok(())
    }
}

/// Vec-backed sheet that, unlike [`SqliteSheet`], lets duplicate period labels exist.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySheet {
    pub records: Vec<LedgerRow>,
    pub summary: Vec<SummaryRow>,
    pub fail_writes: bool,
    pub fail_summary_writes: bool,
    pub cell_writes: usize,
}

#[cfg(test)]
impl MemorySheet {
    fn check_writable(&self) -> Result<(), SheetError> {
        if self.fail_writes {
            return Err(SheetError::Storage(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }

    fn check_summary_writable(&self) -> Result<(), SheetError> {
        if self.fail_summary_writes {
            return Err(SheetError::Storage(rusqlite::Error::InvalidQuery));
        }
        self.check_writable()
    }
}

#[cfg(test)]
impl Sheet for MemorySheet {
    fn read_all_records(&self) -> Result<Vec<LedgerRow>, SheetError> {
        Ok(self.records.clone())
    }

    fn append_record(&mut self, record: &ExpenseRecord) -> Result<(), SheetError> {
        self.check_writable()?;
        self.records.push(LedgerRow::from(record));
        Ok(())
    }

    fn read_all_summary_rows(&self) -> Result<Vec<SummaryRow>, SheetError> {
        Ok(self.summary.clone())
    }

    fn update_summary_cell(
        &mut self,
        row: usize,
        col: usize,
        value: Cell,
    ) -> Result<(), SheetError> {
        self.check_summary_writable()?;
        let cell = self
            .summary
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(col))
            .ok_or(SheetError::OutOfRange { row, col })?;
        *cell = value;
        self.cell_writes += 1;
        Ok(())
    }

    fn append_summary_row(&mut self, cells: Vec<Cell>) -> Result<(), SheetError> {
        self.check_summary_writable()?;
        self.summary.push(SummaryRow { cells });
        Ok(())
    }
}
