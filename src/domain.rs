use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Status marker written on every ledger row.
pub const STATUS_RECORDED: &str = "✅ Berhasil";

/// The closed category set. `Lainnya` doubles as the fallback bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownCategory {
    Makan,
    Transport,
    Belanja,
    Hiburan,
    Kesehatan,
    Lainnya,
}

impl KnownCategory {
    /// Canonical order, also the summary table's column order.
    pub const ALL: [KnownCategory; 6] = [
        KnownCategory::Makan,
        KnownCategory::Transport,
        KnownCategory::Belanja,
        KnownCategory::Hiburan,
        KnownCategory::Kesehatan,
        KnownCategory::Lainnya,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KnownCategory::Makan => "makan",
            KnownCategory::Transport => "transport",
            KnownCategory::Belanja => "belanja",
            KnownCategory::Hiburan => "hiburan",
            KnownCategory::Kesehatan => "kesehatan",
            KnownCategory::Lainnya => "lainnya",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn icon(self) -> &'static str {
        match self {
            KnownCategory::Makan => "🍽️",
            KnownCategory::Transport => "🚗",
            KnownCategory::Belanja => "🛒",
            KnownCategory::Hiburan => "🎮",
            KnownCategory::Kesehatan => "💊",
            KnownCategory::Lainnya => "📦",
        }
    }

    pub fn label(self) -> String {
        title_case(self.as_str())
    }
}

/// A category as the user typed it.
///
/// Unknown words are kept verbatim so the ledger shows what was written, but every
/// roll-up treats them as [`KnownCategory::Lainnya`] (see [`Category::bucket`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Known(KnownCategory),
    Other(String),
}

impl Category {
    /// Resolves a raw token. Matching is case-insensitive; surrounding whitespace is ignored.
    pub fn resolve(token: &str) -> Self {
        let lowered = token.trim().to_lowercase();
        match KnownCategory::from_token(&lowered) {
            Some(known) => Category::Known(known),
            None => Category::Other(lowered),
        }
    }

    pub fn bucket(&self) -> KnownCategory {
        match self {
            Category::Known(known) => *known,
            Category::Other(_) => KnownCategory::Lainnya,
        }
    }

    /// Title-cased form written to the ledger's category column.
    pub fn display(&self) -> String {
        match self {
            Category::Known(known) => known.label(),
            Category::Other(raw) => title_case(raw),
        }
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// One unformatted cell value, as a tabular store hands it back.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Stores numeric-looking identifiers as integers, everything else as text.
    pub fn from_identifier(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Cell::Int(n),
            _ => Cell::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

/// Output of a successful message parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExpense {
    /// Lower-cased category token.
    pub category: String,
    pub amount: i64,
    pub description: String,
}

/// A ledger row about to be written. Never mutated once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: Category,
    pub description: String,
    pub amount: i64,
    pub user_id: String,
    pub status: String,
}

impl ExpenseRecord {
    pub fn new(parsed: ParsedExpense, user_id: &str, at: NaiveDateTime) -> Self {
        Self {
            date: at.date(),
            time: at.time(),
            category: Category::resolve(&parsed.category),
            description: parsed.description,
            amount: parsed.amount,
            user_id: user_id.to_string(),
            status: STATUS_RECORDED.to_string(),
        }
    }

    /// Cells in ledger column order.
    pub fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.date.format("%Y-%m-%d").to_string()),
            Cell::Text(self.time.format("%H:%M:%S").to_string()),
            Cell::Text(self.category.display()),
            Cell::Text(self.description.clone()),
            Cell::Int(self.amount),
            Cell::from_identifier(&self.user_id),
            Cell::Text(self.status.clone()),
        ]
    }
}

/// A ledger row read back from the store. Cells may have been edited by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub date: Cell,
    pub time: Cell,
    pub category: Cell,
    pub description: Cell,
    pub amount: Cell,
    pub user_id: Cell,
    pub status: Cell,
}

impl LedgerRow {
    pub fn category(&self) -> Category {
        Category::resolve(&self.category.to_string())
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.to_string() == user_id
    }

    pub fn cells(&self) -> [&Cell; 7] {
        [
            &self.date,
            &self.time,
            &self.category,
            &self.description,
            &self.amount,
            &self.user_id,
            &self.status,
        ]
    }
}

impl From<&ExpenseRecord> for LedgerRow {
    fn from(record: &ExpenseRecord) -> Self {
        let mut cells = record.to_cells().into_iter();
        let mut next = || cells.next().unwrap_or(Cell::Empty);
        LedgerRow {
            date: next(),
            time: next(),
            category: next(),
            description: next(),
            amount: next(),
            user_id: next(),
            status: next(),
        }
    }
}
