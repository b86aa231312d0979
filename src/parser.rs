use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::domain::ParsedExpense;

pub const FORMAT_HINT: &str = "❌ Format pesan salah. Ketik `catat guide` untuk panduan.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{}", FORMAT_HINT)]
    NoMatch,
}

fn expense_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\w+)\s+([0-9]+)\s+(.+)$").expect("invalid expense regex")
    })
}

/// Parses `<category> <amount> <description...>`.
///
/// Only the whole message is trimmed; any whitespace run separates the three fields.
/// An amount too large for `i64` is treated like any other malformed message.
pub fn parse_expense_message(text: &str) -> Result<ParsedExpense, ParseError> {
    let caps = expense_re()
        .captures(text.trim())
        .ok_or(ParseError::NoMatch)?;

    let amount = caps[2].parse::<i64>().map_err(|_| ParseError::NoMatch)?;

    Ok(ParsedExpense {
        category: caps[1].to_lowercase(),
        amount,
        description: caps[3].to_string(),
    })
}
