use tracing::debug;

use crate::domain::Cell;

/// Coerces a stored cell into an integer amount. Never fails.
///
/// Numbers are truncated. Text keeps only ASCII digits and minus signs and is parsed
/// from there, so `"Rp 25.000"` reads as 25000. Anything left unparseable counts as 0.
pub fn to_int(cell: &Cell) -> i64 {
    match cell {
        Cell::Int(n) => *n,
        // `as` saturates and maps NaN to 0.
        Cell::Float(x) => x.trunc() as i64,
        Cell::Empty => 0,
        Cell::Text(raw) => {
            let cleaned: String = raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            if cleaned.is_empty() || cleaned == "-" {
                if !raw.trim().is_empty() {
                    debug!(value = %raw, "amount has no digits, counting as 0");
                }
                return 0;
            }
            cleaned.parse::<i64>().unwrap_or_else(|_| {
                debug!(value = %raw, "amount is not an integer, counting as 0");
                0
            })
        }
    }
}

/// Groups digits by thousands: `1234567` -> `"1,234,567"`.
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_rupiah(amount: i64) -> String {
    format!("Rp {}", group_thousands(amount))
}
