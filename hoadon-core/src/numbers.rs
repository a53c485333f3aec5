//! Thousands-grouped amount parsing and formatting.
//!
//! POS exports group amounts inconsistently ("1.080.000", "55,000", "118 800"),
//! so separators are stripped before parsing and the cell is only accepted when
//! nothing but digits remains.

/// Parse a grouped amount cell into a value, requiring at least `min_digits`
/// digits. Returns `None` for anything that is not purely numeric after
/// separator stripping.
pub fn parse_grouped_min_digits(cell: &str, min_digits: usize) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '.'))
        .collect();
    if cleaned.len() < min_digits || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a grouped amount cell with no minimum digit count.
pub fn parse_grouped(cell: &str) -> Option<f64> {
    parse_grouped_min_digits(cell, 1)
}

/// Format an integral amount with dot thousands separators: 118800 -> "118.800".
pub fn format_grouped(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    if amount < 0 {
        format!("-{out}")
    } else {
        out
    }
}
