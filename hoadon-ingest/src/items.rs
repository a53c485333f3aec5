//! Sliding-window item extraction from tag-stripped row cells.
//!
//! A plausible order line is four consecutive cells: name, quantity, unit,
//! price. Anything malformed is skipped silently; a false negative is cheaper
//! than a corrupted total.

use anyhow::Result;
use hoadon_core::{normalize_unit, parse_grouped};
use regex::Regex;

use crate::types::RawRecord;

const QTY_MIN: u32 = 1;
const QTY_MAX: u32 = 200;
const PRICE_MIN: f64 = 500.0;
const PRICE_MAX: f64 = 2_000_000.0;

/// Header and echo strings that can never be item names.
const NAME_STOPLIST: [&str; 3] = ["STT", "Mã hoá đơn", "Simple Place"];

/// Preparation notes, payment-method echoes and styling artifacts that leak
/// into name cells.
const NOISE_PATTERNS: [&str; 13] = [
    r"\bcrispy\b",
    r"\bsoft\b",
    r"cut in 4",
    r"- edit\s*$",
    r"đổi phương thức",
    r"\bpayment\b",
    r"\btransfer\b",
    r"\bcod\b",
    r"\batm\b",
    r"background-color",
    r"vertical-align",
    r"ghi chú",
    r"giảm sốt",
];

pub struct ItemExtractor {
    noise: Vec<Regex>,
}

impl ItemExtractor {
    pub fn new() -> Result<Self> {
        let noise = NOISE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<_, _>>()?;
        Ok(Self { noise })
    }

    /// Slide the window across all valid start offsets. At most one candidate
    /// per offset; genuinely identical orders at different offsets or in
    /// different rows are kept.
    pub fn extract(&self, cells: &[String]) -> Vec<RawRecord> {
        if cells.len() < 4 {
            return Vec::new();
        }
        (0..=cells.len() - 4)
            .filter_map(|start| self.candidate(&cells[start..start + 4]))
            .collect()
    }

    fn candidate(&self, window: &[String]) -> Option<RawRecord> {
        let qty_cell = window[1].trim();
        if qty_cell.is_empty() || !qty_cell.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let quantity: u32 = qty_cell.parse().ok()?;
        if !(QTY_MIN..=QTY_MAX).contains(&quantity) {
            return None;
        }

        let price = parse_grouped(window[3].trim())?;
        if !(PRICE_MIN..=PRICE_MAX).contains(&price) {
            return None;
        }

        let name = window[0].trim();
        if name.chars().count() <= 2
            || name.chars().all(|c| c.is_ascii_digit())
            || NAME_STOPLIST.contains(&name)
        {
            return None;
        }
        let lower = name.to_lowercase();
        if self.noise.iter().any(|re| re.is_match(&lower)) {
            return None;
        }

        Some(RawRecord {
            name: name.to_string(),
            quantity,
            unit: normalize_unit(&window[2]),
            price,
        })
    }
}
