//! Menu name matching: exact normalized lookup with a fuzzy token-overlap
//! fallback.
//!
//! POS item names drift from the menu ("Tacos Beef extra", "taco ga (spicy)"),
//! so raw names go through qualifier stripping, singular/plural variants and,
//! when exact lookup misses, overlap scoring against the English segment of
//! each catalog entry. Unmatched names pass through unchanged; downstream
//! stages tolerate them.

use anyhow::Result;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;

/// Lookup structure built once per catalog snapshot.
pub struct MenuIndex {
    /// Normalized key (full bilingual name or English segment) -> canonical name.
    exact: HashMap<String, String>,
    /// (canonical name, cleaned lowercase English segment) for fallback scoring.
    entries: Vec<(String, String)>,
    spicy_re: Regex,
    extra_tail_re: Regex,
    plural_extra_re: Regex,
    punct_re: Regex,
}

impl MenuIndex {
    pub fn new(catalog: &Catalog) -> Result<MenuIndex> {
        let punct_re = Regex::new(r"[^\w\s]")?;
        let mut exact: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::with_capacity(catalog.len());

        for item in catalog.items() {
            let canonical = item.name.clone();
            let eng = item.foreign_name().to_lowercase();
            // First catalog entry wins on key collisions.
            for key in [
                normalize_key(&punct_re, &item.name),
                normalize_key(&punct_re, &eng),
            ] {
                exact.entry(key).or_insert_with(|| canonical.clone());
            }
            entries.push((canonical, clean_words(&punct_re, &eng)));
        }

        Ok(MenuIndex {
            exact,
            entries,
            spicy_re: Regex::new(r"\s*\(spicy\)\s*")?,
            extra_tail_re: Regex::new(r"\s+extra\s*$")?,
            plural_extra_re: Regex::new(r"s\s+extra")?,
            punct_re,
        })
    }

    /// Map a raw item name to its canonical catalog name. Returns the input
    /// unchanged when nothing in the catalog scores high enough.
    pub fn match_name(&self, raw: &str) -> String {
        let raw_lower = raw.trim().to_lowercase();
        let base = self.spicy_re.replace_all(&raw_lower, "").trim().to_string();
        let without_extra = self.extra_tail_re.replace(&base, "").trim().to_string();
        let without_s = self.plural_extra_re.replace_all(&base, " extra").to_string();

        for candidate in [&base, &without_s, &without_extra, &raw_lower] {
            if let Some(hit) = self.exact.get(&normalize_key(&self.punct_re, candidate)) {
                return hit.clone();
            }
        }

        self.score_fallback(&base)
            .unwrap_or_else(|| raw.to_string())
    }

    /// Token-overlap scoring against every entry's English segment, with
    /// singular/plural variants of the raw name. Ties keep catalog order.
    fn score_fallback(&self, base: &str) -> Option<String> {
        let singular = base.trim_end_matches('s').to_string();
        let plural = if base.ends_with('s') {
            base.to_string()
        } else {
            format!("{base}s")
        };
        let variants = [base.to_string(), singular, plural];

        let mut best: Option<&str> = None;
        let mut best_score = 0.0_f64;

        for (canonical, eng_clean) in &self.entries {
            let eng_words: HashSet<&str> = eng_clean.split_whitespace().collect();
            if eng_words.is_empty() {
                continue;
            }
            for candidate in &variants {
                let raw_clean = clean_words(&self.punct_re, candidate);
                let raw_words: HashSet<&str> = raw_clean.split_whitespace().collect();
                if raw_words.is_empty() {
                    continue;
                }

                let common = raw_words.intersection(&eng_words).count();
                let mut score = if raw_words.len() == 1 {
                    let mut s = if common > 0 {
                        common as f64 / eng_words.len() as f64
                    } else {
                        0.0
                    };
                    if eng_clean.starts_with(raw_clean.as_str()) {
                        s += 0.2;
                    }
                    s
                } else {
                    common as f64 / raw_words.len().max(eng_words.len()) as f64
                };
                if eng_clean.contains(raw_clean.as_str())
                    || raw_clean.contains(eng_clean.as_str())
                {
                    score += 0.3;
                }

                let threshold = if raw_words.len() == 1 { 0.3 } else { 0.5 };
                if score >= threshold && score > best_score {
                    best_score = score;
                    best = Some(canonical.as_str());
                    break;
                }
            }
        }

        best.map(str::to_string)
    }
}

/// Lowercase, punctuation stripped, whitespace collapsed.
fn normalize_key(punct_re: &Regex, s: &str) -> String {
    clean_words(punct_re, &s.to_lowercase())
}

fn clean_words(punct_re: &Regex, s: &str) -> String {
    punct_re
        .replace_all(s, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{read_menu, Catalog};

    const MENU_CSV: &str = "\
Taco Gà / Chicken Taco,Phần,55000,Đồ ăn
Burrito Bò / Beef Burrito,Phần,95000,Đồ ăn
Khoai Tây Chiên / French Fries,Phần,45000,Đồ ăn
Nước Chanh / Lemonade,Ly,30000,Đồ uống
Bánh Taco Chay / Veggie Taco,Phần,50000,Đồ ăn
";

    fn index() -> MenuIndex {
        let catalog = Catalog::new(read_menu(MENU_CSV.as_bytes(), "taco").unwrap());
        MenuIndex::new(&catalog).unwrap()
    }

    #[test]
    fn test_exact_english_segment() {
        let idx = index();
        assert_eq!(idx.match_name("Chicken Taco"), "Taco Gà / Chicken Taco");
        assert_eq!(idx.match_name("chicken taco"), "Taco Gà / Chicken Taco");
    }

    #[test]
    fn test_canonical_name_is_idempotent() {
        let idx = index();
        let canonical = "Burrito Bò / Beef Burrito";
        assert_eq!(idx.match_name(canonical), canonical);
        let rematched = idx.match_name(&idx.match_name("Beef Burrito"));
        assert_eq!(rematched, canonical);
    }

    #[test]
    fn test_spicy_and_extra_qualifiers_stripped() {
        let idx = index();
        assert_eq!(idx.match_name("Chicken Taco (spicy)"), "Taco Gà / Chicken Taco");
        assert_eq!(idx.match_name("Chicken Taco extra"), "Taco Gà / Chicken Taco");
    }

    #[test]
    fn test_plural_variant() {
        let idx = index();
        assert_eq!(idx.match_name("Chicken Tacos"), "Taco Gà / Chicken Taco");
    }

    #[test]
    fn test_single_word_prefix_match() {
        let idx = index();
        assert_eq!(idx.match_name("Lemonade"), "Nước Chanh / Lemonade");
        assert_eq!(idx.match_name("Fries"), "Khoai Tây Chiên / French Fries");
    }

    #[test]
    fn test_unmatched_passes_through() {
        let idx = index();
        assert_eq!(idx.match_name("Mystery Special 9000"), "Mystery Special 9000");
    }
}
