//! Catalog (menu) snapshot: bilingual items, units, prices and tax groups.
//!
//! Menus export as CSV: name, unit, price, tax group. One file per place; the
//! source label distinguishes entries once menus are loaded together.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::numbers::parse_grouped;

/// Canonical unit for prepared dishes.
pub const DEFAULT_UNIT: &str = "Phần";

/// Header/legend cells that show up as the first column of exported menus.
const HEADER_NAMES: [&str; 6] = [
    "Ten_san_pham",
    "Tinh_chat",
    "Ma_so",
    "Tên sản phẩm",
    "Tính chất",
    "Mã số",
];

/// One sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Bilingual display name, "Vietnamese / English".
    pub name: String,
    pub unit: String,
    pub price: f64,
    /// Tax group label from the source sheet (e.g. "Đồ ăn", "Bia").
    pub tax_group: String,
    /// Label of the menu this entry came from.
    pub source: String,
}

impl CatalogItem {
    /// English segment of the bilingual name (after the last " / "), or the
    /// whole name when there is no separator.
    pub fn foreign_name(&self) -> &str {
        self.name.split(" / ").last().unwrap_or(&self.name).trim()
    }
}

/// Immutable catalog snapshot shared by matching, reclassification and
/// generation. Canonical names are unique; the first entry wins on collision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.name.clone()))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an entry by canonical name.
    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Entries belonging to one source menu.
    pub fn from_source(&self, source: &str) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.source == source)
            .cloned()
            .collect()
    }

    /// Load a snapshot from menu CSV files. A missing file simply contributes
    /// no entries; the source label is the file stem.
    pub fn load(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut items = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let source = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            items.extend(read_menu(file, &source)
                .with_context(|| format!("reading {}", path.display()))?);
        }
        Ok(Self::new(items))
    }
}

/// Canonical unit label. Blank, purely numeric and known synonyms collapse to
/// the default portion unit.
pub fn normalize_unit(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit()) {
        return DEFAULT_UNIT.to_string();
    }
    match trimmed.to_lowercase().as_str() {
        "món" | "mon" | "dish" => DEFAULT_UNIT.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse menu rows from a CSV reader. Header and legend rows are skipped, as
/// is anything without a positive price.
pub fn read_menu<R: Read>(reader: R, source: &str) -> Result<Vec<CatalogItem>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut items = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let name = record.get(0).unwrap_or("").trim();
        if name.is_empty() || HEADER_NAMES.contains(&name) {
            continue;
        }
        let price = match parse_grouped(record.get(2).unwrap_or("")) {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };
        items.push(CatalogItem {
            name: name.to_string(),
            unit: normalize_unit(record.get(1).unwrap_or("")),
            price,
            tax_group: record.get(3).unwrap_or("").trim().to_string(),
            source: source.to_string(),
        });
    }
    Ok(items)
}
