//! Invoice and line-item types shared across the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Blanket VAT rate applied to every materialized invoice.
pub const VAT_RATE: f64 = 0.08;

/// How the customer settled the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "atm")]
    Atm,
    #[serde(rename = "unknown")]
    Unknown,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Atm => "atm",
            PaymentMethod::Unknown => "unknown",
        }
    }
}

/// One finalized sellable line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Canonical bilingual name once matched, raw name otherwise.
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub price: f64,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// A reconstructed sales invoice.
///
/// Built as an empty shell by the ledger parser, filled by the extractor and
/// later stages, and treated as immutable once handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Fixed-length numeric id from the export.
    pub id: String,
    pub date: NaiveDate,
    pub payment: PaymentMethod,
    pub items: Vec<LineItem>,
    /// Order discount, taken as-is from the export.
    pub discount: f64,
    /// Payment-channel discount, sign already stripped.
    pub secondary_discount: f64,
    /// Total the export itself recorded; used only for validation.
    pub recorded_total: f64,
}

impl Invoice {
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Customer-facing total once the blanket 8% rate is applied.
    pub fn total_with_tax(&self) -> f64 {
        self.subtotal() * (1.0 + VAT_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> Invoice {
        Invoice {
            id: "240002".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            payment: PaymentMethod::Transfer,
            items: vec![LineItem {
                name: "Taco Gà / Chicken Taco".to_string(),
                quantity: 2,
                unit: "Phần".to_string(),
                price: 55_000.0,
            }],
            discount: 0.0,
            secondary_discount: 0.0,
            recorded_total: 118_800.0,
        }
    }

    #[test]
    fn test_totals() {
        let inv = invoice();
        assert_eq!(inv.subtotal(), 110_000.0);
        assert_eq!(inv.total_with_tax().round(), 118_800.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let inv = invoice();
        let json = serde_json::to_string(&inv).unwrap();
        assert!(json.contains("\"transfer\""));
        let back: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inv);
    }
}
