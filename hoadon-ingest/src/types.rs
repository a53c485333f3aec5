use chrono::NaiveDate;
use hoadon_core::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Pre-match item tuple pulled out of a ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub price: f64,
}

/// Invoice shell plus raw records, before menu matching and tax handling.
/// Shells that end up with no records are discarded by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInvoice {
    pub id: String,
    pub date: NaiveDate,
    pub payment: PaymentMethod,
    pub discount: f64,
    pub secondary_discount: f64,
    pub recorded_total: f64,
    pub records: Vec<RawRecord>,
}
