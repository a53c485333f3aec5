//! Invoice materialization: fixed-column tabular output behind a replaceable
//! sink. No business logic lives here.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hoadon_core::{format_grouped, Invoice, LineItem};
use std::path::{Path, PathBuf};

/// Output columns, fixed by the downstream import template.
const HEADERS: [&str; 6] = [
    "Tinh_chat",
    "Ma_so",
    "Ten_san_pham",
    "Don_vi_tinh",
    "So_luong",
    "Don_gia",
];

/// Destination for finalized invoices.
pub trait InvoiceSink {
    /// Persist one invoice into `dir`; returns the written path.
    fn write_invoice(&self, invoice: &Invoice, dir: &Path) -> Result<PathBuf>;

    /// Persist a generated basket into `dir` under a date + reference name.
    fn write_generated(
        &self,
        items: &[LineItem],
        date: NaiveDate,
        reference: &str,
        dir: &Path,
    ) -> Result<PathBuf>;
}

/// Filename encodes id, payment method and the grouped tax-inclusive total.
pub fn invoice_filename(invoice: &Invoice) -> String {
    format!(
        "{} - {} - {}đ.csv",
        invoice.id,
        invoice.payment.as_str(),
        format_grouped(invoice.total_with_tax().round() as i64)
    )
}

pub fn generated_filename(date: NaiveDate, reference: &str) -> String {
    format!("Grab - {} - {}.csv", date.format("%d-%m-%Y"), reference)
}

/// CSV sink, one file per invoice.
pub struct CsvSink;

impl CsvSink {
    fn write_rows(&self, items: &[LineItem], path: &Path) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        wtr.write_record(HEADERS)?;
        for item in items {
            let quantity = item.quantity.to_string();
            let price = format!("{:.2}", item.price);
            wtr.write_record([
                "1",
                "",
                item.name.as_str(),
                item.unit.as_str(),
                quantity.as_str(),
                price.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl InvoiceSink for CsvSink {
    fn write_invoice(&self, invoice: &Invoice, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(invoice_filename(invoice));
        self.write_rows(&invoice.items, &path)?;
        Ok(path)
    }

    fn write_generated(
        &self,
        items: &[LineItem],
        date: NaiveDate,
        reference: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(generated_filename(date, reference));
        self.write_rows(items, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoadon_core::PaymentMethod;

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
            recorded_total: 0.0,
        }
    }

    #[test]
    fn test_filename_encodes_id_method_and_total() {
        let name = invoice_filename(&invoice());
        assert_eq!(name, "240002 - transfer - 118.800đ.csv");
    }

    #[test]
    fn test_generated_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            generated_filename(date, "GRAB_20240315_101500"),
            "Grab - 15-03-2024 - GRAB_20240315_101500.csv"
        );
    }

    #[test]
    fn test_csv_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = CsvSink.write_invoice(&invoice(), dir.path()).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            rdr.headers().unwrap(),
            &csv::StringRecord::from(HEADERS.to_vec())
        );
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][2], "Taco Gà / Chicken Taco");
        assert_eq!(&rows[0][4], "2");
        assert_eq!(&rows[0][5], "55000.00");
    }
}
