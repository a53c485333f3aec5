//! Ledger parsing: segment the export at invoice-id markers and pull
//! per-invoice metadata out of irregular rows.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use hoadon_core::{parse_grouped, parse_grouped_min_digits, PaymentMethod};
use regex::Regex;

use crate::items::ItemExtractor;
use crate::markup::{split_rows, CellExtractor};
use crate::types::RawInvoice;

/// Column-index window the export books order amounts into.
const AMOUNT_COL_FIRST: usize = 15;
const AMOUNT_COL_LAST: usize = 25;
/// Smallest value accepted as the order-total anchor cell.
const MIN_TOTAL_AMOUNT: f64 = 50_000.0;

/// Role assignment for the amount columns of a marker row: the anchor is the
/// order total, the discount sits one cell after it and the payment-channel
/// discount five cells after (sign stripped).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountColumns {
    pub anchor: usize,
    pub discount: f64,
    pub secondary_discount: f64,
}

/// Classify the amount columns of a row. Returns `None` when no cell in the
/// window qualifies as an anchor.
pub fn classify_amount_columns(cells: &[String]) -> Option<AmountColumns> {
    let anchor = (AMOUNT_COL_FIRST..=AMOUNT_COL_LAST)
        .take_while(|&i| i < cells.len())
        .find(|&i| {
            parse_grouped_min_digits(&cells[i], 4).is_some_and(|v| v >= MIN_TOTAL_AMOUNT)
        })?;

    let discount = cells
        .get(anchor + 1)
        .and_then(|c| parse_grouped(c))
        .unwrap_or(0.0);
    let secondary_discount = cells
        .get(anchor + 5)
        .and_then(|c| parse_grouped(&c.replace('-', "")))
        .unwrap_or(0.0);

    Some(AmountColumns {
        anchor,
        discount,
        secondary_discount,
    })
}

/// Last numeric cell with at least 4 digits; the export writes its own grand
/// total there. 0.0 when absent.
fn recorded_total(cells: &[String]) -> f64 {
    cells
        .iter()
        .rev()
        .find_map(|c| parse_grouped_min_digits(c, 4))
        .unwrap_or(0.0)
}

fn payment_from_cells(cells: &[String]) -> Option<PaymentMethod> {
    for cell in cells {
        let upper = cell.to_uppercase();
        if upper.contains("ATM (") || upper.starts_with("ATM") {
            return Some(PaymentMethod::Atm);
        }
        if upper.contains("TRANSFER (") || upper.starts_with("TRANSFER") {
            return Some(PaymentMethod::Transfer);
        }
    }
    None
}

fn payment_from_text(row: &str) -> Option<PaymentMethod> {
    let upper = row.to_uppercase();
    if upper.contains("ATM (") {
        Some(PaymentMethod::Atm)
    } else if upper.contains("TRANSFER (") {
        Some(PaymentMethod::Transfer)
    } else {
        None
    }
}

/// Parse a full export into invoice shells with raw records.
///
/// `merged` marks a ledger assembled from two single-method sources and
/// enables the positional payment fallback for invoices whose method never
/// appears in their segment.
pub fn parse_ledger(content: &str, merged: bool) -> Result<Vec<RawInvoice>> {
    let marker_re = Regex::new(r#"rowspan="\d+">(\d{6})</td>"#)?;
    let date_re = Regex::new(r">(\d{2}/\d{2}/\d{4})</td>")?;
    let cell_ex = CellExtractor::new()?;
    let extractor = ItemExtractor::new()?;

    let mut invoices: Vec<RawInvoice> = Vec::new();

    for row in split_rows(content) {
        let cells = cell_ex.cells(row);

        if let Some(caps) = marker_re.captures(row) {
            let date = date_re
                .captures(row)
                .and_then(|c| NaiveDate::parse_from_str(&c[1], "%d/%m/%Y").ok())
                .unwrap_or_else(|| Local::now().date_naive());
            let amounts = classify_amount_columns(&cells);
            let payment = payment_from_cells(&cells)
                .or_else(|| payment_from_text(row))
                .unwrap_or(PaymentMethod::Unknown);

            invoices.push(RawInvoice {
                id: caps[1].to_string(),
                date,
                payment,
                discount: amounts.map(|a| a.discount).unwrap_or(0.0),
                secondary_discount: amounts.map(|a| a.secondary_discount).unwrap_or(0.0),
                recorded_total: recorded_total(&cells),
                records: Vec::new(),
            });
            // fall through: the marker row usually carries the first item too
        }

        if let Some(current) = invoices.last_mut() {
            if current.payment == PaymentMethod::Unknown {
                if let Some(p) = payment_from_text(row) {
                    current.payment = p;
                }
            }
            current.records.extend(extractor.extract(&cells));
        }
    }

    if merged {
        assign_positional_payment(&mut invoices);
    }
    Ok(invoices)
}

/// Merged ledgers are a transfer export followed by an atm export, so unmarked
/// invoices in the first half default to transfer and the rest to atm.
/// Positional heuristic only; marked invoices are never touched.
fn assign_positional_payment(invoices: &mut [RawInvoice]) {
    let boundary = invoices.len() / 2;
    for (idx, inv) in invoices.iter_mut().enumerate() {
        if inv.payment == PaymentMethod::Unknown {
            inv.payment = if idx < boundary {
                PaymentMethod::Transfer
            } else {
                PaymentMethod::Atm
            };
        }
    }
}
