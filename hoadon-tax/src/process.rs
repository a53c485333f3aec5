//! Pipeline assembly: raw invoice shells through menu matching, tax
//! reclassification and discount allocation.

use hoadon_core::{Catalog, Invoice, LineItem, MenuIndex};
use hoadon_ingest::RawInvoice;
use rand::rngs::StdRng;

use crate::discount::{allocate_discount, DiscountOutcome};
use crate::reclassify::reclassify_item;

/// A processed invoice plus what the later stages did to it.
#[derive(Debug, Clone)]
pub struct Finalized {
    pub invoice: Invoice,
    pub discount: DiscountOutcome,
    pub replaced_items: usize,
}

/// Run one raw invoice through the remaining stages. Returns `None` when no
/// records survived extraction; such invoices are never persisted.
pub fn finalize(
    raw: RawInvoice,
    catalog: &Catalog,
    menu: &MenuIndex,
    rng: &mut StdRng,
) -> Option<Finalized> {
    if raw.records.is_empty() {
        return None;
    }

    let mut invoice = Invoice {
        id: raw.id,
        date: raw.date,
        payment: raw.payment,
        items: Vec::with_capacity(raw.records.len()),
        discount: raw.discount,
        secondary_discount: raw.secondary_discount,
        recorded_total: raw.recorded_total,
    };

    let mut replaced_items = 0;
    for record in raw.records {
        let mut item = LineItem {
            name: menu.match_name(&record.name),
            quantity: record.quantity,
            unit: record.unit,
            price: record.price,
        };
        if reclassify_item(&mut item, catalog, rng) {
            replaced_items += 1;
        }
        invoice.items.push(item);
    }

    let discount = allocate_discount(&mut invoice);
    Some(Finalized {
        invoice,
        discount,
        replaced_items,
    })
}
