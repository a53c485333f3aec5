//! Discount allocation: fold recorded discounts into line-item prices.
//!
//! The whole allocatable amount lands on the single highest-value line, capped
//! at 90% of that line's subtotal. Anything the cap leaves over is reported,
//! never forced onto another item.

use hoadon_core::Invoice;
use serde::{Deserialize, Serialize};

/// Discounts below this are parse noise.
const NOISE_FLOOR: f64 = 1_000.0;
/// Above this share of the subtotal the figure is more likely a mis-read column.
const SUSPECT_RATIO: f64 = 0.5;
/// Never discount an item past this share of its own subtotal.
const MAX_ITEM_SHARE: f64 = 0.9;
/// Unit-price floor after allocation.
const MIN_UNIT_PRICE: f64 = 1.0;

/// What happened to an invoice's recorded discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiscountOutcome {
    /// Below the noise floor; nothing to allocate.
    Skipped,
    /// Applied to the highest-value item; `remainder` is what the cap left.
    Applied { amount: f64, remainder: f64 },
    /// Meets or exceeds the item subtotal; certainly wrong, not applied.
    Invalid { total: f64 },
    /// Suspiciously large; invoice still emitted, allocation withheld.
    Withheld { total: f64 },
}

/// Apply the invoice's recorded discounts to its highest-value line item.
/// The invoice is emitted regardless of the outcome.
pub fn allocate_discount(invoice: &mut Invoice) -> DiscountOutcome {
    let total = invoice.discount + invoice.secondary_discount;
    if total < NOISE_FLOOR {
        return DiscountOutcome::Skipped;
    }
    let subtotal = invoice.subtotal();
    if total >= subtotal {
        return DiscountOutcome::Invalid { total };
    }
    if total > subtotal * SUSPECT_RATIO {
        return DiscountOutcome::Withheld { total };
    }

    // First max wins on ties.
    let mut best = 0;
    for (i, item) in invoice.items.iter().enumerate() {
        if item.subtotal() > invoice.items[best].subtotal() {
            best = i;
        }
    }
    let item = &mut invoice.items[best];
    let item_subtotal = item.subtotal();
    let applied = total.min(item_subtotal * MAX_ITEM_SHARE);
    item.price = ((item_subtotal - applied) / item.quantity as f64).max(MIN_UNIT_PRICE);

    DiscountOutcome::Applied {
        amount: applied,
        remainder: total - applied,
    }
}
