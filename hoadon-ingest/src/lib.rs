//! hoadon-ingest: POS export ingestion — markup row handling, ledger
//! segmentation and sliding-window item extraction.

pub mod items;
pub mod ledger;
pub mod markup;
pub mod types;

pub use items::ItemExtractor;
pub use ledger::{classify_amount_columns, parse_ledger, AmountColumns};
pub use markup::combine_ledgers;
pub use types::{RawInvoice, RawRecord};
