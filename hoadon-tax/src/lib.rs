//! hoadon-tax: tax reclassification, discount allocation, target-sum basket
//! generation and invoice materialization.

pub mod discount;
pub mod generate;
pub mod materialize;
pub mod process;
pub mod reclassify;

pub use discount::{allocate_discount, DiscountOutcome};
pub use generate::{generate_basket, max_price_adjustment, search_bounds, GeneratedBasket, SearchBounds};
pub use materialize::{generated_filename, invoice_filename, CsvSink, InvoiceSink};
pub use process::{finalize, Finalized};
pub use reclassify::{is_alcoholic, is_high_tax, reclassify_item};
