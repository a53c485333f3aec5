//! hoadon-core: catalog snapshot, invoice types and menu-name matching.

pub mod catalog;
pub mod invoice;
pub mod matcher;
pub mod numbers;

pub use catalog::{Catalog, CatalogItem, normalize_unit, DEFAULT_UNIT};
pub use invoice::{Invoice, LineItem, PaymentMethod, VAT_RATE};
pub use matcher::MenuIndex;
pub use numbers::{format_grouped, parse_grouped, parse_grouped_min_digits};
