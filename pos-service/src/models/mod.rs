//! Domain models for pos-service.

mod cart;
mod draft;
mod invoice;
mod line_item;
pub mod money;

pub use cart::Cart;
pub use draft::DraftLine;
pub use invoice::{HistorySummary, InvoiceDetail, InvoiceHeader, InvoiceView};
pub use line_item::LineItem;
