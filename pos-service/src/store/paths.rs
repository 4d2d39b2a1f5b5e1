//! Store path layout. These strings are shared with other clients of the same
//! database and must not change.

pub const HEADER_COLLECTION: &str = "InvoiceCardHeaderCal";
pub const DETAIL_COLLECTION: &str = "InvoiceCardDetailsCal";

pub fn header_path(invoice_no: u64) -> String {
    format!("{}/{}", HEADER_COLLECTION, invoice_no)
}

pub fn detail_collection_path(invoice_no: u64) -> String {
    format!("{}/{}", DETAIL_COLLECTION, invoice_no)
}

pub fn detail_key(line_id: u32) -> String {
    format!("item{}", line_id)
}

pub fn detail_path(invoice_no: u64, line_id: u32) -> String {
    format!("{}/{}", detail_collection_path(invoice_no), detail_key(line_id))
}

/// Recover the line id from a detail key such as `item12`.
pub fn parse_detail_key(key: &str) -> Option<u32> {
    key.strip_prefix("item")?.parse().ok()
}
