//! Invoice numbering and history reconstruction.
//!
//! Everything here re-reads the full header collection. The collection is
//! local to one register and small, so there is no incremental cache.

use crate::error::PosError;
use crate::models::{HistorySummary, InvoiceDetail, InvoiceHeader};
use crate::store::{paths, RecordStore, StoreError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn RecordStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Next free invoice number: one past the highest header key, or 1 on an
    /// empty store.
    ///
    /// Two registers bootstrapping against the same store at the same time
    /// can both get the same number; the store offers no compare-and-set to
    /// prevent it.
    #[instrument(skip(self))]
    pub async fn bootstrap_next_invoice_no(&self) -> Result<u64, PosError> {
        let Some(headers) = self.store.read_all(paths::HEADER_COLLECTION).await? else {
            info!("No invoice headers stored, starting at invoice 1");
            return Ok(1);
        };

        let highest = headers
            .keys()
            .filter_map(|key| match key.parse::<u64>() {
                Ok(no) if no > 0 => Some(no),
                _ => {
                    warn!(key = %key, "Ignoring header with non-numeric key");
                    None
                }
            })
            .max();

        let next = highest.map_or(1, |no| no + 1);
        info!(next_invoice_no = next, headers = headers.len(), "Invoice numbering bootstrapped");
        Ok(next)
    }

    /// All decodable headers, most recent invoice first.
    #[instrument(skip(self))]
    pub async fn load_headers(&self) -> Result<Vec<InvoiceHeader>, PosError> {
        let Some(documents) = self.store.read_all(paths::HEADER_COLLECTION).await? else {
            return Ok(Vec::new());
        };

        let mut headers: Vec<InvoiceHeader> = documents
            .into_iter()
            .filter_map(|(key, document)| match InvoiceHeader::from_document(document) {
                Ok(header) => Some(header),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping undecodable invoice header");
                    None
                }
            })
            .collect();

        headers.sort_by(|a, b| b.invoice_no.cmp(&a.invoice_no));
        Ok(headers)
    }

    /// History list, sorted descending by invoice number.
    pub async fn list_history(&self) -> Result<Vec<HistorySummary>, PosError> {
        let headers = self.load_headers().await?;
        Ok(headers.iter().map(HistorySummary::from).collect())
    }

    /// Fresh read of a single header.
    #[instrument(skip(self))]
    pub async fn load_header(&self, invoice_no: u64) -> Result<Option<InvoiceHeader>, PosError> {
        let Some(document) = self.store.read_one(&paths::header_path(invoice_no)).await? else {
            return Ok(None);
        };

        InvoiceHeader::from_document(document)
            .map(Some)
            .map_err(|e| {
                PosError::Store(StoreError::Decode(format!(
                    "Invoice {} header is malformed: {}",
                    invoice_no, e
                )))
            })
    }

    /// Every detail record stored for `invoice_no`, ordered by line id. An
    /// invoice without details yields an empty list.
    #[instrument(skip(self))]
    pub async fn load_details(&self, invoice_no: u64) -> Result<Vec<InvoiceDetail>, PosError> {
        let Some(documents) = self
            .store
            .read_all(&paths::detail_collection_path(invoice_no))
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut details: Vec<InvoiceDetail> = documents
            .into_iter()
            .filter_map(|(key, document)| {
                if paths::parse_detail_key(&key).is_none() {
                    warn!(invoice_no, key = %key, "Skipping invoice detail with unexpected key");
                    return None;
                }
                match InvoiceDetail::from_document(document) {
                    Ok(detail) => Some(detail),
                    Err(e) => {
                        warn!(invoice_no, key = %key, error = %e, "Skipping undecodable invoice detail");
                        None
                    }
                }
            })
            .collect();

        details.sort_by_key(|detail| detail.id);
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn header_doc(no: u64) -> serde_json::Value {
        json!({
            "ID": no,
            "InvoiceNo": no,
            "InvoiceSysDate": "2025-01-15T08:00:00.000Z",
            "ProductCount": 1,
            "DiscountPrice": 0,
            "TotalPrice": 10,
            "PaidAmount": 10,
            "Balance": 0,
            "IsHold": false,
            "IsPrinted": false
        })
    }

    async fn seeded(numbers: &[u64]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for &no in numbers {
            store.seed(&paths::header_path(no), header_doc(no)).await;
        }
        store
    }

    #[tokio::test]
    async fn bootstrap_starts_at_one_on_empty_store() {
        let service = HistoryService::new(Arc::new(MemoryStore::new()));
        assert_eq!(service.bootstrap_next_invoice_no().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bootstrap_continues_after_highest_number() {
        let service = HistoryService::new(seeded(&[3, 5, 7]).await);
        assert_eq!(service.bootstrap_next_invoice_no().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn bootstrap_ignores_foreign_keys() {
        let store = seeded(&[4]).await;
        store.seed("InvoiceCardHeaderCal/draft", json!({"note": "x"})).await;

        let service = HistoryService::new(store);
        assert_eq!(service.bootstrap_next_invoice_no().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn history_is_sorted_most_recent_first_and_skips_bad_headers() {
        let store = seeded(&[2, 10, 9]).await;
        store.seed("InvoiceCardHeaderCal/11", json!({"InvoiceNo": "eleven"})).await;

        let history = HistoryService::new(store).list_history().await.unwrap();

        let numbers: Vec<u64> = history.iter().map(|h| h.invoice_no).collect();
        assert_eq!(numbers, vec![10, 9, 2]);
    }

    #[tokio::test]
    async fn details_of_unknown_invoice_are_empty() {
        let service = HistoryService::new(Arc::new(MemoryStore::new()));
        assert!(service.load_details(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_are_read_only_from_item_keys() {
        let store = Arc::new(MemoryStore::new());
        let detail = |id: u32| {
            json!({
                "ID": id,
                "InvoiceNo": 6,
                "ProductID": id,
                "ProductName": format!("Item {}", id),
                "ProductQty": 1,
                "ProductRetailPrice": 5,
                "ProductDiscountPrice": 0,
                "ProductTotalPrice": 5
            })
        };
        store.seed(&paths::detail_path(6, 2), detail(2)).await;
        store.seed(&paths::detail_path(6, 1), detail(1)).await;
        store.seed("InvoiceCardDetailsCal/6/backup", detail(3)).await;

        let details = HistoryService::new(store).load_details(6).await.unwrap();

        let ids: Vec<u32> = details.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
