//! Turning a cart into persisted header and detail records.
//!
//! The header is written first, then one detail per line, each as its own
//! awaited store call. Nothing is rolled back: a failure partway leaves a
//! header whose `ProductCount` exceeds the details actually stored. Every
//! record is a full overwrite at a key fixed by the invoice number and line
//! id, so committing the same cart again converges to a consistent state.

use crate::error::PosError;
use crate::models::{money, Cart, InvoiceDetail, InvoiceHeader};
use crate::services::metrics::COMMITS_TOTAL;
use crate::store::{paths, RecordStore, StoreError};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of a successful commit.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReceipt {
    pub invoice_no: u64,
    pub header: InvoiceHeader,
    pub detail_count: usize,
}

#[derive(Clone)]
pub struct CommitProtocol {
    store: Arc<dyn RecordStore>,
}

impl CommitProtocol {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Parse the tendered amount; it must be a positive number.
    pub fn parse_paid_amount(input: &str) -> Result<Decimal, PosError> {
        match money::parse(input) {
            Some(paid) if paid > Decimal::ZERO => Ok(paid),
            _ => Err(PosError::validation(format!(
                "Paid amount must be a positive number, got '{}'",
                input
            ))),
        }
    }

    /// Persist `cart` as invoice `cart.invoice_no()`. The cart itself is not
    /// touched; advancing to the next invoice is the caller's job.
    #[instrument(skip(self, cart), fields(invoice_no = cart.invoice_no(), lines = cart.line_count()))]
    pub async fn commit(&self, cart: &Cart, paid_amount: &str) -> Result<CommitReceipt, PosError> {
        let paid_amount = Self::parse_paid_amount(paid_amount).inspect_err(|_| {
            COMMITS_TOTAL.with_label_values(&["rejected"]).inc();
        })?;

        if cart.is_empty() {
            warn!("Committing an invoice with no lines");
        }

        let header = InvoiceHeader::for_cart(cart, paid_amount, Utc::now()).inspect_err(|_| {
            COMMITS_TOTAL.with_label_values(&["rejected"]).inc();
        })?;

        match self.write_records(cart, &header).await {
            Ok(detail_count) => {
                COMMITS_TOTAL.with_label_values(&["committed"]).inc();
                info!(
                    total_price = %header.total_price,
                    paid_amount = %header.paid_amount,
                    balance = %money::display(header.balance),
                    "Invoice committed"
                );
                Ok(CommitReceipt {
                    invoice_no: header.invoice_no,
                    header,
                    detail_count,
                })
            }
            Err(e) => {
                COMMITS_TOTAL.with_label_values(&["failed"]).inc();
                warn!(error = %e, "Invoice commit failed, records may be partially written");
                Err(e)
            }
        }
    }

    async fn write_records(&self, cart: &Cart, header: &InvoiceHeader) -> Result<usize, PosError> {
        let invoice_no = header.invoice_no;

        let document = header.to_document().map_err(encode_error)?;
        self.store
            .write_full(&paths::header_path(invoice_no), &document)
            .await?;

        for line in cart.lines() {
            let detail = InvoiceDetail::from_line(invoice_no, line);
            let document = detail.to_document().map_err(encode_error)?;
            self.store
                .write_full(&paths::detail_path(invoice_no, line.id()), &document)
                .await?;
        }

        Ok(cart.lines().len())
    }
}

fn encode_error(e: serde_json::Error) -> PosError {
    PosError::Store(StoreError::Encode(e.to_string()))
}
