//! Register session engine.
//!
//! Owns the cart, the staged draft line, the cached invoice history and the
//! reprint guard for one register. It is a single logical actor: callers
//! serialise access, and every store call is awaited before the next starts.

use crate::error::PosError;
use crate::models::{Cart, DraftLine, HistorySummary, InvoiceHeader, InvoiceView, LineItem};
use crate::services::commit::{CommitProtocol, CommitReceipt};
use crate::services::history::HistoryService;
use crate::services::metrics::{LINE_OPERATIONS_TOTAL, REPRINTS_TOTAL};
use crate::services::reprint::{self, ReprintOutcome, ReprintState};
use crate::store::RecordStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct PosEngine {
    store: Arc<dyn RecordStore>,
    history: HistoryService,
    committer: CommitProtocol,
    cart: Cart,
    draft: DraftLine,
    // Most recent first, as of the last refresh.
    headers: Vec<InvoiceHeader>,
    reprint: ReprintState,
}

impl PosEngine {
    /// Bootstrap invoice numbering from the store and load the history.
    #[instrument(skip(store))]
    pub async fn start(store: Arc<dyn RecordStore>) -> Result<Self, PosError> {
        let history = HistoryService::new(store.clone());
        let invoice_no = history.bootstrap_next_invoice_no().await?;
        let headers = history.load_headers().await?;

        info!(invoice_no, history = headers.len(), "Register session started");

        Ok(Self {
            committer: CommitProtocol::new(store.clone()),
            store,
            history,
            cart: Cart::new(invoice_no),
            draft: DraftLine::default(),
            headers,
            reprint: ReprintState::Idle,
        })
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn invoice_no(&self) -> u64 {
        self.cart.invoice_no()
    }

    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    pub fn balance(&self, paid_amount: Decimal) -> Result<Decimal, PosError> {
        self.cart.balance(paid_amount)
    }

    pub fn draft(&self) -> &DraftLine {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftLine {
        &mut self.draft
    }

    pub fn clear_draft_fields(&mut self) {
        self.draft.clear();
    }

    /// Add the staged draft as a new line, clearing the draft on success.
    pub fn add_draft_line(&mut self) -> Result<LineItem, PosError> {
        let draft = self.draft.clone();
        let line = self.add_line(&draft)?;
        self.draft.clear();
        Ok(line)
    }

    pub fn add_line(&mut self, draft: &DraftLine) -> Result<LineItem, PosError> {
        let line = self.cart.add_line(draft)?;
        LINE_OPERATIONS_TOTAL.with_label_values(&["add"]).inc();
        debug!(line_id = line.id(), amount = %line.amount(), "Line added");
        Ok(line)
    }

    pub fn edit_line(
        &mut self,
        id: u32,
        rate: &str,
        qty: &str,
        discount: &str,
    ) -> Result<LineItem, PosError> {
        let line = self.cart.edit_line(id, rate, qty, discount)?;
        LINE_OPERATIONS_TOTAL.with_label_values(&["edit"]).inc();
        debug!(line_id = id, amount = %line.amount(), "Line edited");
        Ok(line)
    }

    pub fn delete_line(&mut self, id: u32) -> bool {
        let removed = self.cart.delete_line(id);
        if removed {
            LINE_OPERATIONS_TOTAL.with_label_values(&["delete"]).inc();
            debug!(line_id = id, "Line deleted");
        }
        removed
    }

    /// Commit the cart and start the next invoice.
    ///
    /// On any failure the cart is left exactly as it was so the operator can
    /// retry. A failed history refresh after the records were written does
    /// not undo the commit; the cached history is just older than the store.
    pub async fn checkout(&mut self, paid_amount: &str) -> Result<CommitReceipt, PosError> {
        let receipt = self.committer.commit(&self.cart, paid_amount).await?;

        self.cart = Cart::new(receipt.invoice_no + 1);

        if let Err(e) = self.refresh_history().await {
            warn!(error = %e, invoice_no = receipt.invoice_no, "History refresh after commit failed");
        }

        Ok(receipt)
    }

    // -------------------------------------------------------------------------
    // History and reprint
    // -------------------------------------------------------------------------

    /// Re-read every header from the store.
    pub async fn refresh_history(&mut self) -> Result<(), PosError> {
        self.headers = self.history.load_headers().await?;
        Ok(())
    }

    /// Fresh history list, most recent invoice first.
    pub async fn list_history(&mut self) -> Result<Vec<HistorySummary>, PosError> {
        self.refresh_history().await?;
        Ok(self.cached_history())
    }

    /// History as of the last refresh, without a store call.
    pub fn cached_history(&self) -> Vec<HistorySummary> {
        self.headers.iter().map(HistorySummary::from).collect()
    }

    /// Open a committed invoice: its header plus a fresh read of its details.
    /// Re-arms the reprint guard.
    #[instrument(skip(self))]
    pub async fn view_invoice(&mut self, invoice_no: u64) -> Result<InvoiceView, PosError> {
        if self.cached_header(invoice_no).is_none() {
            self.refresh_history().await?;
        }
        let cached = self
            .cached_header(invoice_no)
            .cloned()
            .ok_or_else(|| PosError::not_found(format!("Invoice {} not found", invoice_no)))?;

        let header = match self.history.load_header(invoice_no).await? {
            Some(fresh) => {
                self.remember_header(fresh.clone());
                fresh
            }
            None => cached,
        };
        let details = self.history.load_details(invoice_no).await?;

        if details.len() != header.line_count as usize {
            warn!(
                expected = header.line_count,
                found = details.len(),
                "Invoice detail count does not match header"
            );
        }

        self.reprint.open(invoice_no);
        Ok(InvoiceView { header, details })
    }

    /// Mark the open invoice as printed, at most once per viewing.
    pub async fn request_reprint(&mut self) -> Result<ReprintOutcome, PosError> {
        let Some(invoice_no) = self.reprint.pending_reprint() else {
            REPRINTS_TOTAL.with_label_values(&["ignored"]).inc();
            debug!(state = ?self.reprint, "Reprint request ignored");
            return Ok(ReprintOutcome::Ignored);
        };

        if let Err(e) = reprint::mark_printed(self.store.as_ref(), invoice_no).await {
            REPRINTS_TOTAL.with_label_values(&["failed"]).inc();
            return Err(e);
        }

        self.reprint.mark_reprinted();
        if let Some(header) = self.headers.iter_mut().find(|h| h.invoice_no == invoice_no) {
            header.is_printed = true;
        }

        REPRINTS_TOTAL.with_label_values(&["marked"]).inc();
        info!(invoice_no, "Invoice marked for reprint");
        Ok(ReprintOutcome::Marked(invoice_no))
    }

    pub fn close_view(&mut self) {
        self.reprint.close();
    }

    pub fn reprint_state(&self) -> ReprintState {
        self.reprint
    }

    fn cached_header(&self, invoice_no: u64) -> Option<&InvoiceHeader> {
        self.headers.iter().find(|h| h.invoice_no == invoice_no)
    }

    fn remember_header(&mut self, header: InvoiceHeader) {
        match self
            .headers
            .iter_mut()
            .find(|h| h.invoice_no == header.invoice_no)
        {
            Some(slot) => *slot = header,
            None => {
                self.headers.push(header);
                self.headers.sort_by(|a, b| b.invoice_no.cmp(&a.invoice_no));
            }
        }
    }
}
