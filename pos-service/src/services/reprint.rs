//! Reprint guard for a viewed invoice.
//!
//! Opening an invoice allows one reprint. Closing and re-opening the same
//! invoice allows another, so this limits accidental double taps rather than
//! acting as an audit control.

use crate::error::PosError;
use crate::store::{paths, Document, RecordStore};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReprintState {
    #[default]
    Idle,
    Viewing {
        invoice_no: u64,
    },
    Reprinted {
        invoice_no: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "invoice_no", rename_all = "snake_case")]
pub enum ReprintOutcome {
    /// `IsPrinted` was set on this invoice.
    Marked(u64),
    /// Nothing open, or the open invoice was already reprinted.
    Ignored,
}

impl ReprintState {
    /// Enter `Viewing` for `invoice_no`, re-arming the reprint.
    pub fn open(&mut self, invoice_no: u64) {
        *self = ReprintState::Viewing { invoice_no };
    }

    pub fn close(&mut self) {
        *self = ReprintState::Idle;
    }

    /// The invoice a reprint request would act on, if one is allowed.
    pub fn pending_reprint(&self) -> Option<u64> {
        match *self {
            ReprintState::Viewing { invoice_no } => Some(invoice_no),
            _ => None,
        }
    }

    pub fn mark_reprinted(&mut self) {
        if let ReprintState::Viewing { invoice_no } = *self {
            *self = ReprintState::Reprinted { invoice_no };
        }
    }
}

/// Flip `IsPrinted` on a stored header with a partial update.
pub async fn mark_printed(store: &dyn RecordStore, invoice_no: u64) -> Result<(), PosError> {
    let mut fields = Document::new();
    fields.insert("IsPrinted".to_string(), Value::Bool(true));
    store
        .write_fields(&paths::header_path(invoice_no), &fields)
        .await?;
    Ok(())
}
