//! Invoice history, view and reprint handlers.

use super::reject;
use crate::models::{HistorySummary, InvoiceView};
use crate::services::{ReprintOutcome, ReprintState};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct ReprintResponse {
    pub outcome: ReprintOutcome,
    pub state: ReprintState,
}

pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistorySummary>>, AppError> {
    let mut engine = state.engine.lock().await;
    let history = engine.list_history().await.map_err(reject)?;
    Ok(Json(history))
}

pub async fn view_invoice(
    State(state): State<AppState>,
    Path(invoice_no): Path<u64>,
) -> Result<Json<InvoiceView>, AppError> {
    let mut engine = state.engine.lock().await;
    let view = engine.view_invoice(invoice_no).await.map_err(reject)?;
    Ok(Json(view))
}

pub async fn request_reprint(
    State(state): State<AppState>,
) -> Result<Json<ReprintResponse>, AppError> {
    let mut engine = state.engine.lock().await;
    let outcome = engine.request_reprint().await.map_err(reject)?;
    Ok(Json(ReprintResponse {
        outcome,
        state: engine.reprint_state(),
    }))
}

pub async fn close_view(State(state): State<AppState>) -> Json<ReprintState> {
    let mut engine = state.engine.lock().await;
    engine.close_view();
    Json(engine.reprint_state())
}
