//! Cart and checkout handlers.

use super::{raw_text, reject};
use crate::models::{money, Cart, DraftLine, LineItem};
use crate::services::CommitReceipt;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

/// Line fields as typed by the operator.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    #[serde(default, deserialize_with = "raw_text")]
    pub name: String,
    #[serde(default, deserialize_with = "raw_text")]
    pub rate: String,
    #[serde(default = "default_qty", deserialize_with = "raw_text")]
    pub qty: String,
    #[serde(default, deserialize_with = "raw_text")]
    pub discount: String,
}

fn default_qty() -> String {
    "1".to_string()
}

impl From<LineRequest> for DraftLine {
    fn from(req: LineRequest) -> Self {
        DraftLine::new(req.name, req.rate, req.qty, req.discount)
    }
}

#[derive(Debug, Deserialize)]
pub struct EditLineRequest {
    #[serde(default, deserialize_with = "raw_text")]
    pub rate: String,
    #[serde(default, deserialize_with = "raw_text")]
    pub qty: String,
    #[serde(default, deserialize_with = "raw_text")]
    pub discount: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default, deserialize_with = "raw_text")]
    pub paid_amount: String,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub invoice_no: u64,
    pub next_line_id: u32,
    pub lines: Vec<LineItem>,
    pub line_count: u32,
    pub total_price: Decimal,
    pub total_discount: Decimal,
    pub total_display: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            invoice_no: cart.invoice_no(),
            next_line_id: cart.next_line_id(),
            lines: cart.lines().to_vec(),
            line_count: cart.line_count(),
            total_price: cart.total_price(),
            total_discount: cart.total_discount(),
            total_display: money::display(cart.total_price()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub receipt: CommitReceipt,
    pub balance_display: String,
    pub next_invoice_no: u64,
}

pub async fn get_cart(State(state): State<AppState>) -> Json<CartView> {
    let engine = state.engine.lock().await;
    Json(CartView::from(engine.cart()))
}

pub async fn get_draft(State(state): State<AppState>) -> Json<DraftLine> {
    let engine = state.engine.lock().await;
    Json(engine.draft().clone())
}

/// Replace the staged fields.
pub async fn put_draft(
    State(state): State<AppState>,
    Json(payload): Json<LineRequest>,
) -> Json<DraftLine> {
    let mut engine = state.engine.lock().await;
    *engine.draft_mut() = payload.into();
    Json(engine.draft().clone())
}

pub async fn clear_draft(State(state): State<AppState>) -> Json<DraftLine> {
    let mut engine = state.engine.lock().await;
    engine.clear_draft_fields();
    Json(engine.draft().clone())
}

/// Add the staged line to the cart.
pub async fn add_draft_line(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<LineItem>), AppError> {
    let mut engine = state.engine.lock().await;
    let line = engine.add_draft_line().map_err(reject)?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn add_line(
    State(state): State<AppState>,
    Json(payload): Json<LineRequest>,
) -> Result<(StatusCode, Json<LineItem>), AppError> {
    let mut engine = state.engine.lock().await;
    let line = engine.add_line(&payload.into()).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn edit_line(
    State(state): State<AppState>,
    Path(line_id): Path<u32>,
    Json(payload): Json<EditLineRequest>,
) -> Result<Json<LineItem>, AppError> {
    let mut engine = state.engine.lock().await;
    let line = engine
        .edit_line(line_id, &payload.rate, &payload.qty, &payload.discount)
        .map_err(reject)?;
    Ok(Json(line))
}

/// Deleting an unknown line succeeds as a no-op.
pub async fn delete_line(State(state): State<AppState>, Path(line_id): Path<u32>) -> StatusCode {
    let mut engine = state.engine.lock().await;
    engine.delete_line(line_id);
    StatusCode::NO_CONTENT
}

/// Commit the cart. On failure the cart is kept for a retry.
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let mut engine = state.engine.lock().await;

    tracing::info!(
        invoice_no = engine.invoice_no(),
        lines = engine.cart().line_count(),
        "Checking out"
    );

    let receipt = engine.checkout(&payload.paid_amount).await.map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            balance_display: money::display(receipt.header.balance),
            next_invoice_no: engine.invoice_no(),
            receipt,
        }),
    ))
}
