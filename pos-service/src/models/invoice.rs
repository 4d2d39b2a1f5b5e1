//! Persisted invoice records.
//!
//! Field names and value types follow the shared store layout exactly:
//! PascalCase keys, JSON numbers for money and quantities, and an ISO-8601
//! UTC timestamp with millisecond precision.

use super::{Cart, LineItem};
use crate::error::PosError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary record for one committed invoice, stored at
/// `InvoiceCardHeaderCal/{invoice_no}`. Only `is_printed` changes after
/// commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: u64,
    #[serde(rename = "InvoiceSysDate", with = "sys_date")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ProductCount")]
    pub line_count: u32,
    #[serde(rename = "DiscountPrice", with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,
    #[serde(rename = "TotalPrice", with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(rename = "PaidAmount", with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
    #[serde(rename = "Balance", with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(rename = "IsHold")]
    pub is_hold: bool,
    #[serde(rename = "IsPrinted")]
    pub is_printed: bool,
}

impl InvoiceHeader {
    /// Build the header for committing `cart` with `paid_amount` tendered.
    pub fn for_cart(
        cart: &Cart,
        paid_amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PosError> {
        Ok(Self {
            id: cart.invoice_no(),
            invoice_no: cart.invoice_no(),
            created_at,
            line_count: cart.line_count(),
            total_discount: cart.total_discount(),
            total_price: cart.total_price(),
            paid_amount,
            balance: cart.balance(paid_amount)?,
            is_hold: false,
            is_printed: false,
        })
    }

    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_document(document: Value) -> serde_json::Result<Self> {
        serde_json::from_value(document)
    }
}

/// One persisted line, stored at `InvoiceCardDetailsCal/{invoice_no}/item{id}`.
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: u64,
    #[serde(rename = "ProductID")]
    pub product_id: u32,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "ProductQty", with = "rust_decimal::serde::float")]
    pub qty: Decimal,
    #[serde(rename = "ProductRetailPrice", with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(rename = "ProductDiscountPrice", with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(rename = "ProductTotalPrice", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl InvoiceDetail {
    pub fn from_line(invoice_no: u64, line: &LineItem) -> Self {
        Self {
            id: line.id(),
            invoice_no,
            product_id: line.id(),
            product_name: line.name().to_string(),
            qty: line.qty(),
            rate: line.rate(),
            discount: line.discount(),
            amount: line.amount(),
        }
    }

    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_document(document: Value) -> serde_json::Result<Self> {
        serde_json::from_value(document)
    }
}

/// Row of the invoice history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub invoice_no: u64,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    pub line_count: u32,
    pub is_printed: bool,
}

impl From<&InvoiceHeader> for HistorySummary {
    fn from(header: &InvoiceHeader) -> Self {
        Self {
            invoice_no: header.invoice_no,
            created_at: header.created_at,
            total_price: header.total_price,
            paid_amount: header.paid_amount,
            line_count: header.line_count,
            is_printed: header.is_printed,
        }
    }
}

/// A historical invoice opened for viewing or reprint.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub header: InvoiceHeader,
    pub details: Vec<InvoiceDetail>,
}

mod sys_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
