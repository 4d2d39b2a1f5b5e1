//! HTTP handlers for pos-service.
//!
//! These expose the engine to the register front end. Every handler takes the
//! engine lock for its whole duration, so requests from one register are
//! applied strictly one after another.

pub mod cart;
pub mod health;
pub mod invoices;

use crate::error::PosError;
use crate::services::metrics::ERRORS_TOTAL;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use service_core::error::AppError;

/// Count and log an engine error, then convert it for the response.
pub(crate) fn reject(err: PosError) -> AppError {
    ERRORS_TOTAL.with_label_values(&[err.kind()]).inc();
    tracing::warn!(error = %err, kind = err.kind(), "Request rejected");
    err.into()
}

/// Accept operator input sent either as a JSON string or as a number, keeping
/// it as raw text for the engine's own parsing.
pub(crate) fn raw_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
