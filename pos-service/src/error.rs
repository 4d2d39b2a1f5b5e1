//! Engine error taxonomy.

use crate::store::StoreError;
use service_core::error::AppError;
use thiserror::Error;

/// Every failure returns control to the operator; none of these is fatal.
#[derive(Debug, Error)]
pub enum PosError {
    /// Bad operator input. Engine state is unchanged.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation addressed a line or invoice that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A remote store call failed. The cart is preserved so the operator can
    /// retry the whole commit.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PosError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PosError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PosError::NotFound(msg.into())
    }

    /// Label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            PosError::Validation(_) => "validation",
            PosError::NotFound(_) => "not_found",
            PosError::Store(_) => "store",
        }
    }
}

impl From<PosError> for AppError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Validation(msg) => AppError::ValidationError(msg),
            PosError::NotFound(msg) => AppError::NotFound(anyhow::anyhow!(msg)),
            PosError::Store(e) => AppError::BadGateway(e.to_string()),
        }
    }
}
