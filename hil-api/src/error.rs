//! Caller-facing error taxonomy.

use hil_switch::{DriverError, SchemaError};
use thiserror::Error;

use crate::store::StoreError;

/// Every orchestrator operation fails with one of these.
///
/// Everything except `Driver` and `Inconsistent` means the request was
/// rejected before anything changed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("{0}")]
    Blocked(String),

    /// Hardware programming failed; the logical change was rolled back.
    #[error("switch {switch} failed: {source}")]
    Driver {
        switch: String,
        #[source]
        source: DriverError,
    },

    /// Hardware programming failed and the rollback could not be applied.
    #[error("inconsistent state: {0}")]
    Inconsistent(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Duplicate(_) => "duplicate",
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::Schema(_) => "schema",
            ApiError::ResourceExhausted(_) => "resource_exhausted",
            ApiError::Blocked(_) => "blocked",
            ApiError::Driver { .. } => "driver",
            ApiError::Inconsistent(_) => "inconsistent",
            ApiError::Internal(_) => "internal",
        }
    }

    pub(crate) fn not_found(kind: &str, label: &str) -> Self {
        ApiError::NotFound(format!("{} '{}'", kind, label))
    }

    pub(crate) fn duplicate(kind: &str, label: &str) -> Self {
        ApiError::Duplicate(format!("{} '{}'", kind, label))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
