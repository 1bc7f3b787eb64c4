//! Ledger error taxonomy and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Errors returned by the ledger, the report engine and the HTTP boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing caller input
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Amounts must be positive minor units
    #[error("invalid amount: {0}, must be positive")]
    InvalidAmount(i64),

    #[error("unexpected operation type: {0}")]
    InvalidOperationType(String),

    #[error("invalid date format in {field}, should be YYYY-MM-DD")]
    InvalidDateFormat { field: &'static str },

    #[error("from_date is greater than to_date")]
    InvalidDateRange,

    #[error("unexpected export format: {0}")]
    InvalidExportFormat(String),

    #[error("wallet {0} not found")]
    WalletNotFound(String),

    #[error("wallet {0} already exists")]
    DuplicateIdentifier(String),

    /// Business-rule rejection; nothing was written
    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    #[error("balance overflow")]
    BalanceOverflow,

    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Lower-level I/O failure. Safe to retry, the unit of work was rolled back.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    /// The unit of work could not commit (timeout, serialization failure, deadlock victim)
    #[error("operation aborted: {0}")]
    Aborted(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Machine-parsable reason string.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidRequest(_) => "INVALID_REQUEST",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::InvalidOperationType(_) => "INVALID_OPERATION_TYPE",
            LedgerError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            LedgerError::InvalidDateRange => "INVALID_DATE_RANGE",
            LedgerError::InvalidExportFormat(_) => "INVALID_EXPORT_FORMAT",
            LedgerError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            LedgerError::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::BalanceOverflow => "BALANCE_OVERFLOW",
            LedgerError::Encoding(_) => "ENCODING_FAILED",
            LedgerError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            LedgerError::Aborted(_) => "ABORTED",
        }
    }

    /// Whether retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::StorageUnavailable(_) | LedgerError::Aborted(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidRequest(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::InvalidOperationType(_)
            | LedgerError::InvalidDateFormat { .. }
            | LedgerError::InvalidDateRange
            | LedgerError::InvalidExportFormat(_)
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::BalanceOverflow => StatusCode::BAD_REQUEST,
            LedgerError::WalletNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
            LedgerError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LedgerError::StorageUnavailable(_) | LedgerError::Aborted(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Client-safe message. Infrastructure failures never leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::StorageUnavailable(_) => "Storage unavailable".to_string(),
            LedgerError::Aborted(_) => "Operation aborted, please retry".to_string(),
            LedgerError::Encoding(_) => "Internal server error".to_string(),
            LedgerError::InsufficientFunds { .. } => {
                "insufficient funds in the account".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            // serialization_failure, deadlock_detected, lock_not_available
            if let Some("40001" | "40P01" | "55P03") = db_err.code().as_deref() {
                return LedgerError::Aborted(db_err.message().to_string());
            }
        }
        LedgerError::StorageUnavailable(err)
    }
}

/// True when the error is a Postgres unique_violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23505")
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Ledger error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (
            status,
            Json(serde_json::json!({
                "code": self.code(),
                "message": self.client_message(),
            })),
        )
            .into_response()
    }
}
