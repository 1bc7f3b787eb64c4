pub mod operations;
pub mod reports;
pub mod wallets;

pub use operations::{
    deposit, transfer, DepositRequest, DepositResponse, TransferRequest, TransferResponse,
};
pub use reports::{report, ReportRequest};
pub use wallets::{create_wallet, get_wallet, CreateWalletResponse, WalletResponse};

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Json, Router,
};

use crate::error::LedgerError;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/wallet", post(create_wallet))
        .route("/wallet/:wallet", get(get_wallet))
        .route("/deposit/:wallet", post(deposit))
        .route("/transfer", post(transfer))
        .route("/report/:wallet/:format", post(report))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Turn axum's body rejection into the ledger's error body.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, LedgerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            LedgerError::InvalidRequest(format!("decode request: {}", rejection.body_text()))
        })
}
