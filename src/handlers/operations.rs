use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::LedgerError;
use crate::models::WalletId;
use crate::AppState;

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount: i64, // cents
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub wallet_id: WalletId,
    pub balance: i64,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from_wallet: WalletId,
    pub to_wallet: WalletId,
    pub amount: i64, // cents
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub from_wallet: WalletId,
    pub to_wallet: WalletId,
    pub amount: i64,
}

pub async fn deposit(
    Path(wallet_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<DepositResponse>, LedgerError> {
    let wallet_id = WalletId::parse(&wallet_id)?;
    let request = json_body(payload)?;

    let wallet = state.ledger.deposit(&wallet_id, request.amount).await?;

    Ok(Json(DepositResponse {
        wallet_id: wallet.id,
        balance: wallet.balance,
    }))
}

pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, LedgerError> {
    let request = json_body(payload)?;

    let receipt = state
        .ledger
        .transfer(&request.from_wallet, &request.to_wallet, request.amount)
        .await?;

    Ok(Json(TransferResponse {
        from_wallet: receipt.from.id,
        to_wallet: receipt.to.id,
        amount: receipt.amount,
    }))
}
