use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use crate::error::LedgerError;
use crate::models::{currency, Wallet, WalletId};
use crate::AppState;

#[derive(Serialize)]
pub struct CreateWalletResponse {
    pub wallet_id: WalletId,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub wallet_id: WalletId,
    pub balance: i64,
    pub balance_formatted: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            balance_formatted: currency::format_amount(wallet.balance),
            wallet_id: wallet.id,
            balance: wallet.balance,
            created_at: wallet.created_at,
        }
    }
}

pub async fn create_wallet(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateWalletResponse>), LedgerError> {
    let wallet_id = state.wallet_ids.generate();
    let wallet = state.ledger.create_wallet(&wallet_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateWalletResponse { wallet_id: wallet.id }),
    ))
}

pub async fn get_wallet(
    Path(wallet_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<WalletResponse>, LedgerError> {
    let wallet_id = WalletId::parse(&wallet_id)?;
    let wallet = state.ledger.wallet(&wallet_id).await?;
    Ok(Json(wallet.into()))
}
