use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::WalletId;

/// Wallet row. `balance` is in cents and never negative between units of work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}
