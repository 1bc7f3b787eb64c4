//! Operation log entries. Rows are appended once and never changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{OperationId, WalletId};
use crate::error::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Withdraw,
}

impl OperationType {
    pub const ALL: [OperationType; 2] = [OperationType::Deposit, OperationType::Withdraw];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
        }
    }
}

impl FromStr for OperationType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(OperationType::Deposit),
            "withdraw" => Ok(OperationType::Withdraw),
            other => Err(LedgerError::InvalidOperationType(other.to_string())),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One balance-changing event on one wallet. `amount` is always positive;
/// the direction comes from `operation_type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub id: OperationId,
    pub wallet_id: WalletId,
    pub operation_type: OperationType,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Operation {
    /// Effect on the wallet balance.
    pub fn signed_amount(&self) -> i64 {
        match self.operation_type {
            OperationType::Deposit => self.amount,
            OperationType::Withdraw => -self.amount,
        }
    }
}
