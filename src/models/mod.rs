//! Ledger data model: wallet ids, wallets, operations and the currency formatter.

pub mod currency;
pub mod ids;
pub mod operation;
pub mod wallet;

pub use ids::{OperationId, WalletId};
pub use operation::{Operation, OperationType};
pub use wallet::Wallet;
