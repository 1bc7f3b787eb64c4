//! Storage seam for the ledger.
//!
//! The ledger protocol (lock, read, append, update, commit) is written once
//! against [`LedgerStore`] and [`UnitOfWork`]. A unit of work is an explicit
//! handle for one atomic unit: every write goes through it, and dropping it
//! without [`UnitOfWork::commit`] rolls everything back and releases its row
//! locks. Cancellation and timeouts rely on that.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LedgerResult;
use crate::models::{Operation, OperationId, OperationType, Wallet, WalletId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a wallet with zero balance. Fails with `DuplicateIdentifier`.
    async fn insert_wallet(&self, id: &WalletId) -> LedgerResult<Wallet>;

    /// Unlocked read of a wallet row.
    async fn wallet(&self, id: &WalletId) -> LedgerResult<Option<Wallet>>;

    /// Open an atomic unit of work.
    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>>;

    /// Operations matching `filter`, newest first (ties by id descending).
    async fn operations(&self, filter: &OperationFilter) -> LedgerResult<Vec<Operation>>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// Take the exclusive row lock on a wallet, then read it. Blocks while
    /// another unit holds the lock. Fails with `WalletNotFound`.
    async fn lock_wallet(&mut self, id: &WalletId) -> LedgerResult<Wallet>;

    /// Append an operation row. The wallet must be locked by this unit.
    async fn append_operation(
        &mut self,
        wallet_id: &WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> LedgerResult<OperationId>;

    /// Overwrite a locked wallet's balance.
    async fn set_balance(&mut self, wallet_id: &WalletId, balance: i64) -> LedgerResult<()>;

    async fn commit(self: Box<Self>) -> LedgerResult<()>;

    async fn rollback(self: Box<Self>) -> LedgerResult<()>;
}

/// Validated report filter. `created_from` is inclusive, `created_before` exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationFilter {
    pub wallet_id: WalletId,
    pub operation_type: Option<OperationType>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl OperationFilter {
    pub fn for_wallet(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            operation_type: None,
            created_from: None,
            created_before: None,
        }
    }

    pub fn matches(&self, op: &Operation) -> bool {
        op.wallet_id == self.wallet_id
            && self.operation_type.map_or(true, |t| op.operation_type == t)
            && self.created_from.map_or(true, |from| op.created_at >= from)
            && self.created_before.map_or(true, |before| op.created_at < before)
    }
}
