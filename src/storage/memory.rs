//! In-process store. Each wallet row carries its own async mutex; a unit of
//! work holds the owned guards of the rows it locked and stages its writes
//! until commit, so an abandoned unit leaves no trace. The committed balance
//! is an atomic, so unlocked reads never wait on a unit of work.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{LedgerStore, OperationFilter, UnitOfWork};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Operation, OperationId, OperationType, Wallet, WalletId};

#[derive(Debug)]
struct WalletRow {
    lock: Arc<Mutex<()>>,
    /// Committed balance. Only written by the unit holding `lock`.
    balance: AtomicI64,
    created_at: chrono::DateTime<Utc>,
}

impl WalletRow {
    fn snapshot(&self, id: &WalletId) -> Wallet {
        Wallet {
            id: id.clone(),
            balance: self.balance.load(Ordering::Acquire),
            created_at: self.created_at,
        }
    }
}

#[derive(Default)]
struct Inner {
    wallets: RwLock<HashMap<WalletId, Arc<WalletRow>>>,
    operations: RwLock<Vec<Operation>>,
    next_operation_id: AtomicI64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn row(&self, id: &WalletId) -> Option<Arc<WalletRow>> {
        self.inner.wallets.read().await.get(id).cloned()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_wallet(&self, id: &WalletId) -> LedgerResult<Wallet> {
        let mut wallets = self.inner.wallets.write().await;
        if wallets.contains_key(id) {
            return Err(LedgerError::DuplicateIdentifier(id.to_string()));
        }
        let created_at = Utc::now();
        wallets.insert(
            id.clone(),
            Arc::new(WalletRow {
                lock: Arc::new(Mutex::new(())),
                balance: AtomicI64::new(0),
                created_at,
            }),
        );
        Ok(Wallet {
            id: id.clone(),
            balance: 0,
            created_at,
        })
    }

    async fn wallet(&self, id: &WalletId) -> LedgerResult<Option<Wallet>> {
        let Some(row) = self.row(id).await else {
            return Ok(None);
        };
        Ok(Some(row.snapshot(id)))
    }

    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            store: self.clone(),
            locked: Vec::new(),
            staged_balances: HashMap::new(),
            staged_operations: Vec::new(),
        }))
    }

    async fn operations(&self, filter: &OperationFilter) -> LedgerResult<Vec<Operation>> {
        let mut matching: Vec<Operation> = self
            .inner
            .operations
            .read()
            .await
            .iter()
            .filter(|op| filter.matches(op))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}

struct LockedRow {
    id: WalletId,
    row: Arc<WalletRow>,
    _guard: OwnedMutexGuard<()>,
}

struct MemoryUnitOfWork {
    store: MemoryStore,
    locked: Vec<LockedRow>,
    staged_balances: HashMap<WalletId, i64>,
    staged_operations: Vec<Operation>,
}

impl MemoryUnitOfWork {
    fn ensure_locked(&self, id: &WalletId) -> LedgerResult<()> {
        if self.locked.iter().any(|locked| &locked.id == id) {
            Ok(())
        } else {
            Err(LedgerError::Aborted(format!("wallet {} is not locked", id)))
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_wallet(&mut self, id: &WalletId) -> LedgerResult<Wallet> {
        if let Some(locked) = self.locked.iter().find(|locked| &locked.id == id) {
            let mut wallet = locked.row.snapshot(id);
            if let Some(staged) = self.staged_balances.get(id) {
                wallet.balance = *staged;
            }
            return Ok(wallet);
        }

        let row = self
            .store
            .row(id)
            .await
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))?;
        let guard = row.lock.clone().lock_owned().await;
        let wallet = row.snapshot(id);
        self.locked.push(LockedRow {
            id: id.clone(),
            row,
            _guard: guard,
        });
        Ok(wallet)
    }

    async fn append_operation(
        &mut self,
        wallet_id: &WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> LedgerResult<OperationId> {
        self.ensure_locked(wallet_id)?;
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        // Ids are consumed even if the unit rolls back, like a sequence.
        let id = self.store.inner.next_operation_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.staged_operations.push(Operation {
            id,
            wallet_id: wallet_id.clone(),
            operation_type,
            amount,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn set_balance(&mut self, wallet_id: &WalletId, balance: i64) -> LedgerResult<()> {
        self.ensure_locked(wallet_id)?;
        if balance < 0 {
            return Err(LedgerError::Aborted(format!(
                "negative balance for wallet {}",
                wallet_id
            )));
        }
        self.staged_balances.insert(wallet_id.clone(), balance);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        let MemoryUnitOfWork {
            store,
            locked,
            staged_balances,
            staged_operations,
        } = *self;

        // Row guards stay held until both the log and the balances are written.
        let mut operations = store.inner.operations.write().await;
        operations.extend(staged_operations);
        for locked_row in &locked {
            if let Some(balance) = staged_balances.get(&locked_row.id) {
                locked_row.row.balance.store(*balance, Ordering::Release);
            }
        }
        drop(operations);
        drop(locked);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> LedgerResult<()> {
        Ok(())
    }
}
