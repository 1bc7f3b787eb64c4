//! Wallet ledger: the only component that mutates balances.
//!
//! Deposit and transfer run inside one unit of work each. Every wallet they
//! touch is locked before it is read, and a transfer locks its two wallets in
//! ascending id order so two opposite transfers on the same pair can never
//! wait on each other in a cycle. Operation rows are appended in the same unit
//! as the balance update, so the log and the balances cannot diverge.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::with_deadline;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{OperationType, Wallet, WalletId};
use crate::storage::{LedgerStore, UnitOfWork};

/// Balances of both wallets after a committed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub from: Wallet,
    pub to: Wallet,
    pub amount: i64,
}

#[derive(Clone)]
pub struct WalletLedger {
    store: Arc<dyn LedgerStore>,
    operation_timeout: Duration,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn LedgerStore>, operation_timeout: Duration) -> Self {
        Self {
            store,
            operation_timeout,
        }
    }

    /// Register an externally generated wallet id with a zero balance.
    pub async fn create_wallet(&self, id: &WalletId) -> LedgerResult<Wallet> {
        let wallet = with_deadline(self.operation_timeout, self.store.insert_wallet(id)).await?;
        tracing::info!(wallet_id = %wallet.id, "Wallet created");
        Ok(wallet)
    }

    pub async fn wallet(&self, id: &WalletId) -> LedgerResult<Wallet> {
        with_deadline(self.operation_timeout, self.store.wallet(id))
            .await?
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))
    }

    /// Credit `amount` cents and record a `deposit` operation.
    pub async fn deposit(&self, wallet_id: &WalletId, amount: i64) -> LedgerResult<Wallet> {
        ensure_positive(amount)?;

        let (uow, wallet) = with_deadline(self.operation_timeout, async {
            let mut uow = self.store.begin().await?;
            let result = apply_deposit(uow.as_mut(), wallet_id, amount).await;
            staged(uow, result).await
        })
        .await?;
        uow.commit().await?;

        tracing::info!(
            wallet_id = %wallet_id,
            amount,
            balance = wallet.balance,
            "Deposit committed"
        );
        Ok(wallet)
    }

    /// Move `amount` cents between two distinct wallets. Rejected in full with
    /// `InsufficientFunds` if the source balance would go negative.
    pub async fn transfer(
        &self,
        from: &WalletId,
        to: &WalletId,
        amount: i64,
    ) -> LedgerResult<TransferReceipt> {
        ensure_positive(amount)?;
        if from == to {
            return Err(LedgerError::InvalidRequest(
                "from_wallet and to_wallet must differ".to_string(),
            ));
        }

        let (uow, receipt) = with_deadline(self.operation_timeout, async {
            let mut uow = self.store.begin().await?;
            let result = apply_transfer(uow.as_mut(), from, to, amount).await;
            staged(uow, result).await
        })
        .await?;
        uow.commit().await?;

        tracing::info!(from = %from, to = %to, amount, "Transfer committed");
        Ok(receipt)
    }
}

/// Canonical lock order for a pair of wallets, decided before any lock is requested.
pub fn lock_order<'a>(a: &'a WalletId, b: &'a WalletId) -> (&'a WalletId, &'a WalletId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn ensure_positive(amount: i64) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

async fn apply_deposit(
    uow: &mut dyn UnitOfWork,
    wallet_id: &WalletId,
    amount: i64,
) -> LedgerResult<Wallet> {
    let wallet = uow.lock_wallet(wallet_id).await?;
    let balance = wallet
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow)?;

    uow.append_operation(wallet_id, OperationType::Deposit, amount)
        .await?;
    uow.set_balance(wallet_id, balance).await?;

    Ok(Wallet { balance, ..wallet })
}

async fn apply_transfer(
    uow: &mut dyn UnitOfWork,
    from: &WalletId,
    to: &WalletId,
    amount: i64,
) -> LedgerResult<TransferReceipt> {
    let (first, second) = lock_order(from, to);
    let first_wallet = uow.lock_wallet(first).await?;
    let second_wallet = uow.lock_wallet(second).await?;
    let (source, destination) = if first == from {
        (first_wallet, second_wallet)
    } else {
        (second_wallet, first_wallet)
    };

    let source_balance = source.balance - amount;
    if source_balance < 0 {
        return Err(LedgerError::InsufficientFunds {
            available: source.balance,
            required: amount,
        });
    }
    let destination_balance = destination
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow)?;

    uow.append_operation(from, OperationType::Withdraw, amount)
        .await?;
    uow.append_operation(to, OperationType::Deposit, amount)
        .await?;
    uow.set_balance(from, source_balance).await?;
    uow.set_balance(to, destination_balance).await?;

    Ok(TransferReceipt {
        from: Wallet {
            balance: source_balance,
            ..source
        },
        to: Wallet {
            balance: destination_balance,
            ..destination
        },
        amount,
    })
}

/// Hand back the unit for commit on success, roll it back on error.
/// Commit itself runs outside the operation deadline.
async fn staged<T>(
    uow: Box<dyn UnitOfWork>,
    result: LedgerResult<T>,
) -> LedgerResult<(Box<dyn UnitOfWork>, T)> {
    match result {
        Ok(value) => Ok((uow, value)),
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!("Rollback failed after {}: {:?}", err, rollback_err);
            }
            Err(err)
        }
    }
}
