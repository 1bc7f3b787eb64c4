//! Postgres store. Row locks are `SELECT ... FOR UPDATE` inside a
//! `sqlx::Transaction`; an uncommitted transaction is rolled back when dropped.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row, Transaction};

use super::{LedgerStore, OperationFilter, UnitOfWork};
use crate::database::DatabasePool;
use crate::error::{is_unique_violation, LedgerError, LedgerResult};
use crate::models::{Operation, OperationId, OperationType, Wallet, WalletId};

impl<'r> sqlx::FromRow<'r, PgRow> for Wallet {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        Ok(Self {
            id: WalletId::parse(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            balance: row.try_get("balance")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for Operation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let wallet_id: String = row.try_get("wallet_id")?;
        let operation_type: String = row.try_get("operation_type")?;
        Ok(Self {
            id: row.try_get("id")?,
            wallet_id: WalletId::parse(&wallet_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            operation_type: operation_type
                .parse::<OperationType>()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            amount: row.try_get("amount")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: DatabasePool,
}

impl PostgresStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn insert_wallet(&self, id: &WalletId) -> LedgerResult<Wallet> {
        sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallet (id, balance, created_at)
            VALUES ($1, 0, NOW())
            RETURNING id, balance, created_at
            "#,
        )
        .bind(id.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::DuplicateIdentifier(id.to_string())
            } else {
                tracing::error!("Error creating wallet {}: {:?}", id, e);
                e.into()
            }
        })
    }

    async fn wallet(&self, id: &WalletId) -> LedgerResult<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(
            "SELECT id, balance, created_at FROM wallet WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await?;
        Ok(wallet)
    }

    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Error opening transaction: {:?}", e);
            LedgerError::from(e)
        })?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    async fn operations(&self, filter: &OperationFilter) -> LedgerResult<Vec<Operation>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, wallet_id, operation_type, amount, created_at FROM operations WHERE wallet_id = ",
        );
        query.push_bind(filter.wallet_id.as_str().to_string());

        if let Some(operation_type) = filter.operation_type {
            query.push(" AND operation_type = ").push_bind(operation_type.as_str());
        }
        if let Some(from) = filter.created_from {
            query.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(before) = filter.created_before {
            query.push(" AND created_at < ").push_bind(before);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let operations = query
            .build_query_as::<Operation>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Error fetching operations for {}: {:?}", filter.wallet_id, e);
                LedgerError::from(e)
            })?;
        Ok(operations)
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn lock_wallet(&mut self, id: &WalletId) -> LedgerResult<Wallet> {
        sqlx::query_as::<_, Wallet>(
            "SELECT id, balance, created_at FROM wallet WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))
    }

    async fn append_operation(
        &mut self,
        wallet_id: &WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> LedgerResult<OperationId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO operations (wallet_id, operation_type, amount, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(wallet_id.as_str())
        .bind(operation_type.as_str())
        .bind(amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn set_balance(&mut self, wallet_id: &WalletId, balance: i64) -> LedgerResult<()> {
        sqlx::query("UPDATE wallet SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(wallet_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        let PostgresUnitOfWork { tx } = *self;
        tx.commit().await.map_err(|e| {
            tracing::error!("Commit failed: {:?}", e);
            match LedgerError::from(e) {
                LedgerError::StorageUnavailable(source) => {
                    LedgerError::Aborted(format!("commit failed: {}", source))
                }
                other => other,
            }
        })
    }

    async fn rollback(self: Box<Self>) -> LedgerResult<()> {
        let PostgresUnitOfWork { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
