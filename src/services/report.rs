//! Report query engine: validates raw filters, reads the operation log and
//! hands the result to the output encoders.

use std::sync::Arc;
use std::time::Duration;

use super::with_deadline;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{self, ExportFormat, ExportOperation};
use crate::models::{Operation, OperationType, WalletId};
use crate::storage::{LedgerStore, OperationFilter};
use crate::utils::date;

/// Report filters as received from the boundary. Empty strings count as absent.
#[derive(Clone, Debug, Default)]
pub struct ReportQuery {
    pub wallet_id: String,
    pub operation_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl ReportQuery {
    pub fn for_wallet(wallet_id: impl Into<String>) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            ..Self::default()
        }
    }

    /// Check every field and turn calendar dates into UTC instants covering
    /// whole days: `from_date` from 00:00:00, `to_date` through 23:59:59.
    pub fn validate(&self) -> LedgerResult<OperationFilter> {
        let wallet_id = WalletId::parse(&self.wallet_id)?;

        let operation_type = non_empty(&self.operation_type)
            .map(str::parse::<OperationType>)
            .transpose()?;
        let from_date = non_empty(&self.from_date)
            .map(|value| date::parse_date(value, "from_date"))
            .transpose()?;
        let to_date = non_empty(&self.to_date)
            .map(|value| date::parse_date(value, "to_date"))
            .transpose()?;

        if let (Some(from), Some(to)) = (from_date, to_date) {
            if from > to {
                return Err(LedgerError::InvalidDateRange);
            }
        }

        Ok(OperationFilter {
            wallet_id,
            operation_type,
            created_from: from_date.map(date::start_of_day),
            created_before: to_date.and_then(date::start_of_next_day),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ReportEngine {
    store: Arc<dyn LedgerStore>,
    operation_timeout: Duration,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn LedgerStore>, operation_timeout: Duration) -> Self {
        Self {
            store,
            operation_timeout,
        }
    }

    /// Matching operations, most recent first. No match is an empty vec.
    pub async fn query(&self, query: &ReportQuery) -> LedgerResult<Vec<Operation>> {
        let filter = query.validate()?;
        let operations =
            with_deadline(self.operation_timeout, self.store.operations(&filter)).await?;
        tracing::debug!(
            wallet_id = %filter.wallet_id,
            count = operations.len(),
            "Operations fetched"
        );
        Ok(operations)
    }

    /// Query and encode in one step.
    pub async fn export(&self, query: &ReportQuery, format: ExportFormat) -> LedgerResult<Vec<u8>> {
        let operations = self.query(query).await?;
        let rows: Vec<ExportOperation> = operations.iter().map(ExportOperation::from).collect();
        export::encode(format, &rows)
    }
}
