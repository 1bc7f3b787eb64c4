pub mod ledger;
pub mod report;
pub mod wallet_id;

pub use ledger::{TransferReceipt, WalletLedger};
pub use report::{ReportEngine, ReportQuery};
pub use wallet_id::WalletIdGenerator;

use std::future::Future;
use std::time::Duration;

use crate::error::{LedgerError, LedgerResult};

/// Run `fut` under a deadline. On expiry the future is dropped, which rolls
/// back any unit of work it owned and releases its row locks.
pub(crate) async fn with_deadline<T, F>(limit: Duration, fut: F) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Aborted("operation timed out".to_string())),
    }
}
