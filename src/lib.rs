// Library root - exports for the binary and the integration tests

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{LedgerError, LedgerResult};
pub use handlers::router;

use std::sync::Arc;
use std::time::Duration;

use services::{ReportEngine, WalletIdGenerator, WalletLedger};
use storage::LedgerStore;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<WalletLedger>,
    pub reports: Arc<ReportEngine>,
    pub wallet_ids: Arc<WalletIdGenerator>,
}

impl AppState {
    /// Ledger and report engine share one store.
    pub fn new(store: Arc<dyn LedgerStore>, operation_timeout: Duration) -> Self {
        Self {
            ledger: Arc::new(WalletLedger::new(store.clone(), operation_timeout)),
            reports: Arc::new(ReportEngine::new(store, operation_timeout)),
            wallet_ids: Arc::new(WalletIdGenerator::new()),
        }
    }
}
