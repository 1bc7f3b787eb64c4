//! Wallet identifier generation: hex SHA-256 over a random UUID and a
//! process-local counter.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::models::WalletId;

#[derive(Debug, Default)]
pub struct WalletIdGenerator {
    counter: AtomicU64,
}

impl WalletIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self) -> WalletId {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(sequence.to_be_bytes());

        WalletId::from_generated(format!("{:x}", hasher.finalize()))
    }
}
