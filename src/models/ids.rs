//! Identifier types. Wallet ids are opaque strings produced outside the ledger;
//! operation ids are assigned by storage.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Storage-assigned operation id (Postgres BIGSERIAL).
pub type OperationId = i64;

/// Opaque wallet identifier. Ordering is byte-wise and is what the ledger
/// uses to decide lock acquisition order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    /// Parse at the boundary. Blank ids are rejected.
    pub fn parse(id: &str) -> Result<Self, LedgerError> {
        if id.trim().is_empty() {
            return Err(LedgerError::InvalidRequest("empty wallet id".to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Wrap an id produced by the generator, which is never blank.
    pub(crate) fn from_generated(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WalletId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WalletId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for WalletId {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
