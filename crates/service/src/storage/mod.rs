//! Storage abstractions for the record store
//!
//! The ledger and shard layouts are exposed as individual operations so the
//! full read-modify-write cycle used by ledger appends stays visible to
//! callers and tests, and so a lock-protected or transactional backend can
//! be swapped in behind the same contract.

pub mod fs_store;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ServiceError;

/// Trait abstraction over record persistence.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create a ledger file holding an empty array if it does not exist yet.
    async fn init_ledger(&self, ledger: &Path) -> Result<(), ServiceError>;

    /// Create a shard directory if it does not exist yet.
    async fn init_shard_dir(&self, dir: &Path) -> Result<(), ServiceError>;

    /// Append one record to a ledger file via a full read-modify-write cycle.
    async fn append(&self, ledger: &Path, record: &Value) -> Result<(), ServiceError>;

    /// Write one record to `<dir>/user_<id>.json`, overwriting unconditionally.
    async fn write_shard(&self, dir: &Path, id: &str, record: &Value)
        -> Result<(), ServiceError>;

    /// Read a ledger file as an ordered sequence of records.
    async fn read_all(&self, ledger: &Path) -> Result<Vec<Value>, ServiceError>;

    /// Parse every `user_*.json` file in a shard directory. The relative
    /// order is directory-enumeration order, not insertion order.
    async fn list_shard_dir(&self, dir: &Path) -> Result<Vec<Value>, ServiceError>;
}
