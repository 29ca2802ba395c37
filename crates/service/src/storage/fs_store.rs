use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use crate::errors::ServiceError;
use crate::storage::Storage;

/// JSON-file-backed storage.
///
/// Ledger appends read the whole array, push in memory, and rewrite the file
/// in full. There is no lock and no temp-file rename: two concurrent appends
/// to the same ledger can both read the same prior array, and the later
/// rewrite then discards the earlier append. Callers that need stronger
/// guarantees must bring their own [`Storage`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn init_ledger(&self, ledger: &Path) -> Result<(), ServiceError> {
        if let Some(parent) = ledger.parent() {
            fs::create_dir_all(parent).await.ok();
        }
        if fs::metadata(ledger).await.is_err() {
            fs::write(ledger, b"[]").await.map_err(ServiceError::storage)?;
        }
        Ok(())
    }

    async fn init_shard_dir(&self, dir: &Path) -> Result<(), ServiceError> {
        fs::create_dir_all(dir).await.map_err(ServiceError::storage)
    }

    async fn append(&self, ledger: &Path, record: &Value) -> Result<(), ServiceError> {
        let mut records = self.read_all(ledger).await?;
        records.push(record.clone());
        let data = serde_json::to_vec_pretty(&records).map_err(ServiceError::storage)?;
        fs::write(ledger, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    async fn write_shard(
        &self,
        dir: &Path,
        id: &str,
        record: &Value,
    ) -> Result<(), ServiceError> {
        let path = dir.join(format!("user_{id}.json"));
        let data = serde_json::to_vec_pretty(record).map_err(ServiceError::storage)?;
        fs::write(&path, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    async fn read_all(&self, ledger: &Path) -> Result<Vec<Value>, ServiceError> {
        let bytes = fs::read(ledger).await.map_err(ServiceError::storage)?;
        serde_json::from_slice(&bytes).map_err(ServiceError::storage)
    }

    async fn list_shard_dir(&self, dir: &Path) -> Result<Vec<Value>, ServiceError> {
        let mut entries = fs::read_dir(dir).await.map_err(ServiceError::storage)?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ServiceError::storage)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with("user_") && name.ends_with(".json")) {
                continue;
            }
            let bytes = fs::read(entry.path()).await.map_err(ServiceError::storage)?;
            let record: Value = serde_json::from_slice(&bytes).map_err(ServiceError::storage)?;
            records.push(record);
        }
        Ok(records)
    }
}
