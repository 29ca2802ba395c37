use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use models::UserRecord;

use crate::errors::ServiceError;
use crate::storage::{fs_store::FsStorage, Storage};

/// Token checked against `name` (case-insensitive substring) when the store
/// runs in [`StoreMode::LedgerWithMatchShard`].
pub const NAME_MATCH_TOKEN: &str = "david";

/// Persistence strategy for accepted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreMode {
    /// All records appended to one JSON array file.
    Ledger,
    /// One `user_<id>.json` file per record; duplicate ids overwrite.
    Sharded,
    /// Ledger append, plus a secondary ledger and shard file for records
    /// whose name matches [`NAME_MATCH_TOKEN`].
    LedgerWithMatchShard,
}

impl FromStr for StoreMode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ledger" => Ok(Self::Ledger),
            "sharded" => Ok(Self::Sharded),
            "ledger_with_match_shard" => Ok(Self::LedgerWithMatchShard),
            other => Err(ServiceError::Validation(format!("unknown store mode: {other}"))),
        }
    }
}

/// Filesystem targets the store writes to. Which ones are touched depends on
/// the mode; unused paths are never created.
#[derive(Clone, Debug)]
pub struct StorePaths {
    pub ledger: PathBuf,
    pub shard_dir: PathBuf,
    pub secondary_ledger: PathBuf,
    pub secondary_shard_dir: PathBuf,
}

/// File-backed store for accepted user records.
///
/// One component covers the three persistence strategies; `mode` decides
/// which targets [`submit`](Self::submit) writes and [`list`](Self::list)
/// reads.
#[derive(Clone)]
pub struct UserStore {
    storage: Arc<dyn Storage>,
    mode: StoreMode,
    paths: StorePaths,
}

impl UserStore {
    /// Initialize the store with the default filesystem backend. Ledger
    /// files start out as empty arrays, shard directories are created.
    pub async fn new(mode: StoreMode, paths: StorePaths) -> Result<Arc<Self>, ServiceError> {
        Self::with_storage(Arc::new(FsStorage::new()), mode, paths).await
    }

    /// Same as [`new`](Self::new) with an injected storage backend.
    pub async fn with_storage(
        storage: Arc<dyn Storage>,
        mode: StoreMode,
        paths: StorePaths,
    ) -> Result<Arc<Self>, ServiceError> {
        match mode {
            StoreMode::Ledger => storage.init_ledger(&paths.ledger).await?,
            StoreMode::Sharded => storage.init_shard_dir(&paths.shard_dir).await?,
            StoreMode::LedgerWithMatchShard => {
                storage.init_ledger(&paths.ledger).await?;
                storage.init_ledger(&paths.secondary_ledger).await?;
                storage.init_shard_dir(&paths.secondary_shard_dir).await?;
            }
        }
        Ok(Arc::new(Self { storage, mode, paths }))
    }

    /// Accept a submitted body, persist it per the configured mode, and echo
    /// the stored record back unchanged. Validation failures return before
    /// any storage I/O. The submission time only reaches the log, never the
    /// stored record.
    pub async fn submit(&self, body: Value) -> Result<UserRecord, ServiceError> {
        let record = UserRecord::from_submission(body)?;
        let value = record.as_value();
        match self.mode {
            StoreMode::Ledger => {
                self.storage.append(&self.paths.ledger, &value).await?;
            }
            StoreMode::Sharded => {
                self.storage
                    .write_shard(&self.paths.shard_dir, &record.shard_id(), &value)
                    .await?;
            }
            StoreMode::LedgerWithMatchShard => {
                self.storage.append(&self.paths.ledger, &value).await?;
                if record.name_matches(NAME_MATCH_TOKEN) {
                    self.storage
                        .write_shard(
                            &self.paths.secondary_shard_dir,
                            &record.shard_id(),
                            &value,
                        )
                        .await?;
                    self.storage.append(&self.paths.secondary_ledger, &value).await?;
                }
            }
        }
        info!(name = record.name().unwrap_or_default(), "user record stored");
        Ok(record)
    }

    /// Return every stored record as raw JSON values. Ledger modes preserve
    /// insertion order; sharded mode returns directory-enumeration order.
    pub async fn list(&self) -> Result<Vec<Value>, ServiceError> {
        match self.mode {
            StoreMode::Ledger | StoreMode::LedgerWithMatchShard => {
                self.storage.read_all(&self.paths.ledger).await
            }
            StoreMode::Sharded => self.storage.list_shard_dir(&self.paths.shard_dir).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn paths_under(root: &std::path::Path) -> StorePaths {
        StorePaths {
            ledger: root.join("received_users.json"),
            shard_dir: root.join("users"),
            secondary_ledger: root.join("matched_users.json"),
            secondary_shard_dir: root.join("matched_users"),
        }
    }

    fn temp_root() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("user_store_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn ledger_submit_then_list_round_trip() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = UserStore::new(StoreMode::Ledger, paths_under(&root)).await?;

        assert!(store.list().await?.is_empty());

        let rec = store
            .submit(json!({"name": "Ann", "email": "ann@x.com"}))
            .await?;
        assert_eq!(rec.name(), Some("Ann"));

        let listed = store.list().await?;
        assert_eq!(listed, vec![json!({"name": "Ann", "email": "ann@x.com"})]);

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn double_submit_yields_two_ledger_entries() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = UserStore::new(StoreMode::Ledger, paths_under(&root)).await?;

        let body = json!({"name": "Ann", "email": "ann@x.com"});
        store.submit(body.clone()).await?;
        store.submit(body).await?;
        assert_eq!(store.list().await?.len(), 2);

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejected_submission_leaves_state_untouched() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = UserStore::new(StoreMode::Ledger, paths_under(&root)).await?;

        let before = store.list().await?;
        let res = store.submit(json!({"name": "NoMail"})).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(store.list().await?, before);

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn sharded_submit_writes_per_id_files() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let paths = paths_under(&root);
        let store = UserStore::new(StoreMode::Sharded, paths.clone()).await?;

        store.submit(json!({"name": "Bo", "email": "bo@x.com", "id": 7})).await?;
        assert!(tokio::fs::metadata(paths.shard_dir.join("user_7.json")).await.is_ok());

        // no id falls back to identifier 0
        store.submit(json!({"name": "Noid", "email": "n@x.com"})).await?;
        assert!(tokio::fs::metadata(paths.shard_dir.join("user_0.json")).await.is_ok());

        // same id overwrites instead of adding a record
        store.submit(json!({"name": "Bob", "email": "bob@x.com", "id": 7})).await?;
        let listed = store.list().await?;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|r| r["name"] == "Bob"));
        assert!(!listed.iter().any(|r| r["name"] == "Bo"));

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn matched_name_reaches_secondary_targets() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let paths = paths_under(&root);
        let store = UserStore::new(StoreMode::LedgerWithMatchShard, paths.clone()).await?;

        store
            .submit(json!({"name": "David King", "email": "d@x.com", "id": 3}))
            .await?;
        store.submit(json!({"name": "Ann", "email": "a@x.com", "id": 4})).await?;

        // primary ledger holds both, insertion order
        let primary = store.list().await?;
        assert_eq!(primary.len(), 2);
        assert_eq!(primary[0]["name"], "David King");
        assert_eq!(primary[1]["name"], "Ann");

        // only the matched record reaches the secondary ledger and shard dir
        let storage = FsStorage::new();
        let secondary = storage.read_all(&paths.secondary_ledger).await?;
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0]["name"], "David King");
        assert!(tokio::fs::metadata(paths.secondary_shard_dir.join("user_3.json"))
            .await
            .is_ok());
        assert!(tokio::fs::metadata(paths.secondary_shard_dir.join("user_4.json"))
            .await
            .is_err());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn match_is_case_insensitive() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let paths = paths_under(&root);
        let store = UserStore::new(StoreMode::LedgerWithMatchShard, paths.clone()).await?;

        store.submit(json!({"name": "DAVID Jr", "email": "j@x.com"})).await?;

        let storage = FsStorage::new();
        let secondary = storage.read_all(&paths.secondary_ledger).await?;
        assert_eq!(secondary.len(), 1);

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("ledger".parse::<StoreMode>().unwrap(), StoreMode::Ledger);
        assert_eq!("sharded".parse::<StoreMode>().unwrap(), StoreMode::Sharded);
        assert_eq!(
            "ledger_with_match_shard".parse::<StoreMode>().unwrap(),
            StoreMode::LedgerWithMatchShard
        );
        assert!("replicated".parse::<StoreMode>().is_err());
    }
}
