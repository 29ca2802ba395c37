use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8081, worker_threads: Some(4) }
    }
}

/// Persistence settings for the record store.
///
/// `mode` selects the strategy; the path fields cover all modes and unused
/// ones are simply ignored. Defaults reproduce the service's stock layout
/// under `data/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
    #[serde(default = "default_shard_dir")]
    pub shard_dir: String,
    #[serde(default = "default_secondary_ledger_path")]
    pub secondary_ledger_path: String,
    #[serde(default = "default_secondary_shard_dir")]
    pub secondary_shard_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            ledger_path: default_ledger_path(),
            shard_dir: default_shard_dir(),
            secondary_ledger_path: default_secondary_ledger_path(),
            secondary_shard_dir: default_secondary_shard_dir(),
        }
    }
}

pub const STORE_MODES: [&str; 3] = ["ledger", "sharded", "ledger_with_match_shard"];

fn default_mode() -> String { "ledger".into() }
fn default_ledger_path() -> String { "data/received_users.json".into() }
fn default_shard_dir() -> String { "data/users".into() }
fn default_secondary_ledger_path() -> String { "data/matched_users.json".into() }
fn default_secondary_shard_dir() -> String { "data/matched_users".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if !STORE_MODES.contains(&self.mode.as_str()) {
            return Err(anyhow!(
                "storage.mode must be one of {:?}, got {:?}",
                STORE_MODES,
                self.mode
            ));
        }
        for (field, value) in [
            ("storage.ledger_path", &self.ledger_path),
            ("storage.shard_dir", &self.shard_dir),
            ("storage.secondary_ledger_path", &self.secondary_ledger_path),
            ("storage.secondary_shard_dir", &self.secondary_shard_dir),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must not be empty"));
            }
        }
        Ok(())
    }
}
