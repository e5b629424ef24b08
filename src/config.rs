//! Configuration loading with layered overrides.
//!
//! Config is loaded in order (each layer overrides the previous):
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables
//! 4. CLI arguments
//!
//! The `[seed]` section provisions the permission catalog and the role/user
//! directory. It is the only way catalog entries enter the store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::DEFAULT_MAP_SIZE;
use crate::db::Store;
use crate::error::{Error, Result};
use crate::types::{PermissionCategory, PermissionItem, RoleRecord, UserRecord};

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub seed: Seed,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// LMDB environment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Upper bound of the memory map, in MiB
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: default_path(),
            map_size_mb: default_map_size_mb(),
        }
    }
}

impl Storage {
    pub fn map_size(&self) -> usize {
        self.map_size_mb.saturating_mul(1 << 20)
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/grantmatrix.mdb")
}

fn default_map_size_mb() -> usize {
    DEFAULT_MAP_SIZE >> 20
}

/// Catalog and directory entries applied at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub categories: Vec<PermissionCategory>,
    #[serde(default)]
    pub items: Vec<PermissionItem>,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl Seed {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.items.is_empty()
            && self.roles.is_empty()
            && self.users.is_empty()
    }
}

/// Builder for loading configuration with customizable options.
#[derive(Debug, Clone)]
pub struct Loader {
    /// Environment variable prefix (e.g., "GRANTMATRIX" -> GRANTMATRIX_HOST, GRANTMATRIX_PORT)
    pub env_prefix: String,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            env_prefix: "GRANTMATRIX".to_string(),
        }
    }
}

impl Loader {
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
        }
    }

    /// Load configuration from file, environment, and CLI arguments.
    pub fn load(
        &self,
        config_path: Option<&Path>,
        cli_host: Option<&str>,
        cli_port: Option<u16>,
        cli_db_path: Option<&Path>,
    ) -> Result<Config> {
        let mut config: Config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
            }
            None => Config::default(),
        };

        let prefix = &self.env_prefix;

        if let Ok(host) = std::env::var(format!("{prefix}_HOST")) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(format!("{prefix}_PORT")) {
            config.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("{prefix}_PORT is not a port number: {e}")))?;
        }
        if let Ok(path) = std::env::var(format!("{prefix}_DB_PATH")) {
            config.storage.path = PathBuf::from(path);
        }

        if let Some(host) = cli_host {
            config.server.host = host.to_string();
        }
        if let Some(port) = cli_port {
            config.server.port = port;
        }
        if let Some(path) = cli_db_path {
            config.storage.path = path.to_path_buf();
        }

        if config.storage.map_size_mb == 0 {
            return Err(Error::Config("storage.map_size_mb must be greater than zero".into()));
        }

        Ok(config)
    }
}

impl Store {
    /// Open the store described by `storage`
    pub fn open_config(storage: &Storage) -> Result<Self> {
        Self::open_with_map_size(&storage.path, storage.map_size())
    }

    /// Upsert the seed's categories, items, roles and users in one transaction.
    /// Categories precede items and roles precede users, so references resolve in order.
    pub fn provision(&self, seed: &Seed) -> Result<()> {
        self.transact(|tx| {
            for c in &seed.categories {
                tx.upsert_category(c)?;
            }
            for i in &seed.items {
                tx.upsert_item(i)?;
            }
            for r in &seed.roles {
                tx.upsert_role(r)?;
            }
            for u in &seed.users {
                tx.upsert_user(u)?;
            }
            Ok(())
        })?;
        info!(
            categories = seed.categories.len(),
            items = seed.items.len(),
            roles = seed.roles.len(),
            users = seed.users.len(),
            "seed provisioned"
        );
        Ok(())
    }
}
