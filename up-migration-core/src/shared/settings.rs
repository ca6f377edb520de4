//! Runtime configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `UP_MIGRATION_*` environment variables (a `.env` file is loaded first).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::shared::constants::*;
use crate::shared::error::MigrationError;
use crate::shared::types::TargetNetwork;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MigrationConfig {
    pub indexer_url: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub indexer_timeout_secs: u64,
    /// No timeout when unset; wallet prompts can stay open for a long time
    pub submission_timeout_secs: Option<u64>,
    pub max_indexer_rows: u32,
    pub up_provider_tokens: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            indexer_url: DEFAULT_INDEXER_URL.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            indexer_timeout_secs: INDEXER_TIMEOUT_SECS,
            submission_timeout_secs: None,
            max_indexer_rows: MAX_INDEXER_ROWS,
            up_provider_tokens: UP_PROVIDER_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from `.env`, the config file and the environment
    pub fn load() -> Result<Self, MigrationError> {
        dotenv::dotenv().ok();
        let path = env::var(CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(Some(&path))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, MigrationError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            log::debug!("Reading configuration file {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("up_provider_tokens"),
        );

        let config: MigrationConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        for (key, url) in [
            ("indexer_url", &self.indexer_url),
            ("rpc_url", &self.rpc_url),
            ("explorer_url", &self.explorer_url),
        ] {
            if url.trim().is_empty() {
                return Err(MigrationError::config(format!("{} cannot be empty", key)));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(MigrationError::config(format!("{} must be an http(s) URL: {}", key, url)));
            }
        }
        if self.max_indexer_rows == 0 {
            return Err(MigrationError::config("max_indexer_rows must be greater than 0"));
        }
        if self.indexer_timeout_secs == 0 {
            return Err(MigrationError::config("indexer_timeout_secs must be greater than 0"));
        }
        if self.submission_timeout_secs == Some(0) {
            return Err(MigrationError::config("submission_timeout_secs must be greater than 0"));
        }
        if self.up_provider_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(MigrationError::config("up_provider_tokens cannot be empty"));
        }
        Ok(())
    }

    pub fn target_network(&self) -> TargetNetwork {
        TargetNetwork {
            rpc_url: self.rpc_url.clone(),
            explorer_url: self.explorer_url.clone(),
            ..TargetNetwork::lukso_mainnet()
        }
    }

    pub fn indexer_timeout(&self) -> Duration {
        Duration::from_secs(self.indexer_timeout_secs)
    }

    pub fn submission_timeout(&self) -> Option<Duration> {
        self.submission_timeout_secs.map(Duration::from_secs)
    }
}
