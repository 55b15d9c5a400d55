//! File-backed JSON configuration store.
//!
//! Plugins persist their options as a small JSON object. A missing or
//! malformed file is never fatal: the store falls back to the type's
//! default and writes it back so the file on disk is always well-formed
//! after the first load.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("Failed to write config file {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("Failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One JSON document on disk, owned by a single plugin.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, substituting the default on any failure.
    ///
    /// The resolved value is persisted back unconditionally, matching the
    /// file to whatever the plugin is actually running with. Persistence
    /// failures are logged and swallowed; config handling has no fatal path.
    pub async fn load_or_default<C>(&self) -> C
    where
        C: DeserializeOwned + Serialize + Default,
    {
        let config = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<C>(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Malformed config file {}, using defaults: {}",
                        self.path.display(),
                        e
                    );
                    C::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Config file {} not found, creating defaults",
                    self.path.display()
                );
                C::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read config file {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                C::default()
            }
        };

        if let Err(e) = self.save(&config).await {
            warn!("Failed to persist config: {}", e);
        }

        config
    }

    pub async fn save<C: Serialize>(&self, config: &C) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::Write(self.path.clone(), e))
    }
}
