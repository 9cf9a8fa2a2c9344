//! JSON-file persistence for the set of tickers with auto-ordering enabled.
//!
//! File layout: `{"enabled": ["BTCUSDT", "HYPEUSDT"]}` (sorted).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const DEFAULT_STATE_PATH: &str = "auto_order_state.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "io: {}", e),
            StorageError::Json(e) => write!(f, "json: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    enabled: BTreeSet<String>,
}

pub struct AutoOrderStore {
    path: PathBuf,
    enabled: RwLock<BTreeSet<String>>,
}

impl AutoOrderStore {
    /// Load the store from `path`. A missing or unreadable file yields an
    /// empty set.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let enabled = match read_state(&path).await {
            Ok(Some(state)) => {
                info!(
                    path = %path.display(),
                    enabled = ?state.enabled,
                    "AutoOrderStore: loaded {} enabled tickers",
                    state.enabled.len()
                );
                state.enabled
            }
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "AutoOrderStore: could not load state, starting empty"
                );
                BTreeSet::new()
            }
        };
        Self {
            path,
            enabled: RwLock::new(enabled),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_enabled(&self, ticker: &str) -> bool {
        self.enabled.read().await.contains(ticker)
    }

    /// Enabled tickers, sorted.
    pub async fn enabled(&self) -> Vec<String> {
        self.enabled.read().await.iter().cloned().collect()
    }

    /// Flip `ticker` and persist. Returns the new state.
    ///
    /// The in-memory flip stands even if the write fails.
    pub async fn toggle(&self, ticker: &str) -> Result<bool, StorageError> {
        let (now_enabled, snapshot) = {
            let mut enabled = self.enabled.write().await;
            let now_enabled = if enabled.remove(ticker) {
                false
            } else {
                enabled.insert(ticker.to_string());
                true
            };
            (now_enabled, enabled.clone())
        };
        info!(
            ticker = %ticker,
            enabled = now_enabled,
            "AutoOrderStore: {} auto-order {}",
            ticker,
            if now_enabled { "enabled" } else { "disabled" }
        );
        self.persist(snapshot).await?;
        Ok(now_enabled)
    }

    pub async fn set_enabled(&self, ticker: &str, on: bool) -> Result<(), StorageError> {
        let snapshot = {
            let mut enabled = self.enabled.write().await;
            if on {
                enabled.insert(ticker.to_string());
            } else {
                enabled.remove(ticker);
            }
            enabled.clone()
        };
        self.persist(snapshot).await
    }

    async fn persist(&self, enabled: BTreeSet<String>) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(&StateFile { enabled })?;
        if let Err(e) = tokio::fs::write(&self.path, body).await {
            warn!(
                path = %self.path.display(),
                error = %e,
                "AutoOrderStore: could not save state"
            );
            return Err(e.into());
        }
        Ok(())
    }
}

async fn read_state(path: &Path) -> Result<Option<StateFile>, StorageError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}
