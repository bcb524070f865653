//! Secret service implementation.
//!
//! Reads API credentials from `secret.json`; `PINATA_API_KEY` and
//! `PINATA_SECRET_API_KEY` take precedence over the file.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tipjar_core::config::{PinataConfig, SecretConfig};
use tipjar_core::secret::SecretService;
use tipjar_core::{Result, TipjarError};

use crate::paths::TipjarPaths;

pub const PINATA_API_KEY_ENV: &str = "PINATA_API_KEY";
pub const PINATA_SECRET_API_KEY_ENV: &str = "PINATA_SECRET_API_KEY";

/// File-backed secret service with a process-wide cache.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(TipjarPaths::default().secret_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig> {
        {
            let cached = self.secrets.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref secrets) = *cached {
                return Ok(secrets.clone());
            }
        }

        let from_file = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            // The parse error is dropped: serde_json may echo the offending input.
            serde_json::from_str(&content).map_err(|_| {
                TipjarError::config(format!("Malformed secret file {}", self.path.display()))
            })?
        } else {
            SecretConfig::default()
        };

        let loaded = apply_env_overrides(from_file, |key| std::env::var(key).ok());
        *self.secrets.write().unwrap_or_else(|e| e.into_inner()) = Some(loaded.clone());
        Ok(loaded)
    }
}

/// Overlays credentials found through `lookup` onto the file contents.
///
/// A key set in the environment replaces the file's value; when the file has
/// no pinata section, both variables are needed to create one.
pub fn apply_env_overrides(
    mut secrets: SecretConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SecretConfig {
    let api_key = lookup(PINATA_API_KEY_ENV).filter(|v| !v.is_empty());
    let secret_api_key = lookup(PINATA_SECRET_API_KEY_ENV).filter(|v| !v.is_empty());

    secrets.pinata = match (secrets.pinata.take(), api_key, secret_api_key) {
        (Some(mut pinata), api_key, secret_api_key) => {
            if let Some(key) = api_key {
                pinata.api_key = key;
            }
            if let Some(secret) = secret_api_key {
                pinata.secret_api_key = secret;
            }
            Some(pinata)
        }
        (None, Some(api_key), Some(secret_api_key)) => Some(PinataConfig {
            api_key,
            secret_api_key,
        }),
        (None, _, _) => None,
    };
    secrets
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.path.exists()
    }
}
