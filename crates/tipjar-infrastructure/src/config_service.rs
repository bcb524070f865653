//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (see [`TipjarPaths`])
//! and caches it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tipjar_core::config::RootConfig;
use tipjar_core::{Result, TipjarError};

use crate::paths::TipjarPaths;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Service over the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(TipjarPaths::default().config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A file that cannot be read or parsed yields the defaults (not cached,
    /// so a fixed file is picked up on the next call).
    pub fn get_config(&self) -> RootConfig {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}; using defaults", self.path.display(), e);
                RootConfig::default()
            }
        }
    }

    /// Loads the configuration, reporting parse failures.
    pub fn load(&self) -> Result<RootConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = Self::read_file(&self.path)?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Writes the configuration atomically (tmp file + rename) and caches it.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        let tmp_path = self.path.with_extension("toml.tmp");
        {
            let mut tmp_file = fs::File::create(&tmp_path)?;
            tmp_file.write_all(content.as_bytes())?;
            tmp_file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!("Saved configuration to {}", self.path.display());
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn read_file(path: &Path) -> Result<RootConfig> {
        if !path.exists() {
            tracing::debug!("No config at {}; using defaults", path.display());
            return Ok(RootConfig::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            TipjarError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
