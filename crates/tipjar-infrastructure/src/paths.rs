//! Path management for tipjar configuration files.
//!
//! ```text
//! ~/.config/tipjar/
//! ├── config.toml    # Application configuration
//! └── secret.json    # API keys
//! ```

use std::path::{Path, PathBuf};

use tipjar_core::{Result, TipjarError};

const APP_DIR: &str = "tipjar";
const CONFIG_FILE: &str = "config.toml";
const SECRET_FILE: &str = "secret.json";

/// Resolves tipjar's files, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct TipjarPaths {
    base_path: Option<PathBuf>,
}

impl TipjarPaths {
    /// With `None`, files live under the platform config directory.
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base_path: base_path.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| TipjarError::config("Cannot find config directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(SECRET_FILE))
    }
}
