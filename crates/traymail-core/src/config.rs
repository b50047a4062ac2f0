//! Core configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::profile::{ParserType, default_profile_path};
use crate::{Error, Result};

/// Application directory name under the platform config directory.
const APP_DIR: &str = "traymail";

/// Config file name.
const CONFIG_FILE: &str = "core.json";

/// Settings the core itself reads, as opposed to user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Profile path offered when none was saved yet.
    pub default_profile_path: String,
    /// Parser selected when none was saved yet.
    pub default_parser: ParserType,
    /// Minimum percentage increase between two repair progress events.
    progress_step: u8,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_profile_path: default_profile_path().to_string(),
            default_parser: ParserType::default(),
            progress_step: 1,
        }
    }
}

impl CoreConfig {
    /// Progress step, clamped to `1..=100`.
    #[must_use]
    pub fn progress_step(&self) -> u8 {
        self.progress_step.clamp(1, 100)
    }

    /// Set the progress step.
    #[must_use]
    pub const fn with_progress_step(mut self, step: u8) -> Self {
        self.progress_step = step;
        self
    }

    /// Location of the config file under the platform config directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Load the config from its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()).await
    }

    /// Load the config from `path`; a missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        if config.progress_step == 0 || config.progress_step > 100 {
            return Err(Error::Config(format!(
                "progress_step must be 1-100, got {}",
                config.progress_step
            )));
        }
        Ok(config)
    }

    /// Save the config to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        info!("Config saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.default_profile_path, default_profile_path());
        assert_eq!(config.default_parser, ParserType::Sqlite);
        assert_eq!(config.progress_step(), 1);
    }

    #[test]
    fn step_is_clamped() {
        assert_eq!(CoreConfig::default().with_progress_step(0).progress_step(), 1);
        assert_eq!(CoreConfig::default().with_progress_step(250).progress_step(), 100);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: CoreConfig = serde_json::from_str(r#"{"default_parser":"mork"}"#).unwrap();
        assert_eq!(config.default_parser, ParserType::Mork);
        assert_eq!(config.default_profile_path, default_profile_path());
        assert_eq!(config.progress_step(), 1);
    }

    #[test]
    fn default_path_ends_with_app_file() {
        let path = CoreConfig::default_path();
        assert!(path.ends_with("traymail/core.json"));
    }

    #[tokio::test]
    async fn load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::load(&dir.path().join("missing/core.json"))
            .await
            .unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("traymail/core.json");
        let config = CoreConfig {
            default_profile_path: "/opt/tb".to_string(),
            default_parser: ParserType::Mork,
            progress_step: 5,
        };
        config.save(&path).await.unwrap();
        assert_eq!(CoreConfig::load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn rejects_zero_step() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.json");
        tokio::fs::write(&path, r#"{"progress_step":0}"#).await.unwrap();
        assert!(matches!(CoreConfig::load(&path).await, Err(Error::Config(_))));
    }
}
