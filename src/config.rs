use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const CONFIG_DIR: &str = "joystick-sampler";
const CONFIG_FILE: &str = "sampler.toml";

/// Runtime settings for the sampler
///
/// Every key is optional in the file; missing keys keep their defaults.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SamplerSettings {
    /// Sleep after each loop iteration; 0 polls as fast as the device answers
    pub poll_interval_ms: u64,
    /// Window for the sampling statistics log line; 0 disables it
    pub stats_interval_secs: u64,
    /// Maximum log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 0,
            stats_interval_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

impl SamplerSettings {
    /// Default location: `<config dir>/joystick-sampler/sampler.toml`
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads the settings file, falling back to defaults when it does not exist
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if settings file exists: {}", e))?
        {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read settings file {}: {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| eyre!("Invalid settings in {}: {}", path.display(), e))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse settings: {}", e))?;
        settings.log_level()?;
        Ok(settings)
    }

    pub fn log_level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Unknown log level: {}", self.log_level))
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }

    pub fn stats_interval(&self) -> Option<chrono::Duration> {
        if self.stats_interval_secs == 0 {
            return None;
        }
        i64::try_from(self.stats_interval_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }
}
