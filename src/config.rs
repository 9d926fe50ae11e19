use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_HIDE_AFTER_MS: u64 = 5000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

/// How long a banner message stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageConfig {
    pub hide_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsConfig {
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            hide_after_ms: DEFAULT_HIDE_AFTER_MS,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            path: "logs".to_string(),
        }
    }
}

impl MessageConfig {
    pub fn hide_after(&self) -> Duration {
        Duration::from_millis(self.hide_after_ms)
    }
}

impl BoardConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: BoardConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }
}

pub fn create_config_template(path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&BoardConfig::default())?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

    Ok(())
}
