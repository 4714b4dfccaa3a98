use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::{COMPLETION_STORE_KEY, DEFAULT_PORT, DEFAULT_SHEET_URL};
use crate::common::error::ConfigError;
use crate::pipeline::processing::normalize::NormalizerProfile;
use crate::visibility::GateMode;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub visibility: VisibilityConfig,
    pub defaults: NormalizerProfile,
    pub completion: CompletionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub sheet_url: String,
    /// No timeout when absent; the transport defaults apply.
    pub timeout_seconds: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub mode: GateMode,
    pub build_is_dev: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            mode: GateMode::default(),
            build_is_dev: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub path: PathBuf,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(format!("{COMPLETION_STORE_KEY}.json")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    /// `config.toml` from the working directory (defaults when absent), then
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(Path::new(CONFIG_PATH))?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `SHEET_URL`, `FEED_TIMEOUT_SECONDS`, `GATE_MODE`, `BUILD_IS_DEV`,
    /// `COMPLETION_STORE_PATH` and `PORT` as found through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SHEET_URL").filter(|v| !v.trim().is_empty()) {
            self.feed.sheet_url = url;
        }
        if let Some(value) = lookup("FEED_TIMEOUT_SECONDS") {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "FEED_TIMEOUT_SECONDS",
                value: value.clone(),
            })?;
            self.feed.timeout_seconds = Some(secs);
        }
        if let Some(value) = lookup("GATE_MODE") {
            self.visibility.mode = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "GATE_MODE",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("BUILD_IS_DEV") {
            self.visibility.build_is_dev =
                parse_bool(&value).ok_or(ConfigError::InvalidEnv {
                    var: "BUILD_IS_DEV",
                    value: value.clone(),
                })?;
        }
        if let Some(path) = lookup("COMPLETION_STORE_PATH") {
            self.completion.path = PathBuf::from(path);
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "PORT",
                value: value.clone(),
            })?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
