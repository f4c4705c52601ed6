use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Local development server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// How many refreshed lists may fail to contain a new post before giving up
pub const DEFAULT_MAX_INCREMENT_REFRESHES: u32 = 3;

/// Page configuration stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub server_url: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default = "default_max_increment_refreshes")]
    pub max_increment_refreshes: u32,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

fn default_max_increment_refreshes() -> u32 {
    DEFAULT_MAX_INCREMENT_REFRESHES
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            server_url: std::env::var("TRACKSHARE_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            session_token: None,
            max_increment_refreshes: DEFAULT_MAX_INCREMENT_REFRESHES,
            last_updated: chrono::Utc::now(),
        }
    }
}

impl PageConfig {
    /// The slice of configuration a single page instance needs
    pub fn page_options(&self, log_config: LogConfig) -> PageOptions {
        PageOptions {
            max_increment_refreshes: self.max_increment_refreshes,
            log_config,
        }
    }
}

/// Per-page settings handed to the controller at mount
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Refresh attempts allowed for one increment; zero disables refreshing
    pub max_increment_refreshes: u32,
    pub log_config: LogConfig,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            max_increment_refreshes: DEFAULT_MAX_INCREMENT_REFRESHES,
            log_config: LogConfig::disabled(),
        }
    }
}

/// Configuration manager for the .trackshare directory
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted in the user's home directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Self::with_dir(config_dir)
    }

    /// Create a config manager rooted in an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .context("Failed to create .trackshare directory")?;
        }

        Ok(Self { config_dir })
    }

    /// Get the .trackshare configuration directory path
    fn get_config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .context("Could not determine home directory")?;
        Ok(home_dir.join(".trackshare"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn get_page_config_file(&self) -> PathBuf {
        self.config_dir.join("page_config.json")
    }

    /// Save page configuration
    pub fn save_page_config(&self, config: &PageConfig) -> Result<()> {
        let config_file = self.get_page_config_file();
        let json = serde_json::to_string_pretty(config)
            .context("Failed to serialize page config")?;

        fs::write(&config_file, json)
            .context("Failed to write page config file")?;

        Ok(())
    }

    /// Load page configuration, `None` if it was never saved
    pub fn load_page_config(&self) -> Result<Option<PageConfig>> {
        let config_file = self.get_page_config_file();

        if !config_file.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&config_file)
            .context("Failed to read page config file")?;

        let config: PageConfig = serde_json::from_str(&json)
            .context("Failed to parse page config")?;

        Ok(Some(config))
    }

    /// Load the stored configuration or fall back to defaults
    pub fn load_or_default(&self) -> Result<PageConfig> {
        Ok(self.load_page_config()?.unwrap_or_default())
    }
}
