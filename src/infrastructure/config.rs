//! Configuration infrastructure
//!
//! The collector reads one JSON file with a section per concern. Every
//! section has defaults, so a partial file only overrides what it names.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::domain::classification::PriceTierThresholds;
use crate::domain::sites::{default_sites, SiteConfig};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collector: CollectorConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub pricing: PriceTierThresholds,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    /// Sites in collection order
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collector: CollectorConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            browser: BrowserConfig::default(),
            pricing: PriceTierThresholds::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            sites: default_sites(),
        }
    }
}

/// Inclusive random delay window in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Pick a delay inside the window
    pub fn sample(&self) -> Duration {
        let (low, high) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(fastrand::u64(low..=high))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Pages visited per site at most
    pub page_budget: u32,
    /// Cap on the number of sites, in table order
    pub max_sites: Option<usize>,
    /// Replace a page with labeled sample content once retries are spent
    pub synthesize_on_failure: bool,
    pub page_delay_ms: DelayRange,
    pub site_delay_ms: DelayRange,
    /// Where first-page HTML snapshots go
    pub debug_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_budget: defaults::PAGE_BUDGET,
            max_sites: None,
            synthesize_on_failure: true,
            page_delay_ms: defaults::PAGE_DELAY_MS,
            site_delay_ms: defaults::SITE_DELAY_MS,
            debug_dir: PathBuf::from(defaults::DEBUG_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub ttl_hours: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        let hours = self.ttl_hours.min(defaults::MAX_CACHE_TTL_HOURS);
        chrono::Duration::hours(i64::try_from(hours).unwrap_or_default())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from(defaults::CACHE_DIR),
            ttl_hours: defaults::CACHE_TTL_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    /// Attempts per URL before giving up on the transport
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub backoff_jitter_ms: u64,
    /// Rotated per request
    pub user_agents: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            backoff_base_ms: defaults::BACKOFF_BASE_MS,
            backoff_jitter_ms: defaults::BACKOFF_JITTER_MS,
            user_agents: defaults::USER_AGENTS.iter().map(|ua| (*ua).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Fixed wait after navigation before reading the page
    pub render_wait_ms: u64,
    /// Pause after each scroll step
    pub scroll_pause_ms: u64,
    pub window_size: (u32, u32),
    /// Button texts that dismiss cookie or consent dialogs
    pub consent_texts: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            render_wait_ms: defaults::RENDER_WAIT_MS,
            scroll_pause_ms: defaults::SCROLL_PAUSE_MS,
            window_size: (1920, 1080),
            consent_texts: defaults::CONSENT_TEXTS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(defaults::RAW_DIR),
            processed_dir: PathBuf::from(defaults::PROCESSED_DIR),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Log directory; `None` puts logs next to the executable
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: true,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("headless_chrome".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing file
    Loaded,
    /// Defaults written to a new file
    Created,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the default configuration file location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating the default file if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        self.load_or_create().await.map(|(config, _)| config)
    }

    /// Like [`Self::load_config`], also reporting whether the file was just created
    pub async fn load_or_create(&self) -> Result<(AppConfig, ConfigOrigin)> {
        if !self.config_path.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok((default_config, ConfigOrigin::Created));
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file {:?}", self.config_path))?;

        Ok((config, ConfigOrigin::Loaded))
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Overwrite the file with defaults
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("🔄 Resetting configuration to defaults");
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        Ok(default_config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    use super::DelayRange;

    pub const APP_DIR_NAME: &str = "coffee-market-collector";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Default pages per site
    pub const PAGE_BUDGET: u32 = 5;

    /// Delay between pages of one site
    pub const PAGE_DELAY_MS: DelayRange = DelayRange::new(2000, 4000);

    /// Delay between sites
    pub const SITE_DELAY_MS: DelayRange = DelayRange::new(3000, 6000);

    pub const DEBUG_DIR: &str = "data/debug";
    pub const CACHE_DIR: &str = "data/raw/cache";
    pub const CACHE_TTL_HOURS: u64 = 24;
    /// Ten years; anything longer is treated as this
    pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365 * 10;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;
    pub const MAX_RETRIES: u32 = 3;
    pub const BACKOFF_BASE_MS: u64 = 1000;
    pub const BACKOFF_JITTER_MS: u64 = 2000;

    pub const USER_AGENTS: &[&str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.101 Safari/537.36",
    ];

    pub const RENDER_WAIT_MS: u64 = 4000;
    pub const SCROLL_PAUSE_MS: u64 = 1000;
    pub const CONSENT_TEXTS: &[&str] = &["Accept", "I Agree", "OK", "Got it"];

    pub const RAW_DIR: &str = "data/raw";
    pub const PROCESSED_DIR: &str = "data/processed";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_NAME: &str = "coffee-market.log";
}
