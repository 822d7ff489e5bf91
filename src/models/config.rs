//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target page and polling cadence
    #[serde(default)]
    pub watch: WatchConfig,

    /// HTTP fetch behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Keyword exclusion rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Storage and log file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Missing required fields are a fatal startup condition.
    pub fn validate(&self) -> Result<()> {
        if self.watch.url.trim().is_empty() {
            return Err(AppError::validation("watch.url is required"));
        }
        if self.watch.interval_secs == 0 {
            return Err(AppError::validation("watch.interval_secs must be > 0"));
        }
        if self.watch.backoff_secs == 0 {
            return Err(AppError::validation("watch.backoff_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.telegram.bot_token.trim().is_empty() {
            return Err(AppError::validation("telegram.bot_token is required"));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(AppError::validation("telegram.chat_id is required"));
        }
        Ok(())
    }
}

/// Target page and polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Listing page to poll (required)
    #[serde(default)]
    pub url: String,

    /// Nominal pause between cycles, in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Recovery pause after a failed cycle, in seconds
    #[serde(default = "defaults::backoff")]
    pub backoff_secs: u64,
}

impl WatchConfig {
    /// Nominal inter-cycle pause.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Pause after a recoverable or unexpected cycle failure.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval_secs: defaults::interval(),
            backoff_secs: defaults::backoff(),
        }
    }
}

/// HTTP client settings for page fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Telegram Bot API delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot credential (required)
    #[serde(default)]
    pub bot_token: String,

    /// Destination chat (required)
    #[serde(default)]
    pub chat_id: String,

    /// API base URL, overridable for testing
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Send timeout in seconds
    #[serde(default = "defaults::telegram_timeout")]
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: defaults::api_base(),
            timeout_secs: defaults::telegram_timeout(),
        }
    }
}

/// Keyword exclusion rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Listings whose title or description contains any of these
    /// (case-insensitive substring match) are suppressed
    #[serde(default = "defaults::excluded_keywords")]
    pub excluded_keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_keywords: defaults::excluded_keywords(),
        }
    }
}

/// Storage and log file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON file holding the already-seen listing ids
    #[serde(default = "defaults::seen_ids_file")]
    pub seen_ids_file: String,

    /// Log file, appended alongside console output
    #[serde(default = "defaults::log_file")]
    pub log_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seen_ids_file: defaults::seen_ids_file(),
            log_file: defaults::log_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level printed: debug, info, warn or error
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Watch defaults
    pub fn interval() -> u64 {
        600
    }
    pub fn backoff() -> u64 {
        300
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux armv7l) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Telegram defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn telegram_timeout() -> u64 {
        10
    }

    // Filter defaults
    pub fn excluded_keywords() -> Vec<String> {
        vec![
            "tausch".into(),
            "nur frauen".into(),
            "coworking".into(),
            "büro".into(),
            "büroräum".into(),
            "büroraum".into(),
            "praxis".into(),
        ]
    }

    // Path defaults
    pub fn seen_ids_file() -> String {
        "seen_ids.json".into()
    }
    pub fn log_file() -> String {
        "wgbot.log".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
