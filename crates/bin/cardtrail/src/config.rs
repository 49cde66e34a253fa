//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `cardtrail.toml` in the working directory unless another path
//! is given. Every field has a default so the file is optional. Environment
//! variables take precedence over file values; the unprefixed names
//! (`API_KEY`, `API_TOKEN`, `BOARD_ID`, `SHEET_ID`) keep existing `.env`
//! files working.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Deserialize;

use cardtrail_app::services::aggregator::FetchStrategy;
use cardtrail_domain::cache::DEFAULT_FRESHNESS_HOURS;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "cardtrail.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trello credentials and fetch settings.
    pub trello: TrelloSection,
    /// Local response cache.
    pub cache: CacheSection,
    /// CSV output.
    pub output: OutputSection,
    /// Google Sheets output.
    pub sheets: SheetsSection,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrelloSection {
    pub api_key: String,
    pub api_token: String,
    pub base_url: String,
    /// Board used by `cardtrail board` when none is given.
    pub board_id: Option<String>,
    pub strategy: FetchStrategy,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub path: PathBuf,
    pub freshness_hours: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub csv_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    pub enabled: bool,
    pub spreadsheet_id: Option<String>,
    pub service_account_key_path: PathBuf,
    pub sheet_name: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed,
    /// or if the merged configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides looked up through `var`. When both a prefixed and an
    /// unprefixed name are set, the prefixed one wins.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let first = |names: &[&str]| names.iter().rev().find_map(|name| var(name));

        if let Some(val) = first(&["API_KEY", "CARDTRAIL_API_KEY"]) {
            self.trello.api_key = val;
        }
        if let Some(val) = first(&["API_TOKEN", "CARDTRAIL_API_TOKEN"]) {
            self.trello.api_token = val;
        }
        if let Some(val) = first(&["BOARD_ID", "CARDTRAIL_BOARD_ID"]) {
            self.trello.board_id = Some(val);
        }
        if let Some(val) = first(&["SHEET_ID", "CARDTRAIL_SHEET_ID"]) {
            self.sheets.spreadsheet_id = Some(val);
            self.sheets.enabled = true;
        }
        if let Some(val) = var("CARDTRAIL_CACHE_PATH") {
            self.cache.path = val.into();
        }
        if let Some(val) = var("CARDTRAIL_CSV_PATH") {
            self.output.csv_path = val.into();
        }
        if let Some(val) = var("CARDTRAIL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trello.api_key.trim().is_empty() || self.trello.api_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "API key and token must be set (API_KEY and API_TOKEN)".to_string(),
            ));
        }
        if self.trello.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be at least one second".to_string(),
            ));
        }
        if self.cache.freshness_hours == 0 {
            return Err(ConfigError::Validation(
                "cache freshness must be at least one hour".to_string(),
            ));
        }
        if self.sheets.enabled
            && self
                .sheets
                .spreadsheet_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "sheets output is enabled but no spreadsheet id is set (SHEET_ID)".to_string(),
            ));
        }
        Ok(())
    }
}

impl CacheSection {
    #[must_use]
    pub fn freshness(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.freshness_hours))
    }
}

impl Default for TrelloSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            base_url: cardtrail_adapter_trello_reqwest::DEFAULT_BASE_URL.to_string(),
            board_id: None,
            strategy: FetchStrategy::default(),
            timeout_secs: 30,
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            path: cardtrail_adapter_cache_json::DEFAULT_PATH.into(),
            freshness_hours: u32::try_from(DEFAULT_FRESHNESS_HOURS).unwrap_or(24),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            csv_path: cardtrail_adapter_csv::DEFAULT_PATH.into(),
        }
    }
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            spreadsheet_id: None,
            service_account_key_path: "google/service-account.json".into(),
            sheet_name: cardtrail_adapter_sheets::DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn,cardtrail=info,cardtrail_app=info,cardtrail_adapter_csv=info,cardtrail_adapter_sheets=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
