//! Scan and monitor settings.
//!
//! Settings may come from a TOML file, from interactive prompts, or from both;
//! [`WatchSettings`] holds whatever was supplied and [`WatchSettings::build`]
//! validates it into the immutable configs the monitor loop runs with.

use crate::{ConfigError, KeywordSet};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ITEM_LIMIT: u32 = 100;
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
pub const RECOVERY_DELAY_SECS: u64 = 60;

/// What a single scan cycle looks at.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub subreddit: String,
    pub keywords: KeywordSet,
    /// Maximum number of posts fetched per cycle.
    pub item_limit: u32,
    pub include_comments: bool,
    pub scan_timeout: Duration,
}

impl ScanConfig {
    pub fn new(subreddit: impl Into<String>, keywords: KeywordSet) -> Self {
        Self {
            subreddit: subreddit.into(),
            keywords,
            item_limit: DEFAULT_ITEM_LIMIT,
            include_comments: false,
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
        }
    }

    pub fn with_include_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }

    pub fn with_item_limit(mut self, item_limit: u32) -> Self {
        self.item_limit = item_limit;
        self
    }

    pub fn with_scan_timeout(mut self, scan_timeout: Duration) -> Self {
        self.scan_timeout = scan_timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddit.is_empty() {
            return Err(ConfigError::MissingField {
                field: "subreddit".to_string(),
            });
        }
        if self.subreddit.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(ConfigError::InvalidValue {
                field: "subreddit".to_string(),
                value: self.subreddit.clone(),
            });
        }
        if self.keywords.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one keyword is required".to_string(),
            });
        }
        if self.item_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "item_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.scan_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "scan_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Loop timing.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub check_interval: Duration,
    pub recovery_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            recovery_delay: Duration::from_secs(RECOVERY_DELAY_SECS),
        }
    }
}

/// Partially supplied settings, as read from `subwatch.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSettings {
    pub subreddit: Option<String>,
    pub keywords: Option<KeywordSet>,
    pub include_comments: Option<bool>,
    pub item_limit: Option<u32>,
    pub scan_timeout_secs: Option<u64>,
    pub check_interval_secs: Option<u64>,
}

impl WatchSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validates the collected settings. Absent optional values take their defaults.
    pub fn build(self) -> Result<(ScanConfig, MonitorConfig), ConfigError> {
        let subreddit = self
            .subreddit
            .as_deref()
            .map(normalize_subreddit)
            .ok_or_else(|| ConfigError::MissingField {
                field: "subreddit".to_string(),
            })?;
        let keywords = self.keywords.ok_or_else(|| ConfigError::MissingField {
            field: "keywords".to_string(),
        })?;

        let scan = ScanConfig::new(subreddit, keywords)
            .with_include_comments(self.include_comments.unwrap_or(false))
            .with_item_limit(self.item_limit.unwrap_or(DEFAULT_ITEM_LIMIT))
            .with_scan_timeout(Duration::from_secs(
                self.scan_timeout_secs.unwrap_or(DEFAULT_SCAN_TIMEOUT_SECS),
            ));
        scan.validate()?;

        let check_interval_secs = self
            .check_interval_secs
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);
        if check_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "check_interval_secs".to_string(),
                value: "0".to_string(),
            });
        }
        let monitor = MonitorConfig {
            check_interval: Duration::from_secs(check_interval_secs),
            ..MonitorConfig::default()
        };

        Ok((scan, monitor))
    }
}

/// Accepts `rust`, ` r/rust ` and `/r/rust/` alike.
pub fn normalize_subreddit(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    trimmed
        .strip_prefix("r/")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
