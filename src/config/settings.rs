//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Documented placeholder for an unconfigured key slot; a key equal to this
/// value is treated as "not configured" and excluded from the pool
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Number of key-slot environment variables scanned (`VIDEO_API_KEY_1..5`)
pub const MAX_KEY_SLOTS: usize = 5;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Upstream video-data API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoApiConfig {
    /// Base URL of the external video-data API
    pub base_url: String,

    /// Configured API keys, in slot order, placeholder/blank entries excluded
    #[serde(skip_serializing)]
    pub keys: Vec<String>,

    /// Usage ceiling per key before it is treated as exhausted
    pub max_usage_per_key: u32,

    /// Fraction of the ceiling at which a success proactively rotates keys
    pub switch_threshold: f64,

    /// Surface a failed proactive switch instead of swallowing it
    pub surface_switch_failure: bool,

    /// Retry budget per logical request
    pub max_retries: u32,

    /// Per-attempt request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for VideoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            keys: Vec::new(),
            max_usage_per_key: 9000,
            switch_threshold: 0.9,
            surface_switch_failure: false,
            max_retries: 3,
            timeout_seconds: 15,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Upstream API + key pool
    pub video_api: VideoApiConfig,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        let settings = Self {
            app_name: env_or_default("APP_NAME", "vidgate"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8000")
                .parse()
                .context("Invalid PORT value")?,

            video_api: VideoApiConfig {
                base_url: env_or_default(
                    "VIDEO_API_BASE_URL",
                    "https://www.googleapis.com/youtube/v3",
                ),
                keys: Self::collect_api_keys(),
                max_usage_per_key: env_or_default("VIDEO_API_MAX_USAGE_PER_KEY", "9000")
                    .parse()
                    .unwrap_or(9000),
                switch_threshold: env_or_default("VIDEO_API_SWITCH_THRESHOLD", "0.9")
                    .parse()
                    .unwrap_or(0.9),
                surface_switch_failure: env_or_default("VIDEO_API_SURFACE_SWITCH_FAILURE", "false")
                    .parse()
                    .unwrap_or(false),
                max_retries: env_or_default("VIDEO_API_MAX_RETRIES", "3")
                    .parse()
                    .unwrap_or(3),
                timeout_seconds: env_or_default("VIDEO_API_TIMEOUT_SECONDS", "15")
                    .parse()
                    .unwrap_or(15),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Read the numbered key-slot variables and drop unconfigured entries
    fn collect_api_keys() -> Vec<String> {
        let raw: Vec<Option<String>> = (1..=MAX_KEY_SLOTS)
            .map(|n| env::var(format!("VIDEO_API_KEY_{n}")).ok())
            .collect();
        filter_configured_keys(raw)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.video_api.max_usage_per_key == 0 {
            anyhow::bail!("VIDEO_API_MAX_USAGE_PER_KEY must be > 0");
        }

        let threshold = self.video_api.switch_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            anyhow::bail!(
                "VIDEO_API_SWITCH_THRESHOLD must be in (0, 1], got {}",
                threshold
            );
        }

        if self.video_api.timeout_seconds == 0 {
            anyhow::bail!("VIDEO_API_TIMEOUT_SECONDS must be > 0");
        }

        // An empty key set is valid: the service runs in degraded mode
        if self.video_api.keys.is_empty() {
            tracing::warn!(
                "No video API keys configured; all data endpoints will return empty results"
            );
        }

        Ok(())
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "vidgate".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            video_api: VideoApiConfig::default(),
        }
    }
}

/// Drop unset, blank, and placeholder entries, preserving slot order
fn filter_configured_keys(raw: Vec<Option<String>>) -> Vec<String> {
    raw.into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
        .collect()
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "vidgate");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.video_api.max_usage_per_key, 9000);
        assert_eq!(settings.video_api.switch_threshold, 0.9);
        assert!(!settings.video_api.surface_switch_failure);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "dev".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn test_placeholder_and_blank_keys_excluded() {
        let keys = filter_configured_keys(vec![
            Some("real-key-1".to_string()),
            Some(PLACEHOLDER_API_KEY.to_string()),
            None,
            Some("   ".to_string()),
            Some("real-key-2".to_string()),
        ]);
        assert_eq!(keys, vec!["real-key-1", "real-key-2"]);
    }

    #[test]
    fn test_keys_are_trimmed() {
        let keys = filter_configured_keys(vec![Some("  spaced-key  ".to_string())]);
        assert_eq!(keys, vec!["spaced-key"]);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut settings = Settings::default();
        settings.video_api.switch_threshold = 1.5;
        assert!(settings.validate().is_err());

        settings.video_api.switch_threshold = 0.0;
        assert!(settings.validate().is_err());

        settings.video_api.switch_threshold = 1.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8000");
    }
}
