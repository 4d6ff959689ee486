// src/core/config_manager.rs
//! Unified configuration: optional `config.yaml` sections overridden by
//! environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
const DEFAULT_TOKEN_PATH: &str = ".jobboard/session.toml";
const DEFAULT_LOG_FILE: &str = "/tmp/jobboard.log";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub token_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
    pub filter: String,
}

/// One environment's section of `config.yaml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentSection {
    api_base_url: Option<String>,
    timeout_seconds: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
    token_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl ConfigManager {
    /// Load configuration for the current environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let section = Self::load_section(Path::new("config.yaml"), &environment)?;
        Ok(Self::resolve(section, |key| std::env::var(key).ok()))
    }

    fn get_environment() -> String {
        std::env::var("JOBBOARD_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_section(path: &Path, environment: &str) -> Result<EnvironmentSection> {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Ok(EnvironmentSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_section(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse_section(content: &str, environment: &str) -> Result<EnvironmentSection> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Layer environment variables over a file section, then defaults
    fn resolve(section: EnvironmentSection, env: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| env(key).and_then(|v| v.trim().parse::<u64>().ok());

        let api = ApiConfig {
            base_url: env("JOBBOARD_API_URL")
                .or(section.api_base_url)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout_seconds: parsed("JOBBOARD_TIMEOUT_SECS")
                .or(section.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: section.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff_ms: section.retry_backoff_ms.unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
        };

        let session = SessionConfig {
            token_path: env("JOBBOARD_TOKEN_PATH")
                .map(PathBuf::from)
                .or(section.token_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
        };

        let logging = LoggingConfig {
            log_file: env("JOBBOARD_LOG_FILE")
                .map(PathBuf::from)
                .or(section.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            filter: section
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        Self {
            api,
            session,
            logging,
        }
    }
}
