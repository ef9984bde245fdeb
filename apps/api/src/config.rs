use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub user_service_url: String,
    pub analytics_service_url: String,
    pub search: SearchConfig,
    pub download_link_ttl: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Completion endpoint settings, handed to `PromptClient` at construction.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub url: String,
    pub index: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            storage: StorageConfig {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                region: env_or("S3_REGION", "us-east-1"),
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            },
            llm: LlmConfig {
                endpoint: require_env("LLM_ENDPOINT")?,
                api_key: require_env("LLM_API_KEY")?,
                deployment: require_env("LLM_DEPLOYMENT")?,
                api_version: env_or("LLM_API_VERSION", "2024-12-01-preview"),
                timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
                max_retries: parse_env("LLM_MAX_RETRIES", 5)?,
                retry_delay: Duration::from_millis(parse_env("LLM_RETRY_DELAY_MS", 5000)?),
            },
            user_service_url: require_env("USER_SERVICE_URL")?,
            analytics_service_url: require_env("ANALYTICS_SERVICE_URL")?,
            search: SearchConfig {
                url: require_env("SEARCH_URL")?,
                index: env_or("SEARCH_INDEX", "resumes"),
            },
            download_link_ttl: Duration::from_secs(parse_env("DOWNLOAD_LINK_TTL_SECS", 600)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
