// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub api_token: Option<String>,
    /// Used only to compute "liked by me" in post views.
    pub viewer_id: Option<String>,
    pub page_size: u32,
    pub upcoming_limit: u32,
    pub http_timeout: Duration,
    pub log_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary lookup, e.g. a map in tests.
    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("BULLETIN_API_URL")
            .ok_or_else(|| AppError::Config("BULLETIN_API_URL must be set".to_string()))?;
        let api_url = Url::parse(&raw_url)?;

        let page_size = parse_number(&lookup, "BULLETIN_PAGE_SIZE", 10)?;
        let upcoming_limit = parse_number(&lookup, "BULLETIN_UPCOMING_LIMIT", 5)?;
        let timeout_secs = parse_number(&lookup, "BULLETIN_HTTP_TIMEOUT_SECS", 15)?;

        if page_size == 0 {
            return Err(AppError::Config(
                "BULLETIN_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_token: lookup("BULLETIN_API_TOKEN").filter(|t| !t.is_empty()),
            viewer_id: lookup("BULLETIN_VIEWER_ID").filter(|v| !v.is_empty()),
            page_size,
            upcoming_limit,
            http_timeout: Duration::from_secs(u64::from(timeout_secs)),
            log_dir: lookup("BULLETIN_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u32) -> Result<u32, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::Config(format!("{} must be a positive integer, got {:?}", key, raw))),
        None => Ok(default),
    }
}
