// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Runtime configuration read from environment variables.

use crate::error::{SiteCheckError, SiteCheckResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SiteCheckBot/1.0)";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Settings for outbound requests made while analyzing a page
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Upper bound on a page body, both on the wire and after decompression
    pub max_body_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub fetcher: FetcherConfig,
    /// Revalidation window for cached analyzer results
    pub cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present; every variable has a default.
    pub fn from_env() -> SiteCheckResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let timeout_secs: u64 = parse_var("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        let cache_ttl_secs: u64 = parse_var("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let max_body_bytes: usize = parse_var("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;

        if timeout_secs == 0 {
            return Err(SiteCheckError::Config(
                "FETCH_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if max_body_bytes == 0 {
            return Err(SiteCheckError::Config(
                "MAX_BODY_BYTES must be greater than zero".to_string(),
            ));
        }
        if cache_ttl_secs == 0 {
            return Err(SiteCheckError::Config(
                "CACHE_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host: get_var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 3000)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            fetcher: FetcherConfig {
                user_agent: get_var_or("USER_AGENT", DEFAULT_USER_AGENT),
                timeout: Duration::from_secs(timeout_secs),
                max_body_bytes,
            },
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &str, default: T) -> SiteCheckResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SiteCheckError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
