use anyhow::{Context, Result};
use std::env;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_JWT_SECRET: &str = "booklist-dev-secret-change-me";
const DEFAULT_TOKEN_TTL_SECS: u64 = 2 * 60 * 60;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub log_level: String,
    /// Set when `JWT_SECRET` was absent and the development secret is in use.
    pub using_default_secret: bool,
}

impl AppConfig {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token_ttl_secs = match non_empty("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TOKEN_TTL_SECS must be a number of seconds, got '{}'", raw))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let jwt_secret = non_empty("JWT_SECRET");

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            using_default_secret: jwt_secret.is_none(),
            jwt_secret: jwt_secret.unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            token_ttl_secs,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}
