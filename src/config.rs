use std::{env, str::FromStr};

use anyhow::{Context, Result};
use chrono::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_VIEW_TTL_MINUTES: i64 = 120;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend_url: String,
    pub port: u16,
    pub secure_cookies: bool,
    pub view_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            port: DEFAULT_PORT,
            secure_cookies: false,
            view_ttl: Duration::minutes(DEFAULT_VIEW_TTL_MINUTES),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let secure_cookies = parse_var(&lookup, "COOKIE_SECURE", false)?;
        let ttl_minutes = parse_var(&lookup, "VIEW_TTL_MINUTES", DEFAULT_VIEW_TTL_MINUTES)?;

        Ok(Self {
            backend_url,
            port,
            secure_cookies,
            view_ttl: Duration::minutes(ttl_minutes.max(1)),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
