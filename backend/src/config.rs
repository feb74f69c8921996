use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:subscriptions.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite URL; the database file is created if missing
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Single allowed CORS origin; `None` allows any origin
    pub cors_allow_origin: Option<HeaderValue>,
}

impl AppConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR '{}' is not a valid socket address", bind_addr))?;

        let cors_allow_origin = match get("CORS_ALLOW_ORIGIN") {
            None => None,
            Some(origin) if origin == "*" => None,
            Some(origin) => Some(HeaderValue::from_str(&origin).with_context(|| {
                format!("CORS_ALLOW_ORIGIN '{}' is not a valid header value", origin)
            })?),
        };

        Ok(Self {
            database_url,
            bind_addr,
            cors_allow_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("Failed to load config");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("CORS_ALLOW_ORIGIN", "http://localhost:3000"),
        ]))
        .expect("Failed to load config");

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.cors_allow_origin,
            Some(HeaderValue::from_static("http://localhost:3000"))
        );
    }

    #[test]
    fn test_blank_and_wildcard_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "  "),
            ("CORS_ALLOW_ORIGIN", "*"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = AppConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }

    #[test]
    fn test_invalid_origin() {
        let err = AppConfig::from_lookup(lookup(&[("CORS_ALLOW_ORIGIN", "http://bad\u{7f}host")]))
            .unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOW_ORIGIN"));
    }
}
