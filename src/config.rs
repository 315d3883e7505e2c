//! Application configuration loaded from environment variables
//!
//! - `PORT` - Server port number (default: 8080)
//! - `URL` - Public scheme and host used to build short links (default: `http://localhost`)
//! - `BASE_URL` - Full public base URL; overrides `URL`/`PORT` when set
//! - `DATABASE_URL` - Path to database file (default: `data.db`)
//! - `AUTHORIZATION` - Shared secret required on `/api` routes (optional)
//! - `RUST_LOG` - Log filter (default: `shortlink=debug,tower_http=debug`)

use std::env;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST_URL: &str = "http://localhost";
const DEFAULT_DATABASE: &str = "data.db";
const DEFAULT_LOG_FILTER: &str = "shortlink=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Prefix of every short link, without a trailing slash
    pub base_url: String,
    pub database_path: String,
    /// `None` disables the authorization check
    pub auth_token: Option<String>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: format!("{}:{}", DEFAULT_HOST_URL, DEFAULT_PORT),
            database_path: DEFAULT_DATABASE.to_string(),
            auth_token: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let base_url = match lookup("BASE_URL").filter(|v| !v.is_empty()) {
            Some(url) => url,
            None => {
                let host = lookup("URL").unwrap_or_else(|| DEFAULT_HOST_URL.to_string());
                format!("{}:{}", host, port)
            }
        };

        Ok(Self {
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            database_path: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            auth_token: lookup("AUTHORIZATION").filter(|v| !v.is_empty()),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Same configuration with the `/api` secret set
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into()).filter(|t| !t.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.database_path, "data.db");
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn base_url_from_host_and_port() {
        let config =
            Config::from_lookup(lookup_from(&[("URL", "https://sho.rt"), ("PORT", "9000")])).unwrap();
        assert_eq!(config.base_url, "https://sho.rt:9000");
    }

    #[test]
    fn explicit_base_url_wins() {
        let config = Config::from_lookup(lookup_from(&[
            ("URL", "http://ignored"),
            ("BASE_URL", "https://sho.rt/"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://sho.rt");
    }

    #[test]
    fn empty_authorization_disables_auth() {
        let config = Config::from_lookup(lookup_from(&[("AUTHORIZATION", "")])).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
