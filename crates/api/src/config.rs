use std::str::FromStr;

use crate::auth::session::SessionConfig;
use crate::image_proxy::ImageProxyConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Admin session lifetime and cookie settings.
    pub session: SessionConfig,
    /// Image proxy limits and allow-list.
    pub image_proxy: ImageProxyConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STATIC_DIR`           | `<crate>/static`           |
    ///
    /// Session and image proxy variables are documented on
    /// [`SessionConfig::from_env`] and [`ImageProxyConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins = parse_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30);

        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| default_static_dir());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            static_dir,
            session: SessionConfig::from_env(),
            image_proxy: ImageProxyConfig::from_env(),
        }
    }
}

/// The `static/` directory shipped with this crate.
pub fn default_static_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string()
}

/// Read and parse an environment variable, falling back to `default` when unset.
///
/// Panics at startup on an unparseable value so misconfiguration fails fast.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Like [`env_or`], but zero is rejected at startup.
pub fn nonzero_env_or(name: &str, default: u64) -> u64 {
    let value = env_or(name, default);
    if value == 0 {
        panic!("{name} must be greater than zero");
    }
    value
}

/// Split a comma-separated list, trimming items and dropping empties.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_drops_empties() {
        assert_eq!(
            parse_list(" a.com, ,b.org ,"),
            vec!["a.com".to_string(), "b.org".to_string()]
        );
    }

    #[test]
    fn env_or_uses_default_when_unset() {
        let value: u64 = env_or("OCWIKI_TEST_SURELY_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn nonzero_env_or_accepts_positive_values() {
        std::env::set_var("OCWIKI_TEST_NONZERO_OK", "15");
        assert_eq!(nonzero_env_or("OCWIKI_TEST_NONZERO_OK", 1), 15);
        assert_eq!(nonzero_env_or("OCWIKI_TEST_NONZERO_UNSET", 3), 3);
    }

    #[test]
    #[should_panic(expected = "must be greater than zero")]
    fn nonzero_env_or_rejects_zero() {
        std::env::set_var("OCWIKI_TEST_NONZERO_ZERO", "0");
        nonzero_env_or("OCWIKI_TEST_NONZERO_ZERO", 1);
    }
}
