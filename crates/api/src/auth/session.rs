//! Admin session tokens and the cookie that carries them.
//!
//! The browser holds a random plaintext token; the database only stores its
//! SHA-256 digest.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::{env_or, nonzero_env_or};

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "ocwiki_admin_session";

/// Length of the plaintext session token.
pub const TOKEN_LENGTH: usize = 48;

/// Admin session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in hours.
    pub ttl_hours: i64,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// How often expired sessions are purged, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24 * 7,
            cookie_secure: false,
            cleanup_interval_secs: 3600,
        }
    }
}

impl SessionConfig {
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `SESSION_TTL_HOURS`             | `168`   |
    /// | `SESSION_COOKIE_SECURE`         | `false` |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_hours: env_or("SESSION_TTL_HOURS", defaults.ttl_hours),
            cookie_secure: env_or("SESSION_COOKIE_SECURE", defaults.cookie_secure),
            cleanup_interval_secs: nonzero_env_or(
                "SESSION_CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval_secs,
            ),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_hours * 3600
    }
}

/// Generate a new session token. Returns `(plaintext, sha256_hex)`.
pub fn generate_session_token() -> (String, String) {
    let plaintext: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

/// SHA-256 hex digest of a session token.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Find the session token in the request's `Cookie` headers.
///
/// Browsers may send several `Cookie` headers; each is split on `;`.
/// An empty value counts as absent.
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
