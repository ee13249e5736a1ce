//! Image proxy: relays external images so pages never hotlink third-party
//! hosts directly.
//!
//! Only absolute `http`/`https` URLs are fetched. Hosts are checked against
//! the configured allow-list, and literal loopback, private and link-local
//! addresses are refused.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::response::{IntoResponse, Response};
use ocwiki_core::error::CoreError;
use ocwiki_core::sanitize::sanitize_error_message;
use reqwest::Url;
use serde::Deserialize;

use crate::config::{env_or, parse_list};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Route the proxy is mounted at.
pub const PROXY_PATH: &str = "/api/image-proxy";

/// `Cache-Control` sent with every relayed image (one day).
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=86400";

/// Image proxy settings.
#[derive(Debug, Clone)]
pub struct ImageProxyConfig {
    /// Hosts that may be fetched. A host matches an entry exactly or as a
    /// subdomain of it. Empty means any public host.
    pub allowed_hosts: Vec<String>,
    /// Largest body relayed, in bytes.
    pub max_bytes: usize,
    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImageProxyConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            max_bytes: 10 * 1024 * 1024,
            timeout_secs: 10,
        }
    }
}

impl ImageProxyConfig {
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `IMAGE_PROXY_ALLOWED_HOSTS` | (empty)    |
    /// | `IMAGE_PROXY_MAX_BYTES`     | `10485760` |
    /// | `IMAGE_PROXY_TIMEOUT_SECS`  | `10`       |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let allowed_hosts = std::env::var("IMAGE_PROXY_ALLOWED_HOSTS")
            .map(|raw| {
                parse_list(&raw)
                    .into_iter()
                    .map(|h| h.to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            allowed_hosts,
            max_bytes: env_or("IMAGE_PROXY_MAX_BYTES", defaults.max_bytes),
            timeout_secs: env_or("IMAGE_PROXY_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }
}

/// Rewrite an image `src` for use in a page.
///
/// Relative and root-relative URLs are returned unchanged; absolute
/// `http(s)` URLs are routed through the proxy. Anything else is returned
/// unchanged.
pub fn proxied_image_url(src: &str) -> String {
    let trimmed = src.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return trimmed.to_string();
    }

    let query: String = Url::parse("http://proxy.invalid/")
        .map(|mut base| {
            base.query_pairs_mut().append_pair("url", trimmed);
            base.query().unwrap_or_default().to_string()
        })
        .unwrap_or_default();
    format!("{PROXY_PATH}?{query}")
}

/// Parse and vet a proxy target.
///
/// - unparseable, relative or non-http(s) URL -> 400
/// - `localhost`, literal loopback/private/link-local IP -> 403
/// - host outside a non-empty allow-list -> 403
pub fn validate_target(raw: &str, allowed_hosts: &[String]) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|_| AppError::BadRequest("The url parameter must be an absolute URL".into()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(
            "Only http and https URLs can be proxied".into(),
        ));
    }

    let host = url
        .host_str()
        .ok_or_else(|| AppError::BadRequest("The url parameter has no host".into()))?
        .to_ascii_lowercase();

    if is_blocked_host(&host) {
        return Err(AppError::Core(CoreError::Forbidden(
            "That host cannot be proxied".into(),
        )));
    }

    if !host_allowed(&host, allowed_hosts) {
        return Err(AppError::Core(CoreError::Forbidden(
            "That host is not on the image allow-list".into(),
        )));
    }

    Ok(url)
}

fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    allowed_hosts.is_empty()
        || allowed_hosts.iter().any(|allowed| {
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
}

fn is_blocked_host(host: &str) -> bool {
    // `localhost.` is the same name as `localhost`.
    let host = host.strip_suffix('.').unwrap_or(host);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => is_blocked_v4(ip),
        Ok(IpAddr::V6(ip)) => is_blocked_v6(ip),
        Err(_) => false,
    }
}

fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // "This network", 0.0.0.0/8.
        || a == 0
        // Carrier-grade NAT, 100.64.0.0/10.
        || (a == 100 && (b & 0xc0) == 64)
}

fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // Unique local, fc00::/7.
        || (first & 0xfe00) == 0xfc00
        // Link-local, fe80::/10.
        || (first & 0xffc0) == 0xfe80
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// Outbound client for the proxy. Redirects are never followed.
pub fn build_http_client(config: &ImageProxyConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("ocwiki/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// An upstream image that passed every check.
#[derive(Debug)]
pub struct FetchedImage {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl IntoResponse for FetchedImage {
    fn into_response(self) -> Response {
        (
            [
                (CONTENT_TYPE, self.content_type),
                (CACHE_CONTROL, CACHE_CONTROL_VALUE.to_string()),
                (X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Fetch `target` and check the upstream answer.
///
/// - transport failure or non-2xx status (a redirect included) -> 502
/// - content type other than a raster `image/*` -> 415
/// - declared or streamed length over `max_bytes` -> 413
pub async fn fetch_image(
    client: &reqwest::Client,
    target: Url,
    max_bytes: usize,
) -> AppResult<FetchedImage> {
    let host = target.host_str().unwrap_or_default().to_string();

    let mut upstream = client.get(target).send().await.map_err(|e| {
        tracing::warn!(%host, error = %e, "Image proxy fetch failed");
        AppError::BadGateway(sanitize_error_message(&format!("Failed to fetch image: {e}")))
    })?;

    let status = upstream.status();
    if !status.is_success() {
        tracing::debug!(%host, %status, "Image proxy upstream error");
        return Err(AppError::BadGateway(format!(
            "Upstream responded with {}",
            status.as_u16()
        )));
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();
    // Raster images only; SVG is refused.
    if !content_type.starts_with("image/") || content_type.starts_with("image/svg") {
        return Err(AppError::UnsupportedMediaType(
            "Upstream content is not a supported image".into(),
        ));
    }

    let too_large =
        || AppError::PayloadTooLarge(format!("Image exceeds the {max_bytes} byte limit"));
    if upstream
        .content_length()
        .is_some_and(|len| len > max_bytes as u64)
    {
        return Err(too_large());
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = upstream.chunk().await.map_err(|e| {
        tracing::warn!(%host, error = %e, "Image proxy read failed");
        AppError::BadGateway("Failed to read image".into())
    })? {
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    tracing::debug!(%host, bytes = body.len(), %content_type, "Image proxied");
    Ok(FetchedImage { content_type, body })
}

/// GET /api/image-proxy?url=<absolute url>
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> AppResult<FetchedImage> {
    let raw = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing url parameter".into()))?;

    let config = &state.config.image_proxy;
    let target = validate_target(&raw, &config.allowed_hosts)?;
    fetch_image(&state.http, target, config.max_bytes).await
}
