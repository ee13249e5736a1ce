//! Image proxy: target checks through the router, then the upstream fetch
//! against a local server.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, build_test_app_with, get, offline_app, test_config, unreachable_pool};
use ocwiki_api::error::AppError;
use ocwiki_api::image_proxy::{
    build_http_client, fetch_image, ImageProxyConfig, CACHE_CONTROL_VALUE,
};
use reqwest::Url;
use upstream::{response, serve};

#[tokio::test]
async fn missing_url_is_400() {
    let response = get(offline_app(), "/api/image-proxy").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing url parameter");
}

#[tokio::test]
async fn non_http_scheme_is_400() {
    let response = get(offline_app(), "/api/image-proxy?url=ftp%3A%2F%2Fexample.com%2Fa.png").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn loopback_targets_are_forbidden() {
    for target in [
        "http%3A%2F%2F127.0.0.1%2Fa.png",
        "http%3A%2F%2Flocalhost%3A8080%2Fa.png",
        "http%3A%2F%2F10.0.0.7%2Fa.png",
    ] {
        let response = get(offline_app(), &format!("/api/image-proxy?url={target}")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{target}");
        assert_eq!(body_json(response).await["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn host_outside_allow_list_is_forbidden() {
    let mut config = test_config();
    config.image_proxy.allowed_hosts = vec!["images.example.com".to_string()];
    let app = build_test_app_with(unreachable_pool(), config);

    let response = get(app, "/api/image-proxy?url=https%3A%2F%2Fevil.example.net%2Fa.png").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("allow-list"));
}

// ---------------------------------------------------------------------------
// Upstream fetch, against a local canned HTTP server
// ---------------------------------------------------------------------------

mod upstream {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A server that answers every connection with the same raw response.
    pub struct CannedServer {
        pub base: String,
        pub hits: Arc<AtomicUsize>,
    }

    impl CannedServer {
        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    pub async fn serve(response: Vec<u8>) -> CannedServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let response = response.clone();
                tokio::spawn(async move {
                    let mut request = vec![0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    let _ = socket.write_all(&response).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        CannedServer { base, hits }
    }

    pub fn response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
        let mut out = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        let mut out = out.into_bytes();
        out.extend_from_slice(body);
        out
    }
}

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

fn client() -> reqwest::Client {
    build_http_client(&ImageProxyConfig::default()).unwrap()
}

fn url(base: &str, path: &str) -> Url {
    Url::parse(&format!("{base}{path}")).unwrap()
}

#[tokio::test]
async fn image_is_relayed_with_type_and_cache_headers() {
    let length = PNG_BYTES.len().to_string();
    let server = serve(response(
        "200 OK",
        &[("Content-Type", "image/png"), ("Content-Length", &length)],
        PNG_BYTES,
    ))
    .await;

    let image = fetch_image(&client(), url(&server.base, "/a.png"), 1024)
        .await
        .unwrap();
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.body, PNG_BYTES);

    let response = image.into_response();
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.headers()["cache-control"], CACHE_CONTROL_VALUE);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn upstream_error_status_is_bad_gateway() {
    let server = serve(response(
        "500 Internal Server Error",
        &[("Content-Type", "image/png"), ("Content-Length", "0")],
        b"",
    ))
    .await;

    let result = fetch_image(&client(), url(&server.base, "/a.png"), 1024).await;
    assert_matches!(result, Err(AppError::BadGateway(_)));
}

#[tokio::test]
async fn non_image_content_is_unsupported() {
    for content_type in ["text/html", "image/svg+xml"] {
        let body = b"<svg onload=alert(1)></svg>";
        let length = body.len().to_string();
        let server = serve(response(
            "200 OK",
            &[("Content-Type", content_type), ("Content-Length", &length)],
            body,
        ))
        .await;

        let result = fetch_image(&client(), url(&server.base, "/a"), 1024).await;
        assert_matches!(
            result,
            Err(AppError::UnsupportedMediaType(_)),
            "{content_type} should be refused"
        );
    }
}

#[tokio::test]
async fn declared_length_over_limit_is_too_large() {
    let server = serve(response(
        "200 OK",
        &[("Content-Type", "image/png"), ("Content-Length", "100")],
        &[0u8; 100],
    ))
    .await;

    let result = fetch_image(&client(), url(&server.base, "/big.png"), 10).await;
    assert_matches!(result, Err(AppError::PayloadTooLarge(_)));
}

#[tokio::test]
async fn streamed_body_over_limit_is_too_large() {
    // Chunked, so the size is only known while reading.
    let server = serve(response(
        "200 OK",
        &[("Content-Type", "image/png"), ("Transfer-Encoding", "chunked")],
        b"14\r\n01234567890123456789\r\n0\r\n\r\n",
    ))
    .await;

    let result = fetch_image(&client(), url(&server.base, "/big.png"), 10).await;
    assert_matches!(result, Err(AppError::PayloadTooLarge(_)));
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let target = serve(response(
        "200 OK",
        &[("Content-Type", "image/png"), ("Content-Length", "4")],
        b"fake",
    ))
    .await;
    let location = format!("{}/moved.png", target.base);
    let server = serve(response(
        "302 Found",
        &[("Location", &location), ("Content-Length", "0")],
        b"",
    ))
    .await;

    let result = fetch_image(&client(), url(&server.base, "/a.png"), 1024).await;
    assert_matches!(result, Err(AppError::BadGateway(_)));
    assert_eq!(server.hits(), 1);
    assert_eq!(target.hits(), 0);
}
