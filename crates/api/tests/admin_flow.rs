//! End-to-end admin flows against a real database.
//!
//! `#[sqlx::test]` creates a scratch database per test from `DATABASE_URL`.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, body_text, build_test_app, get, get_with_cookie, location, post_empty, post_form,
    post_json, send_json, session_cookie,
};
use serde_json::json;
use sqlx::PgPool;

const USERNAME: &str = "keeper";
const PASSWORD: &str = "lantern-in-the-fog";

/// Create the first admin and return its session cookie.
async fn setup_admin(pool: &PgPool) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/admin/setup",
        json!({ "username": USERNAME, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn setup_runs_only_once(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/admin/setup",
        json!({ "username": USERNAME, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(session_cookie(&response).starts_with("ocwiki_admin_session="));
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], USERNAME);

    let response = post_json(
        build_test_app(pool),
        "/api/admin/setup",
        json!({ "username": "intruder", "password": "another-long-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Setup already completed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn session_cookie_authenticates_and_logout_revokes_it(pool: PgPool) {
    let cookie = setup_admin(&pool).await;

    let response = get_with_cookie(build_test_app(pool.clone()), "/api/auth/session", Some(&cookie)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["authenticated"], true);
    assert_eq!(json["data"]["username"], USERNAME);

    let response = post_empty(build_test_app(pool.clone()), "/api/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_with_cookie(build_test_app(pool), "/api/auth/session", Some(&cookie)).await;
    assert_eq!(body_json(response).await["data"]["authenticated"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn created_content_shows_up_on_public_pages(pool: PgPool) {
    let cookie = setup_admin(&pool).await;

    let response = send_json(
        build_test_app(pool.clone()),
        Method::POST,
        "/api/admin/worlds",
        json!({ "name": "Aeris", "summary": "Floating isles" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let world = body_json(response).await;
    assert_eq!(world["data"]["slug"], "aeris");
    let world_id = world["data"]["id"].as_i64().unwrap();

    let response = post_form(
        build_test_app(pool.clone()),
        "/api/admin/ocs",
        &format!("name=Mira+Vale&world_id={world_id}&tags=elf%2C+mage&is_public=true"),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/ocs");

    let response = get(build_test_app(pool.clone()), "/ocs/mira-vale").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Mira Vale"));
    assert!(html.contains("/worlds/aeris"));

    let response = get(build_test_app(pool.clone()), "/worlds/aeris").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Mira Vale"));

    let response = get(build_test_app(pool.clone()), "/random").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/ocs/mira-vale");

    let response = get_with_cookie(build_test_app(pool), "/admin/ocs", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Mira Vale"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn private_world_never_leaks_into_public_lists(pool: PgPool) {
    let cookie = setup_admin(&pool).await;

    let create = |uri: &'static str, body: serde_json::Value| {
        let app = build_test_app(pool.clone());
        let cookie = cookie.clone();
        async move { send_json(app, Method::POST, uri, body, Some(&cookie)).await }
    };

    let response = create(
        "/api/admin/worlds",
        json!({ "name": "Secretland", "is_public": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let world_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = create("/api/admin/ocs", json!({ "name": "Mira", "world_id": world_id })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = create(
        "/api/admin/timelines",
        json!({ "name": "Ages", "world_id": world_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for uri in ["/", "/ocs", "/timelines", "/ocs/mira"] {
        let response = get(build_test_app(pool.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let html = body_text(response).await;
        assert!(html.contains("Mira") || html.contains("Ages"), "GET {uri}");
        assert!(!html.contains("Secretland"), "GET {uri} shows the private world");
    }

    let response = get(build_test_app(pool.clone()), "/ocs?world=secretland").await;
    assert!(!body_text(response).await.contains("/ocs/mira"));

    let response = get(build_test_app(pool), "/worlds/secretland").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_slug_is_a_conflict(pool: PgPool) {
    let cookie = setup_admin(&pool).await;

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = send_json(
            build_test_app(pool.clone()),
            Method::POST,
            "/api/admin/worlds",
            json!({ "name": "Brume" }),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), expected);
        if expected == StatusCode::CONFLICT {
            assert_eq!(body_json(response).await["code"], "CONFLICT");
        }
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_bad_passwords_lock_the_account(pool: PgPool) {
    setup_admin(&pool).await;

    for _ in 0..5 {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/auth/login",
            json!({ "username": USERNAME, "password": "wrong-password" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = post_json(
        build_test_app(pool),
        "/api/auth/login",
        json!({ "username": USERNAME, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn random_endpoints_handle_empty_content(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/api/prompts/random").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let response = get(build_test_app(pool), "/random").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/ocs");
}
