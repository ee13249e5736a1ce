pub mod admin;
pub mod auth;
pub mod health;
pub mod pages;

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::image_proxy;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/logout                         logout (public, clears cookie)
/// /auth/session                        session status (public)
///
/// /admin/setup                         create the first admin (public, once)
/// /admin/settings                      get, update site settings
/// /admin/worlds                        list, create
/// /admin/worlds/{id}                   get, update, delete
/// /admin/ocs                           list, create
/// /admin/ocs/{id}                      get, update, delete
/// /admin/timelines                     list, create
/// /admin/timelines/{id}                get, update, delete
/// /admin/timeline-events               list, create
/// /admin/timeline-events/{id}          get, update, delete
/// /admin/writing-prompts               list, create
/// /admin/writing-prompts/{id}          get, update, delete
///
/// /prompts/random                      random active writing prompt
/// /image-proxy                         relay an external image
/// ```
///
/// Every `/admin` route except `setup` requires an admin session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .route("/prompts/random", get(public::random_prompt))
        .route("/image-proxy", get(image_proxy::proxy_image))
        .fallback(public::api_not_found)
}
