//! Session-cookie admin gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use ocwiki_core::error::CoreError;
use ocwiki_core::types::DbId;
use ocwiki_db::repositories::{AdminSessionRepo, AdminUserRepo};

use crate::auth::session::{hash_session_token, read_session_cookie};
use crate::error::{AppError, AppResult};
use crate::pages::PageError;
use crate::state::AppState;

/// Where [`AdminPage`] sends visitors without a session.
pub const LOGIN_PATH: &str = "/admin/login";

/// The signed-in admin, resolved from the session cookie.
///
/// ```ignore
/// async fn handler(admin: AdminSession) -> AppResult<Json<()>> {
///     tracing::info!(admin_user_id = admin.admin_user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: DbId,
    pub admin_user_id: DbId,
    pub username: String,
}

/// Resolve the admin for a request.
///
/// Returns `Ok(None)` when there is no cookie, the session is unknown,
/// revoked or expired, or its account no longer exists. The database is
/// not touched when the cookie is absent.
pub async fn current_admin(state: &AppState, headers: &HeaderMap) -> AppResult<Option<AdminSession>> {
    let Some(token) = read_session_cookie(headers) else {
        return Ok(None);
    };

    let token_hash = hash_session_token(&token);
    let Some(session) = AdminSessionRepo::find_active_by_token_hash(&state.pool, &token_hash).await?
    else {
        return Ok(None);
    };

    let Some(user) = AdminUserRepo::find_by_id(&state.pool, session.admin_user_id).await? else {
        return Ok(None);
    };

    Ok(Some(AdminSession {
        session_id: session.id,
        admin_user_id: user.id,
        username: user.username,
    }))
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_admin(state, &parts.headers).await?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        })
    }
}

/// Page-route variant of [`AdminSession`]: redirects to the login page
/// (303) instead of answering 401.
#[derive(Debug, Clone)]
pub struct AdminPage(pub AdminSession);

impl FromRequestParts<AppState> for AdminPage {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match current_admin(state, &parts.headers).await {
            Ok(Some(admin)) => Ok(AdminPage(admin)),
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(PageError::from(e).into_response()),
        }
    }
}
