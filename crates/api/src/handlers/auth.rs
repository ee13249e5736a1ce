//! Handlers for admin setup, login, logout and session status.
//!
//! Each flow has a JSON variant under `/api` and an HTML form variant under
//! `/admin`; both share [`setup_first_admin`], [`authenticate`] and
//! [`start_session`].

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use ocwiki_core::error::CoreError;
use ocwiki_core::forms::{non_blank, null_as_empty, trimmed_string, validation_message};
use ocwiki_core::types::Timestamp;
use ocwiki_db::models::admin_session::CreateAdminSession;
use ocwiki_db::models::admin_user::{AdminUser, CreateAdminUser};
use ocwiki_db::models::site_settings::SiteSettings;
use ocwiki_db::repositories::{AdminSessionRepo, AdminUserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::auth::session::{
    clear_session_cookie, generate_session_token, hash_session_token, read_session_cookie,
    session_cookie,
};
use crate::crud::Payload;
use crate::error::{AppError, AppResult};
use crate::middleware::admin::{current_admin, LOGIN_PATH};
use crate::pages::{render, render_with_status, PageResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

/// Where a successful HTML login lands.
const DASHBOARD_PATH: &str = "/admin";

const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of login and setup requests, JSON or form.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default, deserialize_with = "trimmed_string")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub username: String,
    /// Not trimmed: whitespace is part of the password.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 1024, message = "must be at most 1024 characters")
    )]
    pub password: String,
}

/// Returned by a successful login or setup.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub username: String,
    pub expires_at: Timestamp,
}

/// Body of `GET /api/auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// A freshly started session: the `Set-Cookie` value and its expiry.
struct StartedSession {
    cookie: String,
    expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Shared flows
// ---------------------------------------------------------------------------

/// Create the first admin account.
///
/// The password strength check runs before any database access.
pub async fn setup_first_admin(state: &AppState, input: &Credentials) -> AppResult<AdminUser> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if AdminUserRepo::count(&state.pool).await? > 0 {
        return Err(setup_completed());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = AdminUserRepo::create_first(
        &state.pool,
        &CreateAdminUser {
            username: input.username.clone(),
            password_hash,
        },
    )
    .await?
    .ok_or_else(setup_completed)?;

    tracing::info!(admin_user_id = user.id, username = %user.username, "First admin created");
    Ok(user)
}

fn setup_completed() -> AppError {
    AppError::BadRequest("Setup already completed".into())
}

/// Check credentials, applying the failed-attempt lockout.
pub async fn authenticate(state: &AppState, input: &Credentials) -> AppResult<AdminUser> {
    let user = AdminUserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = AdminUserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            AdminUserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            let revoked = AdminSessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
            tracing::warn!(
                admin_user_id = user.id,
                failures,
                revoked_sessions = revoked,
                "Admin account locked"
            );
        }
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    AdminUserRepo::record_successful_login(&state.pool, user.id).await?;
    Ok(user)
}

/// Persist a new session row and build its cookie.
async fn start_session(
    state: &AppState,
    user: &AdminUser,
    headers: &HeaderMap,
) -> AppResult<StartedSession> {
    let (token, token_hash) = generate_session_token();
    let session_config = &state.config.session;
    let expires_at = Utc::now() + chrono::Duration::seconds(session_config.ttl_secs());

    AdminSessionRepo::create(
        &state.pool,
        &CreateAdminSession {
            admin_user_id: user.id,
            token_hash,
            expires_at,
            user_agent: header_string(headers, USER_AGENT.as_str()),
            ip_address: header_string(headers, "x-forwarded-for")
                .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string())),
        },
    )
    .await?;

    tracing::info!(admin_user_id = user.id, "Admin session started");
    Ok(StartedSession {
        cookie: session_cookie(&token, session_config.ttl_secs(), session_config.cookie_secure),
        expires_at,
    })
}

/// Revoke the session named by the request cookie, if any.
async fn end_session(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    if let Some(token) = read_session_cookie(headers) {
        if AdminSessionRepo::revoke(&state.pool, &hash_session_token(&token)).await? {
            tracing::info!("Admin session revoked");
        }
    }
    Ok(())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(500).collect())
}

fn session_response(status: StatusCode, user: AdminUser, session: StartedSession) -> Response {
    (
        status,
        [(SET_COOKIE, session.cookie)],
        Json(DataResponse {
            data: SessionInfo {
                username: user.username,
                expires_at: session.expires_at,
            },
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// JSON handlers
// ---------------------------------------------------------------------------

/// POST /api/admin/setup
pub async fn setup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Payload { data: input, .. }: Payload<Credentials>,
) -> AppResult<Response> {
    let user = setup_first_admin(&state, &input).await?;
    let session = start_session(&state, &user, &headers).await?;
    Ok(session_response(StatusCode::CREATED, user, session))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Payload { data: input, .. }: Payload<Credentials>,
) -> AppResult<Response> {
    let user = authenticate(&state, &input).await?;
    let session = start_session(&state, &user, &headers).await?;
    Ok(session_response(StatusCode::OK, user, session))
}

/// POST /api/auth/logout
///
/// Always clears the cookie; revokes the session when one is present.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    end_session(&state, &headers).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(state.config.session.cookie_secure))],
    )
        .into_response())
}

/// GET /api/auth/session
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<DataResponse<SessionStatus>>> {
    let admin = current_admin(&state, &headers).await?;
    Ok(Json(DataResponse {
        data: SessionStatus {
            authenticated: admin.is_some(),
            username: admin.map(|a| a.username),
        },
    }))
}

// ---------------------------------------------------------------------------
// HTML form handlers
// ---------------------------------------------------------------------------

fn auth_form_context(
    title: &str,
    error: Option<&str>,
    entered_username: &str,
) -> serde_json::Value {
    json!({
        "site": SiteSettings::default(),
        "title": title,
        "error": error,
        // Not `username`: the layout reads that as the signed-in admin.
        "entered_username": entered_username,
        "min_password_length": MIN_PASSWORD_LENGTH,
    })
}

/// Re-show a form with the error's status and client-safe message.
fn form_error(template: &str, title: &str, username: &str, err: AppError) -> Response {
    let (status, _, message) = err.classify();
    render_with_status(
        status,
        template,
        &auth_form_context(title, Some(&message), username),
    )
}

/// GET /admin/login
pub async fn login_page() -> PageResult<Response> {
    Ok(render("admin_login", &auth_form_context("Sign in", None, ""))?.into_response())
}

/// POST /admin/login
pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<Credentials>,
) -> Response {
    const TEMPLATE: &str = "admin_login";
    const TITLE: &str = "Sign in";

    if let Err(e) = input.validate() {
        let err = AppError::Core(CoreError::Validation(validation_message(&e)));
        return form_error(TEMPLATE, TITLE, &input.username, err);
    }

    let result = match authenticate(&state, &input).await {
        Ok(user) => start_session(&state, &user, &headers).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(session) => ([(SET_COOKIE, session.cookie)], Redirect::to(DASHBOARD_PATH)).into_response(),
        Err(e) => form_error(TEMPLATE, TITLE, &input.username, e),
    }
}

/// GET /admin/setup
pub async fn setup_page() -> PageResult<Response> {
    Ok(render(
        "admin_setup",
        &auth_form_context("Create the admin account", None, ""),
    )?
    .into_response())
}

/// POST /admin/setup
pub async fn setup_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<Credentials>,
) -> Response {
    const TEMPLATE: &str = "admin_setup";
    const TITLE: &str = "Create the admin account";

    if let Err(e) = input.validate() {
        let err = AppError::Core(CoreError::Validation(validation_message(&e)));
        return form_error(TEMPLATE, TITLE, &input.username, err);
    }

    let result = match setup_first_admin(&state, &input).await {
        Ok(user) => start_session(&state, &user, &headers).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(session) => ([(SET_COOKIE, session.cookie)], Redirect::to(DASHBOARD_PATH)).into_response(),
        Err(e) => form_error(TEMPLATE, TITLE, &input.username, e),
    }
}

/// POST /admin/logout
pub async fn logout_form(State(state): State<AppState>, headers: HeaderMap) -> PageResult<Response> {
    end_session(&state, &headers).await?;
    Ok((
        [(SET_COOKIE, clear_session_cookie(state.config.session.cookie_secure))],
        Redirect::to(LOGIN_PATH),
    )
        .into_response())
}
