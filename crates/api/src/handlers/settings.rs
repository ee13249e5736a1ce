//! Handlers for the single site-settings row.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use ocwiki_db::models::site_settings::{SiteSettings, UpdateSiteSettings};
use ocwiki_db::repositories::SiteSettingsRepo;

use crate::crud::{Payload, PayloadKind};
use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminSession;
use crate::pages::PageError;
use crate::response::DataResponse;
use crate::state::AppState;

/// Admin page the settings form returns to.
pub const SETTINGS_PAGE: &str = "/admin/settings";

/// GET /api/admin/settings
pub async fn get_settings(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SiteSettings>>> {
    let settings = SiteSettingsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/admin/settings (and POST from the settings form)
pub async fn update_settings(
    admin: AdminSession,
    State(state): State<AppState>,
    payload: Payload<UpdateSiteSettings>,
) -> Response {
    let result = SiteSettingsRepo::upsert(&state.pool, &payload.data).await;
    if result.is_ok() {
        tracing::info!(admin_user_id = admin.admin_user_id, "Site settings updated");
    }
    match (payload.kind, result) {
        (PayloadKind::Json, Ok(settings)) => Json(DataResponse { data: settings }).into_response(),
        (PayloadKind::Json, Err(e)) => AppError::from(e).into_response(),
        (PayloadKind::Form, Ok(_)) => Redirect::to(SETTINGS_PAGE).into_response(),
        (PayloadKind::Form, Err(e)) => PageError::from(e).into_response(),
    }
}
