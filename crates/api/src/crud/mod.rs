//! Generic admin CRUD.
//!
//! Every admin-editable entity implements [`AdminResource`]; [`router`]
//! turns an implementation into the full set of JSON and HTML-form routes,
//! all gated by [`AdminSession`].

mod payload;
pub mod resources;

use std::future::Future;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ocwiki_core::error::CoreError;
use ocwiki_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

pub use payload::{Payload, PayloadKind, PayloadRejection};

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminSession;
use crate::pages::PageError;
use crate::response::DataResponse;
use crate::state::AppState;

/// How a field is edited in the generated admin forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Url,
    Textarea,
    Number,
    /// Rendered as a yes/no select.
    Bool,
    /// Comma-separated list.
    List,
    /// Select of worlds, by id.
    World,
    /// Select of timelines, by id.
    Timeline,
}

/// Form descriptor for one column of a resource.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// An entity exposed through the generic admin CRUD routes and pages.
pub trait AdminResource: Send + Sync + 'static {
    /// Singular display name used in error messages.
    const ENTITY: &'static str;
    /// URL segment under `/api/admin` and `/admin`.
    const SEGMENT: &'static str;
    /// Plural heading for admin pages.
    const TITLE: &'static str;
    /// Editable fields, in form order.
    const FIELDS: &'static [Field];

    type Row: Serialize + Send + Sync + 'static;
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn id(row: &Self::Row) -> DbId;

    /// Short text identifying a row in admin lists.
    fn label(row: &Self::Row) -> String;

    /// Public page for a row, if it has one.
    fn public_path(_row: &Self::Row) -> Option<String> {
        None
    }

    fn list(pool: &PgPool) -> impl Future<Output = AppResult<Vec<Self::Row>>> + Send;

    fn find(pool: &PgPool, id: DbId) -> impl Future<Output = AppResult<Option<Self::Row>>> + Send;

    fn create(
        pool: &PgPool,
        input: Self::Create,
    ) -> impl Future<Output = AppResult<Self::Row>> + Send;

    fn update(
        pool: &PgPool,
        id: DbId,
        input: Self::Update,
    ) -> impl Future<Output = AppResult<Option<Self::Row>>> + Send;

    fn delete(pool: &PgPool, id: DbId) -> impl Future<Output = AppResult<bool>> + Send;

    fn not_found(id: DbId) -> AppError {
        AppError::Core(CoreError::NotFound {
            entity: Self::ENTITY,
            id,
        })
    }

    /// Admin page listing this resource.
    fn admin_path() -> String {
        format!("/admin/{}", Self::SEGMENT)
    }
}

/// Routes mounted at `/api/admin/{segment}`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create          (JSON 201, form 303)
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// POST   /{id}           -> update          (HTML form fallback)
/// DELETE /{id}           -> delete          (204)
/// POST   /{id}/delete    -> delete_form     (303)
/// ```
pub fn router<R: AdminResource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route(
            "/{id}",
            get(get_by_id::<R>)
                .put(update::<R>)
                .post(update::<R>)
                .delete(delete::<R>),
        )
        .route("/{id}/delete", post(delete_form::<R>))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list<R: AdminResource>(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<R::Row>>>> {
    let rows = R::list(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

async fn get_by_id<R: AdminResource>(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<R::Row>>> {
    let row = R::find(&state.pool, id).await?.ok_or_else(|| R::not_found(id))?;
    Ok(Json(DataResponse { data: row }))
}

async fn create<R: AdminResource>(
    admin: AdminSession,
    State(state): State<AppState>,
    payload: Payload<R::Create>,
) -> Response {
    let kind = payload.kind;
    let result = R::create(&state.pool, payload.data).await;
    if let Ok(row) = &result {
        tracing::info!(
            entity = R::ENTITY,
            id = R::id(row),
            admin_user_id = admin.admin_user_id,
            "Created"
        );
    }
    respond::<R>(kind, StatusCode::CREATED, result)
}

async fn update<R: AdminResource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Payload<R::Update>,
) -> Response {
    let kind = payload.kind;
    let result = R::update(&state.pool, id, payload.data)
        .await
        .and_then(|row| row.ok_or_else(|| R::not_found(id)));
    if result.is_ok() {
        tracing::info!(entity = R::ENTITY, id, admin_user_id = admin.admin_user_id, "Updated");
    }
    respond::<R>(kind, StatusCode::OK, result)
}

async fn delete<R: AdminResource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !R::delete(&state.pool, id).await? {
        return Err(R::not_found(id));
    }
    tracing::info!(entity = R::ENTITY, id, admin_user_id = admin.admin_user_id, "Deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_form<R: AdminResource>(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> Response {
    match R::delete(&state.pool, id).await {
        Ok(true) => {
            tracing::info!(entity = R::ENTITY, id, admin_user_id = admin.admin_user_id, "Deleted");
            Redirect::to(&R::admin_path()).into_response()
        }
        Ok(false) => PageError(R::not_found(id)).into_response(),
        Err(e) => PageError(e).into_response(),
    }
}

/// JSON callers get the row (or a JSON error); form callers are redirected
/// back to the admin list (or shown an HTML error page).
fn respond<R: AdminResource>(
    kind: PayloadKind,
    success: StatusCode,
    result: AppResult<R::Row>,
) -> Response {
    match (kind, result) {
        (PayloadKind::Json, Ok(row)) => (success, Json(DataResponse { data: row })).into_response(),
        (PayloadKind::Json, Err(e)) => e.into_response(),
        (PayloadKind::Form, Ok(_)) => Redirect::to(&R::admin_path()).into_response(),
        (PayloadKind::Form, Err(e)) => PageError(e).into_response(),
    }
}
