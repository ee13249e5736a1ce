//! Route definitions for `/api/admin`.

use axum::routing::{get, post};
use axum::Router;

use crate::crud::resources::{
    OcResource, TimelineEventResource, TimelineResource, WorldResource, WritingPromptResource,
};
use crate::crud::{self, AdminResource};
use crate::handlers::{auth, settings};
use crate::state::AppState;

/// Routes mounted at `/api/admin`.
///
/// ```text
/// POST     /setup            -> setup (public while no admin exists)
/// GET      /settings         -> get_settings
/// PUT/POST /settings         -> update_settings
/// *        /{segment}/...    -> generic CRUD per resource
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/setup", post(auth::setup))
        .route(
            "/settings",
            get(settings::get_settings)
                .put(settings::update_settings)
                .post(settings::update_settings),
        )
        .merge(resource::<WorldResource>())
        .merge(resource::<OcResource>())
        .merge(resource::<TimelineResource>())
        .merge(resource::<TimelineEventResource>())
        .merge(resource::<WritingPromptResource>())
}

fn resource<R: AdminResource>() -> Router<AppState> {
    Router::new().nest(&format!("/{}", R::SEGMENT), crud::router::<R>())
}
