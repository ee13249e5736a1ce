//! Route definitions for HTML pages.

use axum::routing::{get, post};
use axum::Router;

use crate::crud::resources::{
    OcResource, TimelineEventResource, TimelineResource, WorldResource, WritingPromptResource,
};
use crate::crud::AdminResource;
use crate::handlers::{admin_pages, auth, public};
use crate::state::AppState;

/// Page routes, mounted at the root.
///
/// ```text
/// GET       /                     -> home
/// GET       /ocs                  -> oc_list (?world=, ?q=)
/// GET       /ocs/{slug}           -> oc_detail
/// GET       /random               -> random_oc (303)
/// GET       /worlds               -> world_list
/// GET       /worlds/{slug}        -> world_detail
/// GET       /timelines            -> timeline_list
/// GET       /timelines/{slug}     -> timeline_detail
/// GET       /prompts              -> prompt_list
///
/// GET       /admin                -> dashboard
/// GET, POST /admin/login          -> login_page, login_form
/// GET, POST /admin/setup          -> setup_page, setup_form
/// POST      /admin/logout         -> logout_form
/// GET       /admin/settings       -> settings_page
/// GET       /admin/{segment}      -> list_page
/// GET       /admin/{segment}/{id} -> edit_page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home))
        .route("/ocs", get(public::oc_list))
        .route("/ocs/{slug}", get(public::oc_detail))
        .route("/random", get(public::random_oc))
        .route("/worlds", get(public::world_list))
        .route("/worlds/{slug}", get(public::world_detail))
        .route("/timelines", get(public::timeline_list))
        .route("/timelines/{slug}", get(public::timeline_detail))
        .route("/prompts", get(public::prompt_list))
        .route("/admin", get(admin_pages::dashboard))
        .route("/admin/login", get(auth::login_page).post(auth::login_form))
        .route("/admin/setup", get(auth::setup_page).post(auth::setup_form))
        .route("/admin/logout", post(auth::logout_form))
        .route("/admin/settings", get(admin_pages::settings_page))
        .merge(resource_pages::<WorldResource>())
        .merge(resource_pages::<OcResource>())
        .merge(resource_pages::<TimelineResource>())
        .merge(resource_pages::<TimelineEventResource>())
        .merge(resource_pages::<WritingPromptResource>())
}

fn resource_pages<R: AdminResource>() -> Router<AppState> {
    Router::new()
        .route(&R::admin_path(), get(admin_pages::list_page::<R>))
        .route(
            &format!("{}/{{id}}", R::admin_path()),
            get(admin_pages::edit_page::<R>),
        )
}
