//! Public wiki pages and the public JSON endpoints.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use ocwiki_core::error::CoreError;
use ocwiki_core::random::pick_random;
use ocwiki_core::timeline::sort_events;
use ocwiki_core::types::DbId;
use ocwiki_db::models::oc::{Oc, OcCard};
use ocwiki_db::models::site_settings::SiteSettings;
use ocwiki_db::models::timeline::{Timeline, TimelineSummary};
use ocwiki_db::models::timeline_event::{OcAppearance, TimelineEvent};
use ocwiki_db::models::world::World;
use ocwiki_db::models::writing_prompt::WritingPrompt;
use ocwiki_db::repositories::{
    OcRepo, SiteSettingsRepo, TimelineEventRepo, TimelineRepo, WorldRepo, WritingPromptRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::pages::{error_page, render, PageResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of OCs shown under "recently added" on the home page.
const RECENT_OC_LIMIT: i64 = 6;

// ---------------------------------------------------------------------------
// Page contexts
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HomePage {
    site: SiteSettings,
    title: String,
    recent_ocs: Vec<OcCard>,
    worlds: Vec<World>,
    prompt: Option<WritingPrompt>,
}

#[derive(Serialize)]
struct OcListPage {
    site: SiteSettings,
    title: &'static str,
    ocs: Vec<OcCard>,
    worlds: Vec<WorldOption>,
    query: Option<String>,
    world: Option<String>,
    filtered: bool,
}

/// Entry in the world filter select.
#[derive(Serialize)]
struct WorldOption {
    slug: String,
    name: String,
    selected: bool,
}

#[derive(Serialize)]
struct OcDetailPage {
    site: SiteSettings,
    title: String,
    oc: Oc,
    world: Option<World>,
    appearances: Vec<OcAppearance>,
}

#[derive(Serialize)]
struct WorldListPage {
    site: SiteSettings,
    title: &'static str,
    worlds: Vec<World>,
}

#[derive(Serialize)]
struct WorldDetailPage {
    site: SiteSettings,
    title: String,
    world: World,
    ocs: Vec<OcCard>,
    timelines: Vec<TimelineSummary>,
}

#[derive(Serialize)]
struct TimelineListPage {
    site: SiteSettings,
    title: &'static str,
    timelines: Vec<TimelineSummary>,
}

#[derive(Serialize)]
struct TimelineDetailPage {
    site: SiteSettings,
    title: String,
    timeline: Timeline,
    world: Option<World>,
    events: Vec<EventView>,
}

/// A timeline event with the public OCs it features.
#[derive(Serialize)]
struct EventView {
    #[serde(flatten)]
    event: TimelineEvent,
    ocs: Vec<OcCard>,
}

#[derive(Serialize)]
struct PromptListPage {
    site: SiteSettings,
    title: &'static str,
    prompts: Vec<WritingPrompt>,
}

/// Query string of `GET /ocs`.
#[derive(Debug, Default, Deserialize)]
pub struct OcListParams {
    pub world: Option<String>,
    pub q: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A linked world is shown only while it is public.
async fn public_world(state: &AppState, world_id: Option<DbId>) -> AppResult<Option<World>> {
    let Some(id) = world_id else {
        return Ok(None);
    };
    Ok(WorldRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|w| w.is_public))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
pub async fn home(State(state): State<AppState>) -> PageResult<Html<String>> {
    let site = SiteSettingsRepo::get(&state.pool).await?;
    let recent_ocs = OcRepo::list_recent_public(&state.pool, RECENT_OC_LIMIT).await?;
    let worlds = WorldRepo::list_public(&state.pool).await?;
    let prompts = WritingPromptRepo::list_active(&state.pool).await?;
    let prompt = pick_random(&prompts, &mut rand::rng()).cloned();

    render(
        "home",
        &HomePage {
            title: site.site_name.clone(),
            site,
            recent_ocs,
            worlds,
            prompt,
        },
    )
}

/// GET /ocs?world=<slug>&q=<text>
pub async fn oc_list(
    State(state): State<AppState>,
    Query(params): Query<OcListParams>,
) -> PageResult<Html<String>> {
    let world = non_blank(params.world);
    let query = non_blank(params.q);

    let site = SiteSettingsRepo::get(&state.pool).await?;
    let ocs = OcRepo::list_public(&state.pool, world.as_deref(), query.as_deref()).await?;
    let worlds: Vec<WorldOption> = WorldRepo::list_public(&state.pool)
        .await?
        .into_iter()
        .map(|w| WorldOption {
            selected: world.as_deref() == Some(w.slug.as_str()),
            slug: w.slug,
            name: w.name,
        })
        .collect();

    render(
        "oc_list",
        &OcListPage {
            site,
            title: "Characters",
            ocs,
            worlds,
            filtered: world.is_some() || query.is_some(),
            query,
            world,
        },
    )
}

/// GET /ocs/{slug}
pub async fn oc_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> PageResult<Html<String>> {
    let oc = OcRepo::find_public_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::NotFoundBySlug {
            entity: "OC",
            slug: slug.clone(),
        })?;

    let site = SiteSettingsRepo::get(&state.pool).await?;
    let world = public_world(&state, oc.world_id).await?;
    let appearances = TimelineEventRepo::list_for_oc(&state.pool, oc.id).await?;

    render(
        "oc_detail",
        &OcDetailPage {
            site,
            title: oc.name.clone(),
            oc,
            world,
            appearances,
        },
    )
}

/// GET /random
///
/// Redirects to a uniformly chosen public OC, or to the list when there is
/// none.
pub async fn random_oc(State(state): State<AppState>) -> PageResult<Redirect> {
    let slugs = OcRepo::list_public_slugs(&state.pool).await?;
    let target = match pick_random(&slugs, &mut rand::rng()) {
        Some(slug) => format!("/ocs/{slug}"),
        None => "/ocs".to_string(),
    };
    Ok(Redirect::to(&target))
}

/// GET /worlds
pub async fn world_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let site = SiteSettingsRepo::get(&state.pool).await?;
    let worlds = WorldRepo::list_public(&state.pool).await?;
    render(
        "world_list",
        &WorldListPage {
            site,
            title: "Worlds",
            worlds,
        },
    )
}

/// GET /worlds/{slug}
pub async fn world_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> PageResult<Html<String>> {
    let world = WorldRepo::find_public_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::NotFoundBySlug {
            entity: "World",
            slug: slug.clone(),
        })?;

    let site = SiteSettingsRepo::get(&state.pool).await?;
    let ocs = OcRepo::list_by_world(&state.pool, world.id).await?;
    let timelines = TimelineRepo::list_by_world(&state.pool, world.id).await?;

    render(
        "world_detail",
        &WorldDetailPage {
            site,
            title: world.name.clone(),
            world,
            ocs,
            timelines,
        },
    )
}

/// GET /timelines
pub async fn timeline_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let site = SiteSettingsRepo::get(&state.pool).await?;
    let timelines = TimelineRepo::list_with_world(&state.pool).await?;
    render(
        "timeline_list",
        &TimelineListPage {
            site,
            title: "Timelines",
            timelines,
        },
    )
}

/// GET /timelines/{slug}
pub async fn timeline_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> PageResult<Html<String>> {
    let timeline = TimelineRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::NotFoundBySlug {
            entity: "Timeline",
            slug: slug.clone(),
        })?;

    let site = SiteSettingsRepo::get(&state.pool).await?;
    let world = public_world(&state, timeline.world_id).await?;

    let mut events = TimelineEventRepo::list_by_timeline(&state.pool, timeline.id).await?;
    sort_events(&mut events);

    let mut featured_ids: Vec<DbId> = events.iter().flat_map(|e| e.oc_ids.iter().copied()).collect();
    featured_ids.sort_unstable();
    featured_ids.dedup();
    let cards: HashMap<DbId, OcCard> = OcRepo::list_public_cards_by_ids(&state.pool, &featured_ids)
        .await?
        .into_iter()
        .map(|card| (card.id, card))
        .collect();

    let events: Vec<EventView> = events
        .into_iter()
        .map(|event| {
            let ocs: Vec<OcCard> = event
                .oc_ids
                .iter()
                .filter_map(|id| cards.get(id).cloned())
                .collect();
            EventView { event, ocs }
        })
        .collect();

    render(
        "timeline_detail",
        &TimelineDetailPage {
            site,
            title: timeline.name.clone(),
            timeline,
            world,
            events,
        },
    )
}

/// GET /prompts
pub async fn prompt_list(State(state): State<AppState>) -> PageResult<Html<String>> {
    let site = SiteSettingsRepo::get(&state.pool).await?;
    let prompts = WritingPromptRepo::list_active(&state.pool).await?;
    render(
        "prompt_list",
        &PromptListPage {
            site,
            title: "Writing prompts",
            prompts,
        },
    )
}

/// GET /api/prompts/random
///
/// `data` is `null` when no prompt is active.
pub async fn random_prompt(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<WritingPrompt>>>> {
    let prompts = WritingPromptRepo::list_active(&state.pool).await?;
    let prompt = pick_random(&prompts, &mut rand::rng()).cloned();
    Ok(Json(DataResponse { data: prompt }))
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// HTML 404 for unknown page routes.
pub async fn page_not_found() -> Response {
    error_page(StatusCode::NOT_FOUND, "Page not found")
}

/// JSON 404 for unknown `/api` routes.
pub async fn api_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found", "code": "NOT_FOUND" })),
    )
        .into_response()
}
