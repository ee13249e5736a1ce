//! Admin HTML pages: dashboard, per-resource list/edit pages and the
//! settings form.
//!
//! List and edit forms are generated from [`AdminResource::FIELDS`]; every
//! form posts to the matching `/api/admin` route, which redirects back here.

use axum::extract::{Path, State};
use axum::response::Html;
use ocwiki_core::types::DbId;
use ocwiki_db::models::site_settings::SiteSettings;
use ocwiki_db::repositories::{
    OcRepo, SiteSettingsRepo, TimelineEventRepo, TimelineRepo, WorldRepo, WritingPromptRepo,
};
use serde::Serialize;
use serde_json::Value;

use crate::crud::resources::{
    OcResource, TimelineEventResource, TimelineResource, WorldResource, WritingPromptResource,
};
use crate::crud::{AdminResource, Field, FieldKind};
use crate::error::AppError;
use crate::middleware::admin::AdminPage;
use crate::pages::{render, PageResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// One `<option>` of a select.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A form control rendered by the `admin_field` partial.
#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub value: String,
    /// `type` attribute for plain inputs.
    pub input_type: &'static str,
    pub textarea: bool,
    pub select: bool,
    pub options: Vec<SelectOption>,
}

/// Row of an admin list table.
#[derive(Debug, Serialize)]
struct RowView {
    id: DbId,
    label: String,
    edit_path: String,
    public_path: Option<String>,
}

#[derive(Serialize)]
struct DashboardCard {
    title: &'static str,
    path: String,
    count: i64,
}

#[derive(Serialize)]
struct DashboardPage {
    site: SiteSettings,
    title: &'static str,
    username: String,
    cards: Vec<DashboardCard>,
}

#[derive(Serialize)]
struct ListPage {
    site: SiteSettings,
    title: &'static str,
    username: String,
    entity: &'static str,
    rows: Vec<RowView>,
    fields: Vec<FieldView>,
    action: String,
}

#[derive(Serialize)]
struct EditPage {
    site: SiteSettings,
    title: String,
    username: String,
    entity: &'static str,
    back_path: String,
    public_path: Option<String>,
    fields: Vec<FieldView>,
    action: String,
    delete_action: String,
}

#[derive(Serialize)]
struct SettingsPage {
    site: SiteSettings,
    title: &'static str,
    username: String,
    settings: SiteSettings,
    action: &'static str,
}

/// Choices for the world and timeline selects.
#[derive(Debug, Default)]
pub struct SelectSources {
    pub worlds: Vec<(DbId, String)>,
    pub timelines: Vec<(DbId, String)>,
}

impl SelectSources {
    /// Load only the lists that `fields` need.
    async fn load(state: &AppState, fields: &[Field]) -> PageResult<Self> {
        let needs = |kind: FieldKind| fields.iter().any(|f| f.kind == kind);
        let mut sources = Self::default();
        if needs(FieldKind::World) {
            sources.worlds = WorldRepo::list(&state.pool)
                .await?
                .into_iter()
                .map(|w| (w.id, w.name))
                .collect();
        }
        if needs(FieldKind::Timeline) {
            sources.timelines = TimelineRepo::list(&state.pool)
                .await?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect();
        }
        Ok(sources)
    }
}

/// Render a stored value into the text a form control carries.
///
/// Lists become comma-separated strings so they round-trip through the
/// form coercion helpers.
pub fn form_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| form_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Build the form controls for `fields`, pre-filled from `row` when editing.
///
/// Select controls start with a blank option; on update a blank value
/// leaves the column unchanged.
pub fn field_views(fields: &[Field], row: Option<&Value>, sources: &SelectSources) -> Vec<FieldView> {
    fields
        .iter()
        .map(|field| {
            let value = form_value(row.and_then(|r| r.get(field.name)));
            let (input_type, textarea, options) = match field.kind {
                FieldKind::Text | FieldKind::List => ("text", false, Vec::new()),
                FieldKind::Url => ("url", false, Vec::new()),
                FieldKind::Number => ("number", false, Vec::new()),
                FieldKind::Textarea => ("text", true, Vec::new()),
                FieldKind::Bool => (
                    "text",
                    false,
                    select_options(&[("true", "Yes"), ("false", "No")], &value),
                ),
                FieldKind::World => ("text", false, id_options(&sources.worlds, &value)),
                FieldKind::Timeline => ("text", false, id_options(&sources.timelines, &value)),
            };
            FieldView {
                name: field.name,
                label: field.label,
                required: field.required,
                select: matches!(
                    field.kind,
                    FieldKind::Bool | FieldKind::World | FieldKind::Timeline
                ),
                textarea,
                input_type,
                options,
                value,
            }
        })
        .collect()
}

fn select_options(choices: &[(&str, &str)], current: &str) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: *value == current,
        })
        .collect()
}

fn id_options(choices: &[(DbId, String)], current: &str) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|(id, label)| {
            let value = id.to_string();
            SelectOption {
                selected: value == current,
                label: label.clone(),
                value,
            }
        })
        .collect()
}

fn api_path<R: AdminResource>() -> String {
    format!("/api/admin/{}", R::SEGMENT)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin
pub async fn dashboard(
    AdminPage(admin): AdminPage,
    State(state): State<AppState>,
) -> PageResult<Html<String>> {
    let pool = &state.pool;
    let card = |title, path: String, count| DashboardCard { title, path, count };
    let cards = vec![
        card(OcResource::TITLE, OcResource::admin_path(), OcRepo::count(pool).await?),
        card(WorldResource::TITLE, WorldResource::admin_path(), WorldRepo::count(pool).await?),
        card(
            TimelineResource::TITLE,
            TimelineResource::admin_path(),
            TimelineRepo::count(pool).await?,
        ),
        card(
            TimelineEventResource::TITLE,
            TimelineEventResource::admin_path(),
            TimelineEventRepo::count(pool).await?,
        ),
        card(
            WritingPromptResource::TITLE,
            WritingPromptResource::admin_path(),
            WritingPromptRepo::count(pool).await?,
        ),
    ];

    render(
        "admin_dashboard",
        &DashboardPage {
            site: SiteSettingsRepo::get(pool).await?,
            title: "Dashboard",
            username: admin.username,
            cards,
        },
    )
}

/// GET /admin/{segment}
pub async fn list_page<R: AdminResource>(
    AdminPage(admin): AdminPage,
    State(state): State<AppState>,
) -> PageResult<Html<String>> {
    let rows: Vec<RowView> = R::list(&state.pool)
        .await?
        .iter()
        .map(|row| RowView {
            id: R::id(row),
            label: R::label(row),
            edit_path: format!("{}/{}", R::admin_path(), R::id(row)),
            public_path: R::public_path(row),
        })
        .collect();
    let sources = SelectSources::load(&state, R::FIELDS).await?;

    render(
        "admin_list",
        &ListPage {
            site: SiteSettingsRepo::get(&state.pool).await?,
            title: R::TITLE,
            username: admin.username,
            entity: R::ENTITY,
            rows,
            fields: field_views(R::FIELDS, None, &sources),
            action: api_path::<R>(),
        },
    )
}

/// GET /admin/{segment}/{id}
pub async fn edit_page<R: AdminResource>(
    AdminPage(admin): AdminPage,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> PageResult<Html<String>> {
    let row = R::find(&state.pool, id)
        .await?
        .ok_or_else(|| R::not_found(id))?;
    let values = serde_json::to_value(&row)
        .map_err(|e| AppError::InternalError(format!("serialize row: {e}")))?;
    let sources = SelectSources::load(&state, R::FIELDS).await?;

    render(
        "admin_edit",
        &EditPage {
            site: SiteSettingsRepo::get(&state.pool).await?,
            title: format!("Edit {}: {}", R::ENTITY, R::label(&row)),
            username: admin.username,
            entity: R::ENTITY,
            back_path: R::admin_path(),
            public_path: R::public_path(&row),
            fields: field_views(R::FIELDS, Some(&values), &sources),
            action: format!("{}/{id}", api_path::<R>()),
            delete_action: format!("{}/{id}/delete", api_path::<R>()),
        },
    )
}

/// GET /admin/settings
pub async fn settings_page(
    AdminPage(admin): AdminPage,
    State(state): State<AppState>,
) -> PageResult<Html<String>> {
    let settings = SiteSettingsRepo::get(&state.pool).await?;
    render(
        "admin_settings",
        &SettingsPage {
            site: settings.clone(),
            title: "Site settings",
            username: admin.username,
            settings,
            action: "/api/admin/settings",
        },
    )
}
