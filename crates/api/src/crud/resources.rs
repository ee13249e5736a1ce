//! [`AdminResource`] implementations for every admin-editable entity.

use ocwiki_core::error::CoreError;
use ocwiki_core::forms::MISSING_REQUIRED_FIELDS;
use ocwiki_core::slug::{resolve_slug, validate_slug};
use ocwiki_core::types::DbId;
use ocwiki_db::models::oc::{CreateOc, Oc, UpdateOc};
use ocwiki_db::models::timeline::{CreateTimeline, Timeline, UpdateTimeline};
use ocwiki_db::models::timeline_event::{CreateTimelineEvent, TimelineEvent, UpdateTimelineEvent};
use ocwiki_db::models::world::{CreateWorld, UpdateWorld, World};
use ocwiki_db::models::writing_prompt::{CreateWritingPrompt, UpdateWritingPrompt, WritingPrompt};
use ocwiki_db::repositories::{
    OcRepo, TimelineEventRepo, TimelineRepo, WorldRepo, WritingPromptRepo,
};
use sqlx::PgPool;

use super::{AdminResource, Field, FieldKind};
use crate::error::AppResult;

/// Validate an explicit slug on update; `None` leaves the slug unchanged.
fn check_slug(slug: Option<&str>) -> AppResult<()> {
    if let Some(slug) = slug {
        validate_slug(slug)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Worlds
// ---------------------------------------------------------------------------

pub struct WorldResource;

impl AdminResource for WorldResource {
    const ENTITY: &'static str = "World";
    const SEGMENT: &'static str = "worlds";
    const TITLE: &'static str = "Worlds";
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Name", FieldKind::Text).required(),
        Field::new("slug", "Slug", FieldKind::Text),
        Field::new("summary", "Summary", FieldKind::Text),
        Field::new("genre", "Genre", FieldKind::Text),
        Field::new("header_image_url", "Header image URL", FieldKind::Url),
        Field::new("description_md", "Description (Markdown)", FieldKind::Textarea),
        Field::new("is_public", "Public", FieldKind::Bool),
    ];

    type Row = World;
    type Create = CreateWorld;
    type Update = UpdateWorld;

    fn id(row: &World) -> DbId {
        row.id
    }

    fn label(row: &World) -> String {
        row.name.clone()
    }

    fn public_path(row: &World) -> Option<String> {
        row.is_public.then(|| format!("/worlds/{}", row.slug))
    }

    async fn list(pool: &PgPool) -> AppResult<Vec<World>> {
        Ok(WorldRepo::list(pool).await?)
    }

    async fn find(pool: &PgPool, id: DbId) -> AppResult<Option<World>> {
        Ok(WorldRepo::find_by_id(pool, id).await?)
    }

    async fn create(pool: &PgPool, input: CreateWorld) -> AppResult<World> {
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        Ok(WorldRepo::create(pool, &input, &slug).await?)
    }

    async fn update(pool: &PgPool, id: DbId, input: UpdateWorld) -> AppResult<Option<World>> {
        check_slug(input.slug.as_deref())?;
        Ok(WorldRepo::update(pool, id, &input).await?)
    }

    async fn delete(pool: &PgPool, id: DbId) -> AppResult<bool> {
        Ok(WorldRepo::delete(pool, id).await?)
    }
}

// ---------------------------------------------------------------------------
// OCs
// ---------------------------------------------------------------------------

pub struct OcResource;

impl AdminResource for OcResource {
    const ENTITY: &'static str = "OC";
    const SEGMENT: &'static str = "ocs";
    const TITLE: &'static str = "Characters";
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Name", FieldKind::Text).required(),
        Field::new("slug", "Slug", FieldKind::Text),
        Field::new("world_id", "World", FieldKind::World),
        Field::new("tagline", "Tagline", FieldKind::Text),
        Field::new("age", "Age", FieldKind::Text),
        Field::new("gender", "Gender", FieldKind::Text),
        Field::new("pronouns", "Pronouns", FieldKind::Text),
        Field::new("species", "Species", FieldKind::Text),
        Field::new("occupation", "Occupation", FieldKind::Text),
        Field::new("status", "Status", FieldKind::Text),
        Field::new("image_url", "Image URL", FieldKind::Url),
        Field::new("tags", "Tags (comma-separated)", FieldKind::List),
        Field::new("bio_md", "Biography (Markdown)", FieldKind::Textarea),
        Field::new("is_public", "Public", FieldKind::Bool),
    ];

    type Row = Oc;
    type Create = CreateOc;
    type Update = UpdateOc;

    fn id(row: &Oc) -> DbId {
        row.id
    }

    fn label(row: &Oc) -> String {
        row.name.clone()
    }

    fn public_path(row: &Oc) -> Option<String> {
        row.is_public.then(|| format!("/ocs/{}", row.slug))
    }

    async fn list(pool: &PgPool) -> AppResult<Vec<Oc>> {
        Ok(OcRepo::list(pool).await?)
    }

    async fn find(pool: &PgPool, id: DbId) -> AppResult<Option<Oc>> {
        Ok(OcRepo::find_by_id(pool, id).await?)
    }

    async fn create(pool: &PgPool, input: CreateOc) -> AppResult<Oc> {
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        Ok(OcRepo::create(pool, &input, &slug).await?)
    }

    async fn update(pool: &PgPool, id: DbId, input: UpdateOc) -> AppResult<Option<Oc>> {
        check_slug(input.slug.as_deref())?;
        Ok(OcRepo::update(pool, id, &input).await?)
    }

    async fn delete(pool: &PgPool, id: DbId) -> AppResult<bool> {
        Ok(OcRepo::delete(pool, id).await?)
    }
}

// ---------------------------------------------------------------------------
// Timelines
// ---------------------------------------------------------------------------

pub struct TimelineResource;

impl AdminResource for TimelineResource {
    const ENTITY: &'static str = "Timeline";
    const SEGMENT: &'static str = "timelines";
    const TITLE: &'static str = "Timelines";
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Name", FieldKind::Text).required(),
        Field::new("slug", "Slug", FieldKind::Text),
        Field::new("world_id", "World", FieldKind::World),
        Field::new("description_md", "Description (Markdown)", FieldKind::Textarea),
    ];

    type Row = Timeline;
    type Create = CreateTimeline;
    type Update = UpdateTimeline;

    fn id(row: &Timeline) -> DbId {
        row.id
    }

    fn label(row: &Timeline) -> String {
        row.name.clone()
    }

    fn public_path(row: &Timeline) -> Option<String> {
        Some(format!("/timelines/{}", row.slug))
    }

    async fn list(pool: &PgPool) -> AppResult<Vec<Timeline>> {
        Ok(TimelineRepo::list(pool).await?)
    }

    async fn find(pool: &PgPool, id: DbId) -> AppResult<Option<Timeline>> {
        Ok(TimelineRepo::find_by_id(pool, id).await?)
    }

    async fn create(pool: &PgPool, input: CreateTimeline) -> AppResult<Timeline> {
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        Ok(TimelineRepo::create(pool, &input, &slug).await?)
    }

    async fn update(
        pool: &PgPool,
        id: DbId,
        input: UpdateTimeline,
    ) -> AppResult<Option<Timeline>> {
        check_slug(input.slug.as_deref())?;
        Ok(TimelineRepo::update(pool, id, &input).await?)
    }

    async fn delete(pool: &PgPool, id: DbId) -> AppResult<bool> {
        Ok(TimelineRepo::delete(pool, id).await?)
    }
}

// ---------------------------------------------------------------------------
// Timeline events
// ---------------------------------------------------------------------------

pub struct TimelineEventResource;

impl AdminResource for TimelineEventResource {
    const ENTITY: &'static str = "Timeline event";
    const SEGMENT: &'static str = "timeline-events";
    const TITLE: &'static str = "Timeline events";
    const FIELDS: &'static [Field] = &[
        Field::new("timeline_id", "Timeline", FieldKind::Timeline).required(),
        Field::new("title", "Title", FieldKind::Text).required(),
        Field::new("date_label", "Date label", FieldKind::Text),
        Field::new("sort_key", "Sort key", FieldKind::Number),
        Field::new("oc_ids", "Featured OC ids (comma-separated)", FieldKind::List),
        Field::new("description_md", "Description (Markdown)", FieldKind::Textarea),
    ];

    type Row = TimelineEvent;
    type Create = CreateTimelineEvent;
    type Update = UpdateTimelineEvent;

    fn id(row: &TimelineEvent) -> DbId {
        row.id
    }

    fn label(row: &TimelineEvent) -> String {
        match &row.date_label {
            Some(date) => format!("{} ({date})", row.title),
            None => row.title.clone(),
        }
    }

    async fn list(pool: &PgPool) -> AppResult<Vec<TimelineEvent>> {
        Ok(TimelineEventRepo::list(pool).await?)
    }

    async fn find(pool: &PgPool, id: DbId) -> AppResult<Option<TimelineEvent>> {
        Ok(TimelineEventRepo::find_by_id(pool, id).await?)
    }

    async fn create(pool: &PgPool, input: CreateTimelineEvent) -> AppResult<TimelineEvent> {
        let timeline_id = input
            .timeline_id
            .ok_or_else(|| CoreError::Validation(MISSING_REQUIRED_FIELDS.into()))?;
        Ok(TimelineEventRepo::create(pool, timeline_id, &input).await?)
    }

    async fn update(
        pool: &PgPool,
        id: DbId,
        input: UpdateTimelineEvent,
    ) -> AppResult<Option<TimelineEvent>> {
        Ok(TimelineEventRepo::update(pool, id, &input).await?)
    }

    async fn delete(pool: &PgPool, id: DbId) -> AppResult<bool> {
        Ok(TimelineEventRepo::delete(pool, id).await?)
    }
}

// ---------------------------------------------------------------------------
// Writing prompts
// ---------------------------------------------------------------------------

pub struct WritingPromptResource;

/// Characters of a prompt shown in admin lists.
const PROMPT_LABEL_CHARS: usize = 80;

impl AdminResource for WritingPromptResource {
    const ENTITY: &'static str = "Writing prompt";
    const SEGMENT: &'static str = "writing-prompts";
    const TITLE: &'static str = "Writing prompts";
    const FIELDS: &'static [Field] = &[
        Field::new("prompt", "Prompt", FieldKind::Textarea).required(),
        Field::new("category", "Category", FieldKind::Text),
        Field::new("world_id", "World", FieldKind::World),
        Field::new("is_active", "Active", FieldKind::Bool),
    ];

    type Row = WritingPrompt;
    type Create = CreateWritingPrompt;
    type Update = UpdateWritingPrompt;

    fn id(row: &WritingPrompt) -> DbId {
        row.id
    }

    fn label(row: &WritingPrompt) -> String {
        if row.prompt.chars().count() <= PROMPT_LABEL_CHARS {
            return row.prompt.clone();
        }
        let mut label: String = row.prompt.chars().take(PROMPT_LABEL_CHARS - 1).collect();
        label.push('…');
        label
    }

    async fn list(pool: &PgPool) -> AppResult<Vec<WritingPrompt>> {
        Ok(WritingPromptRepo::list(pool).await?)
    }

    async fn find(pool: &PgPool, id: DbId) -> AppResult<Option<WritingPrompt>> {
        Ok(WritingPromptRepo::find_by_id(pool, id).await?)
    }

    async fn create(pool: &PgPool, input: CreateWritingPrompt) -> AppResult<WritingPrompt> {
        Ok(WritingPromptRepo::create(pool, &input).await?)
    }

    async fn update(
        pool: &PgPool,
        id: DbId,
        input: UpdateWritingPrompt,
    ) -> AppResult<Option<WritingPrompt>> {
        Ok(WritingPromptRepo::update(pool, id, &input).await?)
    }

    async fn delete(pool: &PgPool, id: DbId) -> AppResult<bool> {
        Ok(WritingPromptRepo::delete(pool, id).await?)
    }
}
