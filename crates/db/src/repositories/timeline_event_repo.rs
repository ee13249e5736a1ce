//! Repository for the `timeline_events` table.

use sqlx::PgPool;
use ocwiki_core::types::DbId;

use crate::models::timeline_event::{
    CreateTimelineEvent, OcAppearance, TimelineEvent, UpdateTimelineEvent,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, timeline_id, title, date_label, sort_key, description_md, oc_ids, \
                       created_at, updated_at";

/// Event ordering: keyed events first by key, then unkeyed, ties by id.
const ORDER: &str = "ORDER BY sort_key ASC NULLS LAST, id ASC";

/// Provides CRUD operations for timeline events.
pub struct TimelineEventRepo;

impl TimelineEventRepo {
    /// Insert a new event. `timeline_id` is taken separately since the DTO
    /// carries it as optional for validation.
    pub async fn create(
        pool: &PgPool,
        timeline_id: DbId,
        input: &CreateTimelineEvent,
    ) -> Result<TimelineEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_events
                (timeline_id, title, date_label, sort_key, description_md, oc_ids)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(timeline_id)
            .bind(&input.title)
            .bind(&input.date_label)
            .bind(input.sort_key)
            .bind(&input.description_md)
            .bind(&input.oc_ids)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_events WHERE id = $1");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every event across all timelines, grouped by timeline.
    pub async fn list(pool: &PgPool) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events
             ORDER BY timeline_id ASC, sort_key ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .fetch_all(pool)
            .await
    }

    /// Events of one timeline in display order.
    pub async fn list_by_timeline(
        pool: &PgPool,
        timeline_id: DbId,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_events WHERE timeline_id = $1 {ORDER}");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(timeline_id)
            .fetch_all(pool)
            .await
    }

    /// Events featuring an OC, with the timeline each belongs to.
    pub async fn list_for_oc(
        pool: &PgPool,
        oc_id: DbId,
    ) -> Result<Vec<OcAppearance>, sqlx::Error> {
        sqlx::query_as::<_, OcAppearance>(
            "SELECT e.id AS event_id, e.title, e.date_label, e.sort_key,
                    t.name AS timeline_name, t.slug AS timeline_slug
             FROM timeline_events e
             JOIN timelines t ON t.id = e.timeline_id
             WHERE $1 = ANY(e.oc_ids)
             ORDER BY t.name ASC, e.sort_key ASC NULLS LAST, e.id ASC",
        )
        .bind(oc_id)
        .fetch_all(pool)
        .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimelineEvent,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_events SET
                timeline_id = COALESCE($2, timeline_id),
                title = COALESCE($3, title),
                date_label = COALESCE($4, date_label),
                sort_key = COALESCE($5, sort_key),
                description_md = COALESCE($6, description_md),
                oc_ids = COALESCE($7, oc_ids)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .bind(input.timeline_id)
            .bind(&input.title)
            .bind(&input.date_label)
            .bind(input.sort_key)
            .bind(&input.description_md)
            .bind(&input.oc_ids)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timeline_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM timeline_events")
            .fetch_one(pool)
            .await
    }
}
