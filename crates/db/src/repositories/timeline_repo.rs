//! Repository for the `timelines` table.

use sqlx::PgPool;
use ocwiki_core::types::DbId;

use crate::models::timeline::{CreateTimeline, Timeline, TimelineSummary, UpdateTimeline};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, name, slug, description_md, created_at, updated_at";

/// Summary select. The world is joined only while it is public.
const SUMMARY_SELECT: &str = "SELECT t.id, t.name, t.slug, w.name AS world_name, w.slug AS world_slug,
            (SELECT COUNT(*) FROM timeline_events e WHERE e.timeline_id = t.id) AS event_count
     FROM timelines t LEFT JOIN worlds w ON w.id = t.world_id AND w.is_public";

/// Provides CRUD operations for timelines.
pub struct TimelineRepo;

impl TimelineRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimeline,
        slug: &str,
    ) -> Result<Timeline, sqlx::Error> {
        let query = format!(
            "INSERT INTO timelines (world_id, name, slug, description_md)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Timeline>(&query)
            .bind(input.world_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description_md)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines WHERE id = $1");
        sqlx::query_as::<_, Timeline>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines WHERE slug = $1");
        sqlx::query_as::<_, Timeline>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines ORDER BY name ASC");
        sqlx::query_as::<_, Timeline>(&query).fetch_all(pool).await
    }

    /// All timelines with their world and event count, ordered by name.
    pub async fn list_with_world(pool: &PgPool) -> Result<Vec<TimelineSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} ORDER BY t.name ASC");
        sqlx::query_as::<_, TimelineSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// Timeline summaries for one world.
    pub async fn list_by_world(
        pool: &PgPool,
        world_id: DbId,
    ) -> Result<Vec<TimelineSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE t.world_id = $1 ORDER BY t.name ASC");
        sqlx::query_as::<_, TimelineSummary>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Update a timeline. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimeline,
    ) -> Result<Option<Timeline>, sqlx::Error> {
        let query = format!(
            "UPDATE timelines SET
                world_id = COALESCE($2, world_id),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description_md = COALESCE($5, description_md)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Timeline>(&query)
            .bind(id)
            .bind(input.world_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description_md)
            .fetch_optional(pool)
            .await
    }

    /// Delete a timeline and, by cascade, its events.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timelines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM timelines")
            .fetch_one(pool)
            .await
    }
}
