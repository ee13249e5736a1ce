//! Repository for the `worlds` table.

use sqlx::PgPool;
use ocwiki_core::types::DbId;

use crate::models::world::{CreateWorld, UpdateWorld, World};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, summary, description_md, genre, header_image_url, \
                       is_public, created_at, updated_at";

/// Provides CRUD operations for worlds.
pub struct WorldRepo;

impl WorldRepo {
    /// Insert a new world with an already-resolved slug.
    ///
    /// If `is_public` is `None`, defaults to `true`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWorld,
        slug: &str,
    ) -> Result<World, sqlx::Error> {
        let query = format!(
            "INSERT INTO worlds
                (name, slug, summary, description_md, genre, header_image_url, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, World>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.summary)
            .bind(&input.description_md)
            .bind(&input.genre)
            .bind(&input.header_image_url)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worlds WHERE id = $1");
        sqlx::query_as::<_, World>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a public world by slug.
    pub async fn find_public_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worlds WHERE slug = $1 AND is_public");
        sqlx::query_as::<_, World>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List every world (admin view), ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worlds ORDER BY name ASC");
        sqlx::query_as::<_, World>(&query).fetch_all(pool).await
    }

    /// List public worlds, ordered by name.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worlds WHERE is_public ORDER BY name ASC");
        sqlx::query_as::<_, World>(&query).fetch_all(pool).await
    }

    /// Update a world. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorld,
    ) -> Result<Option<World>, sqlx::Error> {
        let query = format!(
            "UPDATE worlds SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                summary = COALESCE($4, summary),
                description_md = COALESCE($5, description_md),
                genre = COALESCE($6, genre),
                header_image_url = COALESCE($7, header_image_url),
                is_public = COALESCE($8, is_public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, World>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.summary)
            .bind(&input.description_md)
            .bind(&input.genre)
            .bind(&input.header_image_url)
            .bind(input.is_public)
            .fetch_optional(pool)
            .await
    }

    /// Delete a world. OCs and timelines keep existing with `world_id = NULL`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM worlds WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM worlds")
            .fetch_one(pool)
            .await
    }
}
