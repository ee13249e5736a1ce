//! Repository for the `ocs` table.

use sqlx::PgPool;
use ocwiki_core::types::DbId;

use crate::models::oc::{CreateOc, Oc, OcCard, UpdateOc};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, name, slug, tagline, age, gender, pronouns, species, \
                       occupation, status, image_url, bio_md, tags, is_public, \
                       created_at, updated_at";

/// Card columns; requires [`CARD_FROM`].
const CARD_COLUMNS: &str = "o.id, o.name, o.slug, o.tagline, o.image_url, o.species, \
                            w.name AS world_name, w.slug AS world_slug";

/// OCs joined to their world only while that world is public.
const CARD_FROM: &str = "ocs o LEFT JOIN worlds w ON w.id = o.world_id AND w.is_public";

/// Provides CRUD operations and public listings for OCs.
pub struct OcRepo;

impl OcRepo {
    /// Insert a new OC with an already-resolved slug.
    pub async fn create(pool: &PgPool, input: &CreateOc, slug: &str) -> Result<Oc, sqlx::Error> {
        let query = format!(
            "INSERT INTO ocs
                (world_id, name, slug, tagline, age, gender, pronouns, species,
                 occupation, status, image_url, bio_md, tags, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, COALESCE($14, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oc>(&query)
            .bind(input.world_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.tagline)
            .bind(&input.age)
            .bind(&input.gender)
            .bind(&input.pronouns)
            .bind(&input.species)
            .bind(&input.occupation)
            .bind(&input.status)
            .bind(&input.image_url)
            .bind(&input.bio_md)
            .bind(&input.tags)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Oc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ocs WHERE id = $1");
        sqlx::query_as::<_, Oc>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a public OC by slug.
    pub async fn find_public_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Oc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ocs WHERE slug = $1 AND is_public");
        sqlx::query_as::<_, Oc>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List every OC (admin view), ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Oc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ocs ORDER BY name ASC");
        sqlx::query_as::<_, Oc>(&query).fetch_all(pool).await
    }

    /// List public OC cards, optionally filtered by world slug and a search term.
    ///
    /// The search term matches name or tagline (case-insensitive substring)
    /// or an exact tag.
    pub async fn list_public(
        pool: &PgPool,
        world_slug: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<OcCard>, sqlx::Error> {
        let query = format!(
            "SELECT {CARD_COLUMNS}
             FROM {CARD_FROM}
             WHERE o.is_public
               AND ($1::TEXT IS NULL OR w.slug = $1)
               AND ($2::TEXT IS NULL
                    OR o.name ILIKE $2
                    OR o.tagline ILIKE $2
                    OR $3 = ANY(o.tags))
             ORDER BY o.name ASC"
        );
        sqlx::query_as::<_, OcCard>(&query)
            .bind(world_slug)
            .bind(search.map(like_pattern))
            .bind(search)
            .fetch_all(pool)
            .await
    }

    /// The most recently created public OCs.
    pub async fn list_recent_public(pool: &PgPool, limit: i64) -> Result<Vec<OcCard>, sqlx::Error> {
        let query = format!(
            "SELECT {CARD_COLUMNS}
             FROM {CARD_FROM}
             WHERE o.is_public
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, OcCard>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Public OC cards belonging to a world.
    pub async fn list_by_world(
        pool: &PgPool,
        world_id: DbId,
    ) -> Result<Vec<OcCard>, sqlx::Error> {
        let query = format!(
            "SELECT {CARD_COLUMNS}
             FROM {CARD_FROM}
             WHERE o.is_public AND o.world_id = $1
             ORDER BY o.name ASC"
        );
        sqlx::query_as::<_, OcCard>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Public OC cards for a set of ids, ordered by name. Unknown ids are skipped.
    pub async fn list_public_cards_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<OcCard>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {CARD_COLUMNS}
             FROM {CARD_FROM}
             WHERE o.is_public AND o.id = ANY($1)
             ORDER BY o.name ASC"
        );
        sqlx::query_as::<_, OcCard>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Slugs of every public OC, used by the random-character redirect.
    pub async fn list_public_slugs(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM ocs WHERE is_public ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Update an OC. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOc,
    ) -> Result<Option<Oc>, sqlx::Error> {
        let query = format!(
            "UPDATE ocs SET
                world_id = COALESCE($2, world_id),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                tagline = COALESCE($5, tagline),
                age = COALESCE($6, age),
                gender = COALESCE($7, gender),
                pronouns = COALESCE($8, pronouns),
                species = COALESCE($9, species),
                occupation = COALESCE($10, occupation),
                status = COALESCE($11, status),
                image_url = COALESCE($12, image_url),
                bio_md = COALESCE($13, bio_md),
                tags = COALESCE($14, tags),
                is_public = COALESCE($15, is_public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oc>(&query)
            .bind(id)
            .bind(input.world_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.tagline)
            .bind(&input.age)
            .bind(&input.gender)
            .bind(&input.pronouns)
            .bind(&input.species)
            .bind(&input.occupation)
            .bind(&input.status)
            .bind(&input.image_url)
            .bind(&input.bio_md)
            .bind(&input.tags)
            .bind(input.is_public)
            .fetch_optional(pool)
            .await
    }

    /// Delete an OC. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ocs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ocs")
            .fetch_one(pool)
            .await
    }
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
