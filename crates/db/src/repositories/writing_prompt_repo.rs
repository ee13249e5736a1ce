//! Repository for the `writing_prompts` table.

use sqlx::PgPool;
use ocwiki_core::types::DbId;

use crate::models::writing_prompt::{CreateWritingPrompt, UpdateWritingPrompt, WritingPrompt};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, prompt, category, is_active, created_at, updated_at";

/// Provides CRUD operations for writing prompts.
pub struct WritingPromptRepo;

impl WritingPromptRepo {
    /// Insert a new prompt. If `is_active` is `None`, defaults to `true`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWritingPrompt,
    ) -> Result<WritingPrompt, sqlx::Error> {
        let query = format!(
            "INSERT INTO writing_prompts (world_id, prompt, category, is_active)
             VALUES ($1, $2, $3, COALESCE($4, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WritingPrompt>(&query)
            .bind(input.world_id)
            .bind(&input.prompt)
            .bind(&input.category)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WritingPrompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM writing_prompts WHERE id = $1");
        sqlx::query_as::<_, WritingPrompt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every prompt, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<WritingPrompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM writing_prompts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, WritingPrompt>(&query)
            .fetch_all(pool)
            .await
    }

    /// List active prompts, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<WritingPrompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM writing_prompts
             WHERE is_active
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, WritingPrompt>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWritingPrompt,
    ) -> Result<Option<WritingPrompt>, sqlx::Error> {
        let query = format!(
            "UPDATE writing_prompts SET
                world_id = COALESCE($2, world_id),
                prompt = COALESCE($3, prompt),
                category = COALESCE($4, category),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WritingPrompt>(&query)
            .bind(id)
            .bind(input.world_id)
            .bind(&input.prompt)
            .bind(&input.category)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM writing_prompts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM writing_prompts")
            .fetch_one(pool)
            .await
    }
}
