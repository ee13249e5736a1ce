//! Writing prompt model and DTOs.

use ocwiki_core::forms::{empty_as_none, non_blank, optional_bool, optional_i64, trimmed_string};
use ocwiki_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `writing_prompts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WritingPrompt {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub prompt: String,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWritingPrompt {
    #[serde(default, deserialize_with = "optional_i64")]
    pub world_id: Option<DbId>,
    #[serde(default, deserialize_with = "trimmed_string")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 2000, message = "must be at most 2000 characters")
    )]
    pub prompt: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub category: Option<String>,
    /// Defaults to `true`.
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWritingPrompt {
    #[serde(default, deserialize_with = "optional_i64")]
    pub world_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_active: Option<bool>,
}
