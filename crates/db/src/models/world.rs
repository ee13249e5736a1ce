//! World model and DTOs.

use ocwiki_core::forms::{empty_as_none, non_blank, optional_bool, trimmed_string};
use ocwiki_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `worlds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct World {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description_md: Option<String>,
    pub genre: Option<String>,
    pub header_image_url: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a world.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorld {
    #[serde(default, deserialize_with = "trimmed_string")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub header_image_url: Option<String>,
    /// Defaults to `true`.
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_public: Option<bool>,
}

/// DTO for updating a world. `None` fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorld {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub header_image_url: Option<String>,
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_public: Option<bool>,
}
