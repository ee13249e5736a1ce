//! Original character (OC) model and DTOs.

use ocwiki_core::forms::{
    empty_as_none, non_blank, optional_bool, optional_i64, optional_string_list, string_list,
    trimmed_string,
};
use ocwiki_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `ocs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Oc {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub name: String,
    pub slug: String,
    pub tagline: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub pronouns: Option<String>,
    pub species: Option<String>,
    pub occupation: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub bio_md: Option<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing card for public pages: an OC joined with its world's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OcCard {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub tagline: Option<String>,
    pub image_url: Option<String>,
    pub species: Option<String>,
    pub world_name: Option<String>,
    pub world_slug: Option<String>,
}

/// DTO for creating an OC.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOc {
    #[serde(default, deserialize_with = "optional_i64")]
    pub world_id: Option<DbId>,
    #[serde(default, deserialize_with = "trimmed_string")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub pronouns: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub species: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub bio_md: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    #[validate(length(max = 30, message = "must have at most 30 tags"))]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_public: Option<bool>,
}

/// DTO for updating an OC. `None` fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOc {
    #[serde(default, deserialize_with = "optional_i64")]
    pub world_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub pronouns: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub species: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub bio_md: Option<String>,
    #[serde(default, deserialize_with = "optional_string_list")]
    #[validate(length(max = 30, message = "must have at most 30 tags"))]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_public: Option<bool>,
}
