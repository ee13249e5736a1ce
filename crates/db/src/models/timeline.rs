//! Timeline model and DTOs.

use ocwiki_core::forms::{empty_as_none, non_blank, optional_i64, trimmed_string};
use ocwiki_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `timelines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Timeline {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub name: String,
    pub slug: String,
    pub description_md: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Timeline listing row with its world and event count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineSummary {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub world_name: Option<String>,
    pub world_slug: Option<String>,
    pub event_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTimeline {
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
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTimeline {
    #[serde(default, deserialize_with = "optional_i64")]
    pub world_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
}
