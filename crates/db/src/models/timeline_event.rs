//! Timeline event model and DTOs.

use ocwiki_core::forms::{
    empty_as_none, id_list, non_blank, optional_i64, optional_id_list, trimmed_string,
};
use ocwiki_core::timeline::Sequenced;
use ocwiki_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `timeline_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: DbId,
    pub timeline_id: DbId,
    pub title: String,
    pub date_label: Option<String>,
    pub sort_key: Option<i64>,
    pub description_md: Option<String>,
    /// OCs featured in this event.
    pub oc_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Sequenced for TimelineEvent {
    fn id(&self) -> DbId {
        self.id
    }

    fn sort_key(&self) -> Option<i64> {
        self.sort_key
    }
}

/// An event featuring a given OC, with the timeline it belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OcAppearance {
    pub event_id: DbId,
    pub title: String,
    pub date_label: Option<String>,
    pub sort_key: Option<i64>,
    pub timeline_name: String,
    pub timeline_slug: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTimelineEvent {
    #[serde(default, deserialize_with = "optional_i64")]
    #[validate(required)]
    pub timeline_id: Option<DbId>,
    #[serde(default, deserialize_with = "trimmed_string")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 300, message = "must be at most 300 characters")
    )]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub date_label: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub sort_key: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
    #[serde(default, deserialize_with = "id_list")]
    pub oc_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTimelineEvent {
    #[serde(default, deserialize_with = "optional_i64")]
    pub timeline_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub date_label: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub sort_key: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub description_md: Option<String>,
    #[serde(default, deserialize_with = "optional_id_list")]
    pub oc_ids: Option<Vec<DbId>>,
}
