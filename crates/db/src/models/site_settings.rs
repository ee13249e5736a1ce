//! Site-wide settings (single row).

use ocwiki_core::forms::empty_as_none;
use ocwiki_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Name shown when the settings row has never been edited.
pub const DEFAULT_SITE_NAME: &str = "OC Wiki";

/// The `site_settings` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub tagline: Option<String>,
    pub about_md: Option<String>,
    pub footer_text: Option<String>,
    pub updated_at: Option<Timestamp>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            tagline: None,
            about_md: None,
            footer_text: None,
            updated_at: None,
        }
    }
}

/// DTO for `PUT /api/admin/settings`. `None` fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSiteSettings {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub site_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    pub about_md: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub footer_text: Option<String>,
}
