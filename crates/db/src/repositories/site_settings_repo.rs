//! Repository for the single-row `site_settings` table.

use sqlx::PgPool;

use crate::models::site_settings::{SiteSettings, UpdateSiteSettings};

const COLUMNS: &str = "site_name, tagline, about_md, footer_text, updated_at";

/// Reads and writes the site settings row (`id = 1`).
pub struct SiteSettingsRepo;

impl SiteSettingsRepo {
    /// Load the settings, falling back to defaults if the row is missing.
    pub async fn get(pool: &PgPool) -> Result<SiteSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_settings WHERE id = 1");
        let row = sqlx::query_as::<_, SiteSettings>(&query)
            .fetch_optional(pool)
            .await?;
        Ok(row.unwrap_or_default())
    }

    /// Apply a partial update, creating the row first if it is missing.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpdateSiteSettings,
    ) -> Result<SiteSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_settings (id, site_name, tagline, about_md, footer_text)
             VALUES (1, COALESCE($1, 'OC Wiki'), $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                site_name = COALESCE($1, site_settings.site_name),
                tagline = COALESCE($2, site_settings.tagline),
                about_md = COALESCE($3, site_settings.about_md),
                footer_text = COALESCE($4, site_settings.footer_text)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteSettings>(&query)
            .bind(&input.site_name)
            .bind(&input.tagline)
            .bind(&input.about_md)
            .bind(&input.footer_text)
            .fetch_one(pool)
            .await
    }
}
