//! Admin account model and DTOs.

use sqlx::FromRow;
use ocwiki_core::types::{DbId, Timestamp};

/// A row from the `admin_users` table.
///
/// Deliberately not `Serialize`: the password hash must never be rendered.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an admin account.
pub struct CreateAdminUser {
    pub username: String,
    pub password_hash: String,
}
