//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod admin_session_repo;
pub mod admin_user_repo;
pub mod oc_repo;
pub mod site_settings_repo;
pub mod timeline_event_repo;
pub mod timeline_repo;
pub mod world_repo;
pub mod writing_prompt_repo;

pub use admin_session_repo::AdminSessionRepo;
pub use admin_user_repo::AdminUserRepo;
pub use oc_repo::OcRepo;
pub use site_settings_repo::SiteSettingsRepo;
pub use timeline_event_repo::TimelineEventRepo;
pub use timeline_repo::TimelineRepo;
pub use world_repo::WorldRepo;
pub use writing_prompt_repo::WritingPromptRepo;
