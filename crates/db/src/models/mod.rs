//! Row models and request DTOs, one module per table.

pub mod admin_session;
pub mod admin_user;
pub mod oc;
pub mod site_settings;
pub mod timeline;
pub mod timeline_event;
pub mod world;
pub mod writing_prompt;
