//! Request extractors that gate admin routes.
//!
//! - [`admin::AdminSession`] -- JSON routes; rejects with 401.
//! - [`admin::AdminPage`] -- HTML routes; redirects to the login page.

pub mod admin;
