//! Request handlers, grouped by area.
//!
//! Generic admin CRUD handlers live in [`crate::crud`]; the image proxy in
//! [`crate::image_proxy`].

pub mod admin_pages;
pub mod auth;
pub mod public;
pub mod settings;
