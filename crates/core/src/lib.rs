//! Domain logic shared by the database and API crates.
//!
//! Everything here is pure: no I/O, no async, no database handles.

pub mod dropdown;
pub mod error;
pub mod forms;
pub mod random;
pub mod sanitize;
pub mod slug;
pub mod timeline;
pub mod types;
