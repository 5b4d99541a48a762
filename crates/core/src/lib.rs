//! Core business logic for bookwyrm-rs.

pub mod services;

pub use services::*;
