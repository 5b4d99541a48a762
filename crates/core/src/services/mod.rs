//! Business logic services.

#![allow(missing_docs)]

pub mod federation;
pub mod moderation;
pub mod permission;
pub mod user;

pub use federation::{FederationService, ServerForm, ServerPage, normalize_page};
pub use moderation::{ServerDetail, ServerModerationService};
pub use permission::PermissionService;
pub use user::UserService;
