//! Database entities.

pub mod auth_group;
pub mod blocking;
pub mod federated_server;
pub mod following;
pub mod group_permission;
pub mod report;
pub mod user;
pub mod user_group;

pub use auth_group::Entity as AuthGroup;
pub use blocking::Entity as Blocking;
pub use federated_server::Entity as FederatedServer;
pub use following::Entity as Following;
pub use group_permission::Entity as GroupPermission;
pub use report::Entity as Report;
pub use user::Entity as User;
pub use user_group::Entity as UserGroup;
