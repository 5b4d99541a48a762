//! Repository layer for database operations.

mod blocking;
mod federated_server;
mod group;
mod report;
mod user;

pub use blocking::BlockingRepository;
pub use federated_server::{DUPLICATE_SERVER_NAME, FederatedServerRepository, ServerSort, SortField};
pub use group::GroupRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
