//! Database migrations.
//!
//! Schema migrations for the database, followed by data migrations that
//! depend on them. Order matters: the superuser backfill needs the groups
//! seeded by the migration before it.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_federated_server_table;
mod m20250101_000002_create_user_table;
mod m20250101_000003_create_following_table;
mod m20250101_000004_create_blocking_table;
mod m20250101_000005_create_report_table;
mod m20250101_000006_create_auth_group_tables;
mod m20250101_000007_add_superusers_to_admin_group;

pub use m20250101_000007_add_superusers_to_admin_group::{ADMIN_GROUP, add_superusers_to_group};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_federated_server_table::Migration),
            Box::new(m20250101_000002_create_user_table::Migration),
            Box::new(m20250101_000003_create_following_table::Migration),
            Box::new(m20250101_000004_create_blocking_table::Migration),
            Box::new(m20250101_000005_create_report_table::Migration),
            Box::new(m20250101_000006_create_auth_group_tables::Migration),
            Box::new(m20250101_000007_add_superusers_to_admin_group::Migration),
        ]
    }
}
