//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `bookwyrm_test`)
//!   `TEST_DB_PASSWORD` (default: `bookwyrm_test`)

#![allow(clippy::unwrap_used)]

use bookwyrm_common::AppError;
use bookwyrm_db::entities::{auth_group, federated_server};
use bookwyrm_db::migrations::{ADMIN_GROUP, add_superusers_to_group};
use bookwyrm_db::repositories::{
    DUPLICATE_SERVER_NAME, FederatedServerRepository, GroupRepository, UserRepository,
};
use sea_orm::Set;
use bookwyrm_db::test_utils::{TestDatabase, insert_local_user, insert_remote_user, insert_server};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_seed_default_groups() {
    let db = TestDatabase::migrated().await.unwrap();
    let groups = GroupRepository::new(db.shared());

    for name in [
        auth_group::ADMIN_GROUP,
        auth_group::MODERATOR_GROUP,
        auth_group::EDITOR_GROUP,
    ] {
        assert!(groups.find_by_name(name).await.unwrap().is_some(), "{name} missing");
    }

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_superuser_backfill_is_idempotent() {
    let db = TestDatabase::migrated().await.unwrap();
    let conn = db.connection();

    insert_local_user(conn, "u1", "root", true).await.unwrap();
    insert_local_user(conn, "u2", "reader", false).await.unwrap();
    insert_local_user(conn, "u3", "writer", false).await.unwrap();

    let groups = GroupRepository::new(db.shared());
    let admin = groups.get_by_name(ADMIN_GROUP).await.unwrap();

    let added = add_superusers_to_group(conn, ADMIN_GROUP).await.unwrap();
    assert_eq!(added, 1);
    assert_eq!(groups.member_ids(&admin.id).await.unwrap(), vec!["u1".to_string()]);

    let added_again = add_superusers_to_group(conn, ADMIN_GROUP).await.unwrap();
    assert_eq!(added_again, 0);
    assert_eq!(groups.member_ids(&admin.id).await.unwrap(), vec!["u1".to_string()]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_superuser_backfill_fails_without_group() {
    let db = TestDatabase::migrated().await.unwrap();

    let result = add_superusers_to_group(db.connection(), "no-such-group").await;
    assert!(result.is_err());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_cascade_only_touches_server_users() {
    let db = TestDatabase::migrated().await.unwrap();
    let conn = db.connection();

    let server = insert_server(conn, "s1", "books.example", Some("bookwyrm")).await.unwrap();
    let other = insert_server(conn, "s2", "other.example", None).await.unwrap();
    insert_remote_user(conn, "r1", "alice", &server).await.unwrap();
    insert_remote_user(conn, "r2", "bob", &server).await.unwrap();
    insert_remote_user(conn, "r3", "carol", &other).await.unwrap();
    insert_local_user(conn, "l1", "local", false).await.unwrap();

    let users = UserRepository::new(db.shared());
    let changed = users.set_active_for_server(conn, "s1", false).await.unwrap();
    assert_eq!(changed, 2);

    assert!(!users.get_by_id("r1").await.unwrap().is_active);
    assert!(!users.get_by_id("r2").await.unwrap().is_active);
    assert!(users.get_by_id("r3").await.unwrap().is_active);
    assert!(users.get_by_id("l1").await.unwrap().is_active);

    let servers = FederatedServerRepository::new(db.shared());
    assert!(servers.find_by_name("BOOKS.example").await.unwrap().is_some());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_server_name_is_a_form_error() {
    let db = TestDatabase::migrated().await.unwrap();
    let servers = FederatedServerRepository::new(db.shared());

    let model = |id: &str| federated_server::ActiveModel {
        id: Set(id.to_string()),
        server_name: Set("books.example".to_string()),
        application_type: Set(None),
        application_version: Set(None),
        status: Set(federated_server::FederationStatus::Federated),
        notes: Set(None),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    };

    servers.create(model("s1")).await.unwrap();
    let result = servers.create(model("s2")).await;

    match result {
        Err(AppError::InvalidForm(fields)) => {
            assert_eq!(fields["server_name"], vec![DUPLICATE_SERVER_NAME.to_string()]);
        }
        other => panic!("expected form error, got {other:?}"),
    }

    db.drop_database().await.unwrap();
}
