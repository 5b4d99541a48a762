//! Test utilities for database operations.
//!
//! Provides a throwaway migrated `PostgreSQL` database per test and a few
//! fixture helpers for the rows the federation tests need.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Set,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{federated_server, user};
use crate::migrations::Migrator;

/// Tables holding seed data written by migrations; never truncated.
const SEEDED_TABLES: [&str; 3] = ["seaql_migrations", "auth_group", "group_permission"];

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER")
                .unwrap_or_else(|_| "bookwyrm_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "bookwyrm_test".to_string()),
            database: std::env::var("TEST_DB_NAME")
                .unwrap_or_else(|_| "bookwyrm_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// URL of the maintenance database, used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A test database context that manages the lifecycle of a test database.
pub struct TestDatabase {
    /// Database connection, shared with the repositories under test.
    pub conn: Arc<DatabaseConnection>,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the configured test database without migrating it.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Arc::new(Database::connect(&config.database_url()).await?);

        info!(database = %config.database, "Connected to test database");

        Ok(Self { conn, config })
    }

    /// Create a fresh uniquely named database and run every migration on it.
    pub async fn migrated() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("bookwyrm_test_{}", &unique_suffix[..8]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;
        postgres_conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        postgres_conn.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Created migrated test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Another handle to the connection, for building repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Truncate every table except migration bookkeeping and seeded groups.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let tables = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
            ))
            .await?;

        for row in tables {
            let Ok(table_name) = row.try_get::<String>("", "tablename") else {
                continue;
            };
            if SEEDED_TABLES.contains(&table_name.as_str()) {
                continue;
            }

            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("TRUNCATE TABLE \"{table_name}\" CASCADE"),
                ))
                .await?;
        }

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop the test database. Consumes self to close the connection first;
    /// handles still held elsewhere are cut off by the backend terminate below.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        if let Some(conn) = Arc::into_inner(self.conn) {
            conn.close().await?;
        }

        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        // Stray pool connections would block the drop.
        postgres_conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
                    self.config.database
                ),
            ))
            .await
            .ok();

        postgres_conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database),
            ))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

/// Insert a federated server in the `federated` state.
pub async fn insert_server<C>(
    conn: &C,
    id: &str,
    server_name: &str,
    application_type: Option<&str>,
) -> Result<federated_server::Model, DbErr>
where
    C: ConnectionTrait,
{
    federated_server::ActiveModel {
        id: Set(id.to_string()),
        server_name: Set(server_name.to_string()),
        application_type: Set(application_type.map(ToString::to_string)),
        application_version: Set(None),
        status: Set(federated_server::FederationStatus::Federated),
        notes: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(conn)
    .await
}

/// Insert an active remote user belonging to `server`.
pub async fn insert_remote_user<C>(
    conn: &C,
    id: &str,
    username: &str,
    server: &federated_server::Model,
) -> Result<user::Model, DbErr>
where
    C: ConnectionTrait,
{
    user_model(id, username, Some(server), false).insert(conn).await
}

/// Insert an active local user.
pub async fn insert_local_user<C>(
    conn: &C,
    id: &str,
    username: &str,
    is_superuser: bool,
) -> Result<user::Model, DbErr>
where
    C: ConnectionTrait,
{
    user_model(id, username, None, is_superuser).insert(conn).await
}

fn user_model(
    id: &str,
    username: &str,
    server: Option<&federated_server::Model>,
    is_superuser: bool,
) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        username_lower: Set(username.to_lowercase()),
        host: Set(server.map(|s| s.server_name.clone())),
        federated_server_id: Set(server.map(|s| s.id.clone())),
        token: Set(None),
        name: Set(None),
        is_active: Set(true),
        is_superuser: Set(is_superuser),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}
