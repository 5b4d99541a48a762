//! Federated server moderation: blocking, un-blocking, and the detail view.

use bookwyrm_common::{AppError, AppResult};
use bookwyrm_db::{
    entities::{blocking, federated_server, report, user},
    repositories::{BlockingRepository, FederatedServerRepository, ReportRepository, UserRepository},
};
use serde::Serialize;

/// Everything an administrator sees about one federated server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerDetail {
    pub server: federated_server::Model,
    /// Every known user of the server.
    pub users: Vec<user::Model>,
    /// Reports filed against those users.
    pub reports: Vec<report::Model>,
    /// Users of the server that local users follow.
    pub followed_by_us: Vec<user::Model>,
    /// Users of the server that follow local users.
    pub followed_by_them: Vec<user::Model>,
    /// Blocks between local users and users of the server, either direction.
    pub blocks: Vec<blocking::Model>,
}

/// Moderation actions on federated servers.
#[derive(Clone)]
pub struct ServerModerationService {
    server_repo: FederatedServerRepository,
    user_repo: UserRepository,
    report_repo: ReportRepository,
    blocking_repo: BlockingRepository,
}

impl ServerModerationService {
    /// Create a new server moderation service.
    #[must_use]
    pub const fn new(
        server_repo: FederatedServerRepository,
        user_repo: UserRepository,
        report_repo: ReportRepository,
        blocking_repo: BlockingRepository,
    ) -> Self {
        Self {
            server_repo,
            user_repo,
            report_repo,
            blocking_repo,
        }
    }

    /// Flip a server between `federated` and `blocked`.
    ///
    /// Every user of the server is deactivated on block and activated on
    /// un-block, in the same transaction as the status change. The server row
    /// stays locked until commit, so concurrent toggles serialize.
    pub async fn toggle(&self, server_id: &str) -> AppResult<federated_server::Model> {
        let txn = self.server_repo.begin().await?;

        let mut server = self.server_repo.get_for_update(&txn, server_id).await?;
        let status = server.status.toggled();

        self.server_repo.set_status(&txn, server_id, status).await?;
        let affected = self
            .user_repo
            .set_active_for_server(&txn, server_id, status.users_active())
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            server_id = %server.id,
            server_name = %server.server_name,
            status = status.as_str(),
            users_affected = affected,
            "Toggled federation status"
        );

        server.status = status;
        Ok(server)
    }

    /// Gather the detail view of a server.
    pub async fn detail(&self, server_id: &str) -> AppResult<ServerDetail> {
        let server = self.server_repo.get_by_id(server_id).await?;

        let users = self.user_repo.find_by_server(server_id).await?;
        let reports = self.report_repo.find_by_server(server_id).await?;
        let followed_by_us = self
            .user_repo
            .find_by_server_followed_locally(server_id)
            .await?;
        let followed_by_them = self
            .user_repo
            .find_by_server_following_local(server_id)
            .await?;
        let blocks = self
            .blocking_repo
            .find_between_server_and_local(server_id)
            .await?;

        tracing::debug!(
            server_id,
            users = users.len(),
            reports = reports.len(),
            blocks = blocks.len(),
            "Loaded federated server detail"
        );

        Ok(ServerDetail {
            server,
            users,
            reports,
            followed_by_us,
            followed_by_them,
            blocks,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookwyrm_db::entities::federated_server::FederationStatus;
    use chrono::Utc;
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Statement, Transaction,
        Value,
    };
    use std::sync::Arc;

    fn create_test_server(id: &str, status: FederationStatus) -> federated_server::Model {
        federated_server::Model {
            id: id.to_string(),
            server_name: "books.example".to_string(),
            application_type: None,
            application_version: None,
            status,
            notes: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_user(id: &str, server_id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            host: Some("books.example".to_string()),
            federated_server_id: Some(server_id.to_string()),
            token: None,
            name: None,
            is_active: true,
            is_superuser: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> ServerModerationService {
        let db = Arc::new(db);
        ServerModerationService::new(
            FederatedServerRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            ReportRepository::new(Arc::clone(&db)),
            BlockingRepository::new(db),
        )
    }

    fn rows(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    /// Toggle `s1` `times` times and return the committed transactions.
    async fn toggle_log(db: MockDatabase, times: usize) -> Vec<Transaction> {
        let conn = Arc::new(db.into_connection());
        let svc = ServerModerationService::new(
            FederatedServerRepository::new(Arc::clone(&conn)),
            UserRepository::new(Arc::clone(&conn)),
            ReportRepository::new(Arc::clone(&conn)),
            BlockingRepository::new(Arc::clone(&conn)),
        );
        for _ in 0..times {
            svc.toggle("s1").await.unwrap();
        }
        drop(svc);

        Arc::into_inner(conn).unwrap().into_transaction_log()
    }

    fn update_of<'a>(txn: &'a Transaction, table: &str) -> &'a Statement {
        let prefix = format!("UPDATE \"{table}\"");
        txn.statements()
            .iter()
            .find(|s| s.sql.starts_with(&prefix))
            .unwrap()
    }

    fn assert_cascade(txn: &Transaction, is_active: bool) {
        assert_eq!(txn.statements().len(), 3);
        assert!(txn.statements()[0].sql.contains("FOR UPDATE"));

        let server = update_of(txn, "federated_server");
        assert!(server.sql.contains("\"status\""));

        let users = update_of(txn, "user");
        assert!(users.sql.contains("\"is_active\""));
        assert!(users.sql.contains("\"federated_server_id\""));
        assert!(users.sql.contains("\"host\" IS NOT NULL"));
        let values = &users.values.as_ref().unwrap().0;
        assert!(values.contains(&Value::Bool(Some(is_active))));
        assert!(values.contains(&Value::from("s1")));
    }

    #[tokio::test]
    async fn test_toggle_blocks_federated_server() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_server("s1", FederationStatus::Federated)]])
            .append_exec_results([rows(1), rows(2)])
            .into_connection();

        let server = service(db).toggle("s1").await.unwrap();

        assert_eq!(server.status, FederationStatus::Blocked);
    }

    #[tokio::test]
    async fn test_toggle_unblocks_blocked_server() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_server("s1", FederationStatus::Blocked)]])
            .append_exec_results([rows(1), rows(2)])
            .into_connection();

        let server = service(db).toggle("s1").await.unwrap();

        assert_eq!(server.status, FederationStatus::Federated);
    }

    #[tokio::test]
    async fn test_block_deactivates_users_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_server("s1", FederationStatus::Federated)]])
            .append_exec_results([rows(1), rows(2)]);

        let log = toggle_log(db, 1).await;

        assert_eq!(log.len(), 1);
        assert_cascade(&log[0], false);
    }

    #[tokio::test]
    async fn test_toggle_twice_reactivates_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_server("s1", FederationStatus::Federated)]])
            .append_query_results([[create_test_server("s1", FederationStatus::Blocked)]])
            .append_exec_results([rows(1), rows(2), rows(1), rows(2)]);

        let log = toggle_log(db, 2).await;

        assert_eq!(log.len(), 2);
        assert_cascade(&log[0], false);
        assert_cascade(&log[1], true);
    }

    #[tokio::test]
    async fn test_toggle_unknown_server() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<federated_server::Model>::new()])
            .into_connection();

        let result = service(db).toggle("missing").await;

        assert!(matches!(result, Err(AppError::ServerNotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_collects_related_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_server("s1", FederationStatus::Federated)]])
            .append_query_results([[create_test_user("u1", "s1"), create_test_user("u2", "s1")]])
            .append_query_results([Vec::<report::Model>::new()])
            .append_query_results([[create_test_user("u1", "s1")]])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([Vec::<blocking::Model>::new()])
            .into_connection();

        let detail = service(db).detail("s1").await.unwrap();

        assert_eq!(detail.server.id, "s1");
        assert_eq!(detail.users.len(), 2);
        assert!(detail.reports.is_empty());
        assert_eq!(detail.followed_by_us.len(), 1);
        assert!(detail.followed_by_them.is_empty());
        assert!(detail.blocks.is_empty());
    }

    #[tokio::test]
    async fn test_detail_unknown_server() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<federated_server::Model>::new()])
            .into_connection();

        let result = service(db).detail("missing").await;

        assert!(matches!(result, Err(AppError::ServerNotFound(_))));
    }
}
