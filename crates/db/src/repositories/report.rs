//! Report repository.

use std::sync::Arc;

use crate::entities::{Report, report};
use crate::repositories::user::server_user_ids;
use bookwyrm_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Reports filed against any user of a federated server, newest first.
    pub async fn find_by_server(&self, server_id: &str) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::TargetUserId.in_subquery(server_user_ids(server_id)))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::report::ReportStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_server() {
        let report = report::Model {
            id: "r1".to_string(),
            reporter_id: "local1".to_string(),
            target_user_id: "remote1".to_string(),
            note: Some("spam".to_string()),
            status: ReportStatus::Open,
            created_at: Utc::now().into(),
            resolved_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let reports = repo.find_by_server("s1").await.unwrap();

        assert_eq!(reports, vec![report]);
    }

    #[tokio::test]
    async fn test_find_by_server_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let reports = repo.find_by_server("s1").await.unwrap();

        assert!(reports.is_empty());
    }
}
