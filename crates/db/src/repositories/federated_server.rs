//! Federated server repository.

use std::sync::Arc;

use crate::entities::{
    FederatedServer,
    federated_server::{self, FederationStatus},
};
use bookwyrm_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    SqlErr, TransactionTrait, sea_query::Expr,
};

/// Form message for a domain that is already on record.
pub const DUPLICATE_SERVER_NAME: &str = "A server with this name already exists";

/// Map a failed insert or update. `server_name` is the only unique column a
/// caller controls, so a unique violation is reported against that field.
fn write_error(sql_err: Option<SqlErr>, e: &DbErr) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::field("server_name", DUPLICATE_SERVER_NAME)
        }
        _ => AppError::Database(e.to_string()),
    }
}

/// Column a server listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// When the server record was created.
    CreatedDate,
    /// The remote software.
    ApplicationType,
    /// The domain.
    ServerName,
}

impl SortField {
    const ALL: [Self; 3] = [Self::CreatedDate, Self::ApplicationType, Self::ServerName];

    const fn param(self) -> &'static str {
        match self {
            Self::CreatedDate => "created_date",
            Self::ApplicationType => "application_type",
            Self::ServerName => "server_name",
        }
    }

    const fn column(self) -> federated_server::Column {
        match self {
            Self::CreatedDate => federated_server::Column::CreatedAt,
            Self::ApplicationType => federated_server::Column::ApplicationType,
            Self::ServerName => federated_server::Column::ServerName,
        }
    }
}

/// An allow-listed sort order for server listings.
///
/// Written as the field name for ascending order and with a leading `-` for
/// descending order, e.g. `server_name` or `-created_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSort {
    /// Column to sort by.
    pub field: SortField,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl ServerSort {
    /// Parse a sort parameter. Anything outside the allow-list yields `None`.
    #[must_use]
    pub fn from_param(raw: &str) -> Option<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        SortField::ALL
            .into_iter()
            .find(|field| field.param() == name)
            .map(|field| Self { field, descending })
    }

    /// The parameter form of this sort.
    #[must_use]
    pub fn as_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field.param())
        } else {
            self.field.param().to_string()
        }
    }

    const fn order(&self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }
}

/// Federated server repository for database operations.
#[derive(Clone)]
pub struct FederatedServerRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl FederatedServerRepository {
    /// Create a new federated server repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Generate an ID for a new server record.
    #[must_use]
    pub fn next_id(&self) -> String {
        self.id_gen.generate()
    }

    /// Start a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a server by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<federated_server::Model>> {
        FederatedServer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a server by ID, or error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<federated_server::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ServerNotFound(id.to_string()))
    }

    /// Get a server by ID and lock its row until `conn`'s transaction ends.
    pub async fn get_for_update<C>(&self, conn: &C, id: &str) -> AppResult<federated_server::Model>
    where
        C: ConnectionTrait,
    {
        FederatedServer::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ServerNotFound(id.to_string()))
    }

    /// Find a server by domain.
    pub async fn find_by_name(&self, server_name: &str) -> AppResult<Option<federated_server::Model>> {
        FederatedServer::find()
            .filter(federated_server::Column::ServerName.eq(server_name.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new server record.
    pub async fn create(
        &self,
        model: federated_server::ActiveModel,
    ) -> AppResult<federated_server::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e.sql_err(), &e))
    }

    /// Update a server record.
    pub async fn update(
        &self,
        model: federated_server::ActiveModel,
    ) -> AppResult<federated_server::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| write_error(e.sql_err(), &e))
    }

    /// Set the federation status of a server.
    ///
    /// Returns the number of rows changed (0 if the server does not exist).
    pub async fn set_status<C>(&self, conn: &C, id: &str, status: FederationStatus) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().fixed_offset();

        let result = FederatedServer::update_many()
            .col_expr(federated_server::Column::Status, Expr::value(status.as_str()))
            .col_expr(federated_server::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(federated_server::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// List servers, optionally filtered by a domain substring.
    ///
    /// Without a sort the rows come back in primary-key (creation) order.
    /// With a sort the primary key breaks ties.
    pub async fn find_page(
        &self,
        name_contains: Option<&str>,
        sort: Option<ServerSort>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<federated_server::Model>> {
        let mut query = Self::filtered(name_contains);

        if let Some(sort) = sort {
            query = query.order_by(sort.field.column(), sort.order());
        }

        query
            .order_by_asc(federated_server::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count servers, optionally filtered by a domain substring.
    pub async fn count(&self, name_contains: Option<&str>) -> AppResult<u64> {
        Self::filtered(name_contains)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn filtered(name_contains: Option<&str>) -> Select<FederatedServer> {
        let query = FederatedServer::find();
        match name_contains {
            Some(q) => query.filter(federated_server::Column::ServerName.contains(q.to_lowercase())),
            None => query,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_server(id: &str, server_name: &str) -> federated_server::Model {
        federated_server::Model {
            id: id.to_string(),
            server_name: server_name.to_string(),
            application_type: Some("bookwyrm".to_string()),
            application_version: None,
            status: FederationStatus::Federated,
            notes: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_sort_param_allow_list() {
        for name in ["created_date", "application_type", "server_name"] {
            let asc = ServerSort::from_param(name).unwrap();
            assert!(!asc.descending);
            assert_eq!(asc.as_param(), name);

            let desc = ServerSort::from_param(&format!("-{name}")).unwrap();
            assert!(desc.descending);
            assert_eq!(desc.field, asc.field);
            assert_eq!(desc.as_param(), format!("-{name}"));
        }
    }

    #[test]
    fn test_sort_param_rejects_other_values() {
        for raw in ["", "-", "id", "status", "--server_name", "server_name ", "Server_Name"] {
            assert_eq!(ServerSort::from_param(raw), None, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_unique_violation_becomes_form_error() {
        let err = DbErr::Custom("duplicate key".to_string());
        let violation = SqlErr::UniqueConstraintViolation(
            "duplicate key value violates unique constraint".to_string(),
        );

        match write_error(Some(violation), &err) {
            AppError::InvalidForm(fields) => {
                assert_eq!(fields["server_name"], vec![DUPLICATE_SERVER_NAME.to_string()]);
            }
            other => panic!("expected form error, got {other:?}"),
        }

        assert!(matches!(write_error(None, &err), AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<federated_server::Model>::new()])
                .into_connection(),
        );

        let repo = FederatedServerRepository::new(db);
        let result = repo.get_by_id("missing").await;

        match result {
            Err(AppError::ServerNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected ServerNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_page_returns_rows() {
        let s1 = create_test_server("s1", "a.example");
        let s2 = create_test_server("s2", "b.example");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = FederatedServerRepository::new(db);
        let sort = ServerSort::from_param("-server_name");
        let result = repo.find_page(None, sort, 15, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].server_name, "a.example");
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(31))
                }]])
                .into_connection(),
        );

        let repo = FederatedServerRepository::new(db);
        let count = repo.count(Some("Example")).await.unwrap();

        assert_eq!(count, 31);
    }

    #[tokio::test]
    async fn test_set_status_reports_rows_changed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FederatedServerRepository::new(Arc::clone(&db));
        let changed = repo
            .set_status(db.as_ref(), "s1", FederationStatus::Blocked)
            .await
            .unwrap();

        assert_eq!(changed, 1);
    }
}
