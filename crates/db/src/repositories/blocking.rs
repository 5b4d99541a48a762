//! Blocking repository.

use std::sync::Arc;

use crate::entities::{Blocking, blocking};
use crate::repositories::user::{local_user_ids, server_user_ids};
use bookwyrm_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Blocking repository for database operations.
#[derive(Clone)]
pub struct BlockingRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockingRepository {
    /// Create a new blocking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Blocks between local users and the users of a federated server,
    /// in either direction.
    pub async fn find_between_server_and_local(
        &self,
        server_id: &str,
    ) -> AppResult<Vec<blocking::Model>> {
        let local_blocks_remote = Condition::all()
            .add(blocking::Column::BlockerId.in_subquery(local_user_ids()))
            .add(blocking::Column::BlockeeId.in_subquery(server_user_ids(server_id)));
        let remote_blocks_local = Condition::all()
            .add(blocking::Column::BlockerId.in_subquery(server_user_ids(server_id)))
            .add(blocking::Column::BlockeeId.in_subquery(local_user_ids()));

        Blocking::find()
            .filter(
                Condition::any()
                    .add(local_blocks_remote)
                    .add(remote_blocks_local),
            )
            .order_by_desc(blocking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
