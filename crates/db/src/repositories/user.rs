//! User repository.

use std::sync::Arc;

use crate::entities::{Following, User, following, user};
use bookwyrm_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
    sea_query::{Expr, Query, SelectStatement},
};

/// `SELECT id FROM user WHERE host IS NULL`
pub(crate) fn local_user_ids() -> SelectStatement {
    Query::select()
        .column(user::Column::Id)
        .from(User)
        .and_where(user::Column::Host.is_null())
        .to_owned()
}

/// `SELECT id FROM user WHERE federated_server_id = ?`
pub(crate) fn server_user_ids(server_id: &str) -> SelectStatement {
    Query::select()
        .column(user::Column::Id)
        .from(User)
        .and_where(user::Column::FederatedServerId.eq(server_id))
        .to_owned()
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    /// Find a user by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users belonging to a federated server.
    pub async fn find_by_server(&self, server_id: &str) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::FederatedServerId.eq(server_id))
            .order_by_asc(user::Column::UsernameLower)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users of a server that at least one local user follows.
    pub async fn find_by_server_followed_locally(
        &self,
        server_id: &str,
    ) -> AppResult<Vec<user::Model>> {
        let followed_by_local = Query::select()
            .column(following::Column::FolloweeId)
            .from(Following)
            .and_where(following::Column::FollowerId.in_subquery(local_user_ids()))
            .to_owned();

        User::find()
            .filter(user::Column::FederatedServerId.eq(server_id))
            .filter(user::Column::Id.in_subquery(followed_by_local))
            .order_by_asc(user::Column::UsernameLower)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users of a server that follow at least one local user.
    pub async fn find_by_server_following_local(
        &self,
        server_id: &str,
    ) -> AppResult<Vec<user::Model>> {
        let following_local = Query::select()
            .column(following::Column::FollowerId)
            .from(Following)
            .and_where(following::Column::FolloweeId.in_subquery(local_user_ids()))
            .to_owned();

        User::find()
            .filter(user::Column::FederatedServerId.eq(server_id))
            .filter(user::Column::Id.in_subquery(following_local))
            .order_by_asc(user::Column::UsernameLower)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set `is_active` on every user of a server in one statement.
    ///
    /// The filter is evaluated when the statement runs, so users attached to
    /// the server inside the same transaction are included. Local users have
    /// no server and are never touched.
    pub async fn set_active_for_server<C>(
        &self,
        conn: &C,
        server_id: &str,
        is_active: bool,
    ) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().fixed_offset();

        let result = User::update_many()
            .col_expr(user::Column::IsActive, Expr::value(is_active))
            .col_expr(user::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(user::Column::FederatedServerId.eq(server_id))
            .filter(user::Column::Host.is_not_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
