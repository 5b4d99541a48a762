//! Permission group repository.

use std::sync::Arc;

use crate::entities::{AuthGroup, GroupPermission, UserGroup, auth_group, group_permission, user_group};
use bookwyrm_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::Query,
};

/// Repository for permission groups and their members.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<auth_group::Model>> {
        AuthGroup::find()
            .filter(auth_group::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a group by name, returning error if not found.
    pub async fn get_by_name(&self, name: &str) -> AppResult<auth_group::Model> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {name}")))
    }

    /// IDs of every member of a group.
    pub async fn member_ids(&self, group_id: &str) -> AppResult<Vec<String>> {
        let members = UserGroup::find()
            .filter(user_group::Column::GroupId.eq(group_id))
            .order_by_asc(user_group::Column::UserId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(members.into_iter().map(|m| m.user_id).collect())
    }

    /// Whether any of the user's groups grants a permission.
    pub async fn user_has_permission(&self, user_id: &str, codename: &str) -> AppResult<bool> {
        let groups_of_user = Query::select()
            .column(user_group::Column::GroupId)
            .from(UserGroup)
            .and_where(user_group::Column::UserId.eq(user_id))
            .to_owned();

        let grants = GroupPermission::find()
            .filter(group_permission::Column::Codename.eq(codename))
            .filter(group_permission::Column::GroupId.in_subquery(groups_of_user))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(grants > 0)
    }
}
