//! Permission checks backed by permission groups.

use bookwyrm_common::AppResult;
use bookwyrm_db::{entities::user, repositories::GroupRepository};

/// Answers whether a user may perform a guarded action.
#[derive(Clone)]
pub struct PermissionService {
    group_repo: GroupRepository,
}

impl PermissionService {
    /// Create a new permission service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// Whether `user` holds the permission `codename`.
    ///
    /// Inactive users hold nothing. Active superusers hold everything.
    /// Everyone else holds what their groups grant.
    pub async fn has_permission(&self, user: &user::Model, codename: &str) -> AppResult<bool> {
        if !user.is_active {
            return Ok(false);
        }
        if user.is_superuser {
            return Ok(true);
        }
        self.group_repo.user_has_permission(&user.id, codename).await
    }
}
