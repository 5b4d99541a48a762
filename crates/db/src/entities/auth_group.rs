//! Permission group entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the group every superuser is placed in.
pub const ADMIN_GROUP: &str = "admin";
/// Name of the moderators' group.
pub const MODERATOR_GROUP: &str = "moderator";
/// Name of the catalogue editors' group.
pub const EDITOR_GROUP: &str = "editor";

/// A named set of permissions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_permission::Entity")]
    Permissions,

    #[sea_orm(has_many = "super::user_group::Entity")]
    Members,
}

impl Related<super::group_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permissions.def()
    }
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
