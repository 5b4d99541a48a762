//! Permissions granted by a group.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Manage federated servers (list, edit, block).
pub const CONTROL_FEDERATION: &str = "control_federation";
/// Change site-wide settings.
pub const EDIT_INSTANCE_SETTINGS: &str = "edit_instance_settings";
/// Move users between groups.
pub const SET_USER_GROUP: &str = "set_user_group";
/// Issue registration invites.
pub const CREATE_INVITES: &str = "create_invites";
/// Suspend or delete accounts.
pub const MODERATE_USER: &str = "moderate_user";
/// Remove statuses.
pub const MODERATE_POST: &str = "moderate_post";
/// Edit catalogue records.
pub const EDIT_BOOK: &str = "edit_book";

/// One permission codename granted by one group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub codename: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auth_group::Entity",
        from = "Column::GroupId",
        to = "super::auth_group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::auth_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
