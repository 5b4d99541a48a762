//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub username: String,

    pub username_lower: String,

    /// NULL = local user, Some(host) = remote user
    #[sea_orm(nullable)]
    pub host: Option<String>,

    /// Server a remote user belongs to
    #[sea_orm(nullable, indexed)]
    pub federated_server_id: Option<String>,

    /// Access token (local users only)
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Inactive users cannot sign in and their activities are ignored
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Superusers hold every permission
    #[sea_orm(default_value = false)]
    pub is_superuser: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this account lives on this instance.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.host.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::federated_server::Entity",
        from = "Column::FederatedServerId",
        to = "super::federated_server::Column::Id",
        on_delete = "SetNull"
    )]
    FederatedServer,

    #[sea_orm(has_many = "super::user_group::Entity")]
    Groups,
}

impl Related<super::federated_server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FederatedServer.def()
    }
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
