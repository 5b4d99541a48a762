//! Federated server entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a remote server is federated with or blocked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum FederationStatus {
    #[sea_orm(string_value = "federated")]
    #[default]
    Federated,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

impl FederationStatus {
    /// The other status. Toggling has no guards and no intermediate states.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Federated => Self::Blocked,
            Self::Blocked => Self::Federated,
        }
    }

    /// Activation state every user of a server in this status must have.
    ///
    /// This does not know why a user was inactive before: moving a server back
    /// to `federated` reactivates all of its users, including ones that were
    /// deactivated independently.
    #[must_use]
    pub const fn users_active(self) -> bool {
        matches!(self, Self::Federated)
    }

    /// Parse a storage name. Unknown names yield `None`.
    #[must_use]
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "federated" => Some(Self::Federated),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Wire/storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Federated => "federated",
            Self::Blocked => "blocked",
        }
    }
}

/// A remote server in the federation network.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "federated_server")]
pub struct Model {
    /// ULID, so primary-key order is creation order.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Domain of the server (unique, lower-cased).
    #[sea_orm(unique)]
    pub server_name: String,

    /// Software the server runs (e.g. "bookwyrm", "mastodon").
    #[sea_orm(nullable)]
    pub application_type: Option<String>,

    #[sea_orm(nullable)]
    pub application_version: Option<String>,

    pub status: FederationStatus,

    /// Moderator notes about this server.
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_between_states() {
        assert_eq!(FederationStatus::Federated.toggled(), FederationStatus::Blocked);
        assert_eq!(FederationStatus::Blocked.toggled(), FederationStatus::Federated);
        assert_eq!(
            FederationStatus::Federated.toggled().toggled(),
            FederationStatus::Federated
        );
    }

    #[test]
    fn test_users_active_follows_status() {
        assert!(FederationStatus::Federated.users_active());
        assert!(!FederationStatus::Blocked.users_active());
    }

    #[test]
    fn test_default_is_federated() {
        assert_eq!(FederationStatus::default(), FederationStatus::Federated);
        assert_eq!(FederationStatus::default().as_str(), "federated");
    }

    #[test]
    fn test_from_param_accepts_storage_names_only() {
        assert_eq!(
            FederationStatus::from_param("blocked"),
            Some(FederationStatus::Blocked)
        );
        assert_eq!(
            FederationStatus::from_param(FederationStatus::Federated.as_str()),
            Some(FederationStatus::Federated)
        );
        assert_eq!(FederationStatus::from_param("suspended"), None);
        assert_eq!(FederationStatus::from_param(""), None);
    }

    #[test]
    fn test_serde_names_match_storage() {
        assert_eq!(
            serde_json::to_string(&FederationStatus::Blocked).unwrap(),
            "\"blocked\""
        );
        let parsed: FederationStatus = serde_json::from_str("\"federated\"").unwrap();
        assert_eq!(parsed, FederationStatus::Federated);
    }
}
