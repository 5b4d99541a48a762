//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use bookwyrm_common::AppError;
use bookwyrm_db::entities::{group_permission::CONTROL_FEDERATION, user};

use crate::middleware::AppState;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// A user allowed to manage federated servers.
#[derive(Debug, Clone)]
pub struct ControlFederation(pub user::Model);

impl FromRequestParts<AppState> for ControlFederation {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if state
            .permission_service
            .has_permission(&user, CONTROL_FEDERATION)
            .await?
        {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden(format!(
                "{CONTROL_FEDERATION} permission required"
            )))
        }
    }
}
