//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use bookwyrm_common::Config;
use bookwyrm_core::{FederationService, PermissionService, ServerModerationService, UserService};
use bookwyrm_db::repositories::{
    BlockingRepository, FederatedServerRepository, GroupRepository, ReportRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub permission_service: PermissionService,
    pub federation_service: FederationService,
    pub moderation_service: ServerModerationService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let server_repo = FederatedServerRepository::new(Arc::clone(&db));
        let user_repo = UserRepository::new(Arc::clone(&db));
        let report_repo = ReportRepository::new(Arc::clone(&db));
        let blocking_repo = BlockingRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(db);

        Self {
            user_service: UserService::new(user_repo.clone()),
            permission_service: PermissionService::new(group_repo),
            federation_service: FederationService::new(
                server_repo.clone(),
                config.federation.page_length,
            ),
            moderation_service: ServerModerationService::new(
                server_repo,
                user_repo,
                report_repo,
                blocking_repo,
            ),
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Requests without a valid token pass through
/// unauthenticated; guarded handlers reject them.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Rejected bearer token"),
        }
    }

    next.run(req).await
}
