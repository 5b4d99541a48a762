//! API endpoints.

mod federation;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new().nest("/settings/federation", federation::router())
}
