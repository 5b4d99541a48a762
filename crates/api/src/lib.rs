//! HTTP API layer for bookwyrm-rs.
//!
//! This crate provides the federation settings pages as a JSON API:
//!
//! - **Endpoints**: server directory, add/edit form, detail view, block toggle
//! - **Extractors**: authentication and the `control_federation` permission
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::Router;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// The API router with authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
