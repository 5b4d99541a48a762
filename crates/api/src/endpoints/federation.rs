//! Federation settings endpoints.
//!
//! Every route requires the `control_federation` permission.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use bookwyrm_common::{AppError, AppResult};
use bookwyrm_core::{ServerDetail, ServerForm, ServerPage};
use bookwyrm_db::entities::federated_server;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::ControlFederation,
    middleware::AppState,
    response::{ApiResponse, FormResponse},
};

/// Query string of the server list.
///
/// `page` is kept as text so that junk values fall back to the first page
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
}

/// Server list with an empty add form.
#[derive(Serialize)]
pub struct ServerListResponse {
    pub servers: ServerPage,
    pub form: ServerForm,
}

type ServerFormResponse = FormResponse<ServerForm, federated_server::Model>;

fn detail_path(id: &str) -> String {
    format!("/settings/federation/{id}")
}

/// Show a page of known servers.
async fn list_servers(
    ControlFederation(_user): ControlFederation,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<ServerListResponse>> {
    let servers = match query.q.as_deref() {
        Some(q) => {
            state
                .federation_service
                .search(q, query.page.as_deref(), query.sort.as_deref())
                .await?
        }
        None => {
            state
                .federation_service
                .list(query.page.as_deref(), query.sort.as_deref())
                .await?
        }
    };

    Ok(ApiResponse::ok(ServerListResponse {
        servers,
        form: ServerForm::default(),
    }))
}

/// Empty add form.
async fn add_server_form(ControlFederation(_user): ControlFederation) -> ServerFormResponse {
    FormResponse::blank(ServerForm::default(), None)
}

/// Create a server from the submitted form.
async fn add_server(
    ControlFederation(user): ControlFederation,
    State(state): State<AppState>,
    Form(form): Form<ServerForm>,
) -> AppResult<Response> {
    match state.federation_service.upsert(None, form.clone()).await {
        Ok(server) => {
            tracing::info!(user_id = %user.id, server_id = %server.id, "Server added by moderator");
            Ok(Redirect::to(&detail_path(&server.id)).into_response())
        }
        Err(AppError::InvalidForm(errors)) => {
            Ok(FormResponse::<_, federated_server::Model>::rejected(form, errors, None)
                .into_response())
        }
        Err(e) => Err(e),
    }
}

/// Edit form pre-filled from the stored record.
async fn edit_server_form(
    ControlFederation(_user): ControlFederation,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ServerFormResponse> {
    let server = state.federation_service.get(&id).await?;
    Ok(FormResponse::blank(ServerForm::from_model(&server), Some(server)))
}

/// Update a server from the submitted form.
async fn edit_server(
    ControlFederation(user): ControlFederation,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ServerForm>,
) -> AppResult<Response> {
    match state.federation_service.upsert(Some(&id), form.clone()).await {
        Ok(server) => {
            tracing::info!(user_id = %user.id, server_id = %server.id, "Server edited by moderator");
            Ok(Redirect::to(&detail_path(&server.id)).into_response())
        }
        Err(AppError::InvalidForm(errors)) => {
            let server = state.federation_service.get(&id).await?;
            Ok(FormResponse::rejected(form, errors, Some(server)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Server detail: users, reports, follows, and blocks.
async fn server_detail(
    ControlFederation(_user): ControlFederation,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ServerDetail>> {
    let detail = state.moderation_service.detail(&id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Block a federated server or un-block a blocked one.
async fn toggle_server(
    ControlFederation(user): ControlFederation,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let server = state.moderation_service.toggle(&id).await?;
    tracing::info!(
        user_id = %user.id,
        server_id = %server.id,
        status = server.status.as_str(),
        "Federation status changed by moderator"
    );
    Ok(Redirect::to(&detail_path(&server.id)))
}

/// Create the federation settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_servers))
        .route("/add", get(add_server_form).post(add_server))
        .route("/{id}/edit", get(edit_server_form).post(edit_server))
        .route("/{id}", get(server_detail).post(toggle_server))
}
