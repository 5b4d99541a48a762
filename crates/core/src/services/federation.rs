//! Federated server directory: listing, search, and the add/edit form.

use std::sync::LazyLock;

use bookwyrm_common::{AppError, AppResult};
use bookwyrm_db::{
    entities::federated_server::{self, FederationStatus},
    repositories::{DUPLICATE_SERVER_NAME, FederatedServerRepository, ServerSort},
};
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Domain with an optional port, lower-case only (input is lower-cased first).
static HOSTNAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?::[0-9]{1,5})?$",
    )
    .inspect_err(|e| tracing::error!(error = %e, "Hostname pattern failed to compile"))
    .ok()
});

fn validate_hostname(value: &str) -> Result<(), ValidationError> {
    let valid = HOSTNAME_RE
        .as_ref()
        .is_some_and(|re| re.is_match(value));
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("hostname");
        err.message = Some("Enter a valid domain name".into());
        Err(err)
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if FederationStatus::from_param(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("status");
        err.message = Some("Status must be \"federated\" or \"blocked\"".into());
        Err(err)
    }
}

/// Add/edit form for a federated server.
///
/// Submitted as `application/x-www-form-urlencoded`. Blank optional fields
/// are treated as absent and a missing status means `federated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ServerForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "Server name must be 1-255 characters"),
        custom(function = "validate_hostname")
    )]
    pub server_name: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Application type must be at most 255 characters"))]
    pub application_type: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Application version must be at most 255 characters"))]
    pub application_version: Option<String>,

    /// Kept as text so an unknown value is reported on the form.
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl ServerForm {
    /// Pre-fill the form from a stored record.
    #[must_use]
    pub fn from_model(server: &federated_server::Model) -> Self {
        Self {
            server_name: server.server_name.clone(),
            application_type: server.application_type.clone(),
            application_version: server.application_version.clone(),
            status: Some(server.status.as_str().to_string()),
            notes: server.notes.clone(),
        }
    }

    /// Trim every field, lower-case the domain, and drop blank optional fields.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            server_name: self.server_name.trim().to_lowercase(),
            application_type: blank_to_none(self.application_type),
            application_version: blank_to_none(self.application_version),
            status: blank_to_none(self.status).map(|v| v.to_lowercase()),
            notes: blank_to_none(self.notes),
        }
    }

    /// Submitted status, `federated` when absent or unrecognized.
    #[must_use]
    pub fn federation_status(&self) -> FederationStatus {
        self.status
            .as_deref()
            .and_then(FederationStatus::from_param)
            .unwrap_or_default()
    }
}

/// Interpret a raw `page` parameter. Missing, non-numeric, zero, and negative
/// values all mean the first page.
#[must_use]
pub fn normalize_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map_or(1, |p| p as u64)
}

/// One page of the server directory.
#[derive(Debug, Clone, Serialize)]
pub struct ServerPage {
    pub items: Vec<federated_server::Model>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    /// The sort actually applied, `None` when the default order was used.
    pub sort: Option<String>,
    /// The applied domain filter, if any.
    pub query: Option<String>,
}

/// Directory of known federated servers.
#[derive(Clone)]
pub struct FederationService {
    server_repo: FederatedServerRepository,
    page_length: u64,
}

impl FederationService {
    /// Create a new federation service.
    #[must_use]
    pub fn new(server_repo: FederatedServerRepository, page_length: u64) -> Self {
        Self {
            server_repo,
            page_length: page_length.max(1),
        }
    }

    /// List servers, one page at a time.
    ///
    /// `sort` outside the allow-list is ignored and the default
    /// (creation) order is used.
    pub async fn list(&self, page: Option<&str>, sort: Option<&str>) -> AppResult<ServerPage> {
        self.page_of(None, page, sort).await
    }

    /// List servers whose domain contains `query`. A blank query lists all.
    pub async fn search(
        &self,
        query: &str,
        page: Option<&str>,
        sort: Option<&str>,
    ) -> AppResult<ServerPage> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.list(page, sort).await;
        }
        self.page_of(Some(query), page, sort).await
    }

    async fn page_of(
        &self,
        query: Option<String>,
        page: Option<&str>,
        sort: Option<&str>,
    ) -> AppResult<ServerPage> {
        let page = normalize_page(page);
        let sort = sort.and_then(ServerSort::from_param);

        let total_items = self.server_repo.count(query.as_deref()).await?;
        let offset = (page - 1).saturating_mul(self.page_length);
        let items = if offset < total_items {
            self.server_repo
                .find_page(query.as_deref(), sort, self.page_length, offset)
                .await?
        } else {
            Vec::new()
        };

        tracing::debug!(page, total_items, returned = items.len(), "Listed federated servers");

        Ok(ServerPage {
            items,
            page,
            page_size: self.page_length,
            total_items,
            total_pages: total_items.div_ceil(self.page_length).max(1),
            sort: sort.map(|s| s.as_param()),
            query,
        })
    }

    /// Get a server by ID.
    pub async fn get(&self, id: &str) -> AppResult<federated_server::Model> {
        self.server_repo.get_by_id(id).await
    }

    /// Create (`id` is `None`) or update a server from a submitted form.
    ///
    /// Invalid input yields [`AppError::InvalidForm`] and nothing is written.
    pub async fn upsert(
        &self,
        id: Option<&str>,
        form: ServerForm,
    ) -> AppResult<federated_server::Model> {
        let existing = match id {
            Some(id) => Some(self.server_repo.get_by_id(id).await?),
            None => None,
        };

        let form = form.normalized();
        form.validate()?;

        if let Some(other) = self.server_repo.find_by_name(&form.server_name).await? {
            if existing.as_ref().is_none_or(|e| e.id != other.id) {
                return Err(AppError::field("server_name", DUPLICATE_SERVER_NAME));
            }
        }

        let now = chrono::Utc::now();
        let status = form.federation_status();

        match existing {
            Some(server) => {
                let mut model: federated_server::ActiveModel = server.into();
                model.server_name = Set(form.server_name);
                model.application_type = Set(form.application_type);
                model.application_version = Set(form.application_version);
                model.status = Set(status);
                model.notes = Set(form.notes);
                model.updated_at = Set(Some(now.into()));

                let updated = self.server_repo.update(model).await?;
                tracing::info!(server_id = %updated.id, server_name = %updated.server_name, "Updated federated server");
                Ok(updated)
            }
            None => {
                let model = federated_server::ActiveModel {
                    id: Set(self.server_repo.next_id()),
                    server_name: Set(form.server_name),
                    application_type: Set(form.application_type),
                    application_version: Set(form.application_version),
                    status: Set(status),
                    notes: Set(form.notes),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };

                let created = self.server_repo.create(model).await?;
                tracing::info!(server_id = %created.id, server_name = %created.server_name, "Added federated server");
                Ok(created)
            }
        }
    }
}
