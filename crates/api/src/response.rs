//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookwyrm_common::FieldErrors;
use serde::Serialize;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A form to display, with the errors from its last submission.
///
/// Rendered as 200 when there are no errors and 400 otherwise, so a rejected
/// submission carries the submitted values back for correction.
#[derive(Debug, Serialize)]
pub struct FormResponse<F: Serialize, C: Serialize = ()> {
    pub form: F,
    pub errors: FieldErrors,
    /// What the form edits, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<C>,
}

impl<F: Serialize, C: Serialize> FormResponse<F, C> {
    /// A form with no errors.
    pub fn blank(form: F, context: Option<C>) -> Self {
        Self {
            form,
            errors: FieldErrors::new(),
            context,
        }
    }

    /// A rejected submission.
    pub const fn rejected(form: F, errors: FieldErrors, context: Option<C>) -> Self {
        Self {
            form,
            errors,
            context,
        }
    }
}

impl<F: Serialize, C: Serialize> IntoResponse for FormResponse<F, C> {
    fn into_response(self) -> Response {
        let status = if self.errors.is_empty() {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}
