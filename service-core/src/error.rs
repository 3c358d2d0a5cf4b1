use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("{resource} not found: {name}")]
    NotFound { resource: &'static str, name: String },

    /// A registry operation failed for a reason the caller cannot fix.
    #[error("{action}: {cause}")]
    OperationFailed {
        action: &'static str,
        cause: anyhow::Error,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: &'static str, name: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            name: name.into(),
        }
    }

    pub fn operation_failed(action: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        AppError::OperationFailed {
            action,
            cause: cause.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::OperationFailed { .. } => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// JSON body for every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Name of the assistant a not-found error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            assistant_name: None,
            validation_errors: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Flattens validator output into one message per field, keyed by the
/// camelCase JSON name of the field.
///
/// The first failing rule wins; rules without a message fall back to their code.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (json_field_name(&field), message)
            })
        })
        .collect()
}

/// `response_text` -> `responseText`. validator reports Rust field names and
/// ignores serde renames.
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = !name.is_empty();
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationError(err) => {
                let fields = field_messages(&err);
                let summary = fields
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect::<Vec<_>>()
                    .join("; ");
                ErrorResponse {
                    validation_errors: Some(fields),
                    ..ErrorResponse::new("Validation failed").with_details(summary)
                }
            }
            AppError::BadRequest(err) => {
                ErrorResponse::new("Invalid request body").with_details(err.to_string())
            }
            AppError::NotFound { resource, name } => ErrorResponse {
                assistant_name: Some(name.clone()),
                ..ErrorResponse::new(format!("{} not found", resource)).with_details(format!(
                    "{} with name '{}' does not exist",
                    resource, name
                ))
            },
            AppError::OperationFailed { action, cause } => {
                tracing::error!(error = %cause, action, "Registry operation failed");
                ErrorResponse::new(action).with_details(cause.to_string())
            }
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Unhandled internal error");
                ErrorResponse::new("Internal server error")
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                ErrorResponse::new("Configuration error")
            }
        };

        (status, Json(body)).into_response()
    }
}
