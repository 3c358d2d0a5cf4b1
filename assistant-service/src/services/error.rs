use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Assistant '{0}' not found")]
    NotFound(String),

    #[error("Registry failure: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RegistryError {
    /// Maps to an HTTP error, labelling internal faults with what was being attempted.
    pub fn into_app_error(self, action: &'static str) -> AppError {
        match self {
            RegistryError::NotFound(name) => AppError::not_found("Assistant", name),
            RegistryError::Internal(e) => AppError::operation_failed(action, e),
        }
    }
}
