use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rejection reasons of store operations.
///
/// Every rejection is decided before the store is written to, so an error
/// never leaves a collection partially modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} '{id}' doesn't exist")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("bad email or password")]
    InvalidCredentials,
    #[error("account is blocked")]
    AccountBlocked,
    #[error("email '{0}' already registered")]
    EmailExists(String),
    #[error("current password doesn't match")]
    WrongOldPassword,
    #[error("bad {field}: {detail}")]
    Validation { field: &'static str, detail: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    #[inline]
    pub fn validation(field: &'static str, detail: impl ToString) -> StoreError {
        StoreError::Validation {
            field,
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Store(#[from] StoreError),

    // External errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
