use crate::errors::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tracking error: {0}")]
    Tracking(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<askama::Error> for ServiceError {
    fn from(error: askama::Error) -> Self {
        ServiceError::Template(error.to_string())
    }
}
