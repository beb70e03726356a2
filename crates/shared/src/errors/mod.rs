mod config;
mod error;
mod http;
mod service;

pub use self::config::ConfigError;
pub use self::error::ErrorResponse;
pub use self::http::{GENERIC_ERROR_MESSAGE, HttpError};
pub use self::service::ServiceError;
