use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Email configuration errors: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
