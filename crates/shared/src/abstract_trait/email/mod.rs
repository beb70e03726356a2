use crate::errors::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;

pub type DynEmailService = Arc<dyn EmailServiceTrait>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Hands the message to the transport and returns its delivery id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ServiceError>;

    /// `Ok(false)` when the transport handshake fails.
    async fn verify_connection(&self) -> Result<bool, ServiceError>;
}
