use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use shared::{
    abstract_trait::{EmailServiceTrait, OutgoingEmail},
    config::EmailConfig,
    errors::ServiceError,
};
use tracing::{error, info};
use uuid::Uuid;

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, ServiceError> {
        let settings = &config.settings;

        // Implicit TLS when `secure`, otherwise upgrade with STARTTLS if offered.
        let builder = if settings.secure {
            SmtpTransport::relay(&settings.host).map_err(|e| {
                error!("❌ Failed to create SMTP relay for {}: {}", settings.host, e);
                ServiceError::Transport(format!("Failed to create SMTP relay: {e}"))
            })?
        } else {
            let tls = TlsParameters::new(settings.host.clone()).map_err(|e| {
                ServiceError::Transport(format!("Invalid TLS parameters: {e}"))
            })?;
            SmtpTransport::builder_dangerous(&settings.host).tls(Tls::Opportunistic(tls))
        };

        let mut builder = builder.port(settings.port);
        if settings.requires_auth {
            builder = builder.credentials(Credentials::new(
                config.auth.user.clone(),
                config.auth.pass.clone(),
            ));
        }

        let from: Mailbox = config.from.parse().map_err(|e| {
            error!("❌ Invalid sender email format: {}", e);
            ServiceError::Internal(format!("Invalid sender email: {e}"))
        })?;

        info!(
            "📮 SMTP transport configured for {} ({}:{}, secure={})",
            config.provider.as_str(),
            settings.host,
            settings.port,
            settings.secure
        );

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<(Message, String), ServiceError> {
        let to: Mailbox = email.to.parse().map_err(|e| {
            error!("❌ Invalid recipient email: {}", e);
            ServiceError::Validation(format!("Invalid recipient email: {e}"))
        })?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain());

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.clone()));

        let message = match &email.text {
            Some(text) => builder.multipart(MultiPart::alternative_plain_html(
                text.clone(),
                email.html.clone(),
            )),
            None => builder.singlepart(SinglePart::html(email.html.clone())),
        }
        .map_err(|e| {
            error!("❌ Failed to build email: {}", e);
            ServiceError::Internal(format!("Failed to build email: {e}"))
        })?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl EmailServiceTrait for EmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ServiceError> {
        let (message, message_id) = self.build_message(email)?;

        match self.mailer.send(message).await {
            Ok(_) => {
                info!("✅ Email sent to {} (message id {})", email.to, message_id);
                Ok(message_id)
            }
            Err(e) => {
                error!("❌ Failed to send email to {}: {}", email.to, e);
                Err(ServiceError::Transport(format!("Failed to send email: {e}")))
            }
        }
    }

    async fn verify_connection(&self) -> Result<bool, ServiceError> {
        match self.mailer.test_connection().await {
            Ok(true) => {
                info!("SMTP connection verified successfully");
                Ok(true)
            }
            Ok(false) => {
                error!("SMTP connection verification failed: server did not answer NOOP");
                Ok(false)
            }
            Err(e) => {
                error!("SMTP connection verification failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::config::{EmailProvider, ProviderSettings, SmtpCredentials};

    fn config(from: &str) -> EmailConfig {
        EmailConfig {
            provider: EmailProvider::Custom,
            from: from.to_string(),
            auth: SmtpCredentials {
                user: "bot@shop.test".into(),
                pass: "secret".into(),
            },
            settings: ProviderSettings {
                host: "localhost".into(),
                port: 2525,
                secure: false,
                requires_auth: true,
            },
        }
    }

    #[tokio::test]
    async fn message_id_uses_sender_domain() {
        let service = EmailService::new(&config("Shop <hello@shop.test>")).unwrap();

        let (_, message_id) = service
            .build_message(&OutgoingEmail {
                to: "a@b.com".into(),
                subject: "Hi".into(),
                html: "<p>Hi</p>".into(),
                text: Some("Hi".into()),
            })
            .unwrap();

        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@shop.test>"));
    }

    #[tokio::test]
    async fn invalid_recipient_is_a_validation_error() {
        let service = EmailService::new(&config("hello@shop.test")).unwrap();

        let err = service
            .build_message(&OutgoingEmail {
                to: "nobody".into(),
                subject: "Hi".into(),
                html: "<p>Hi</p>".into(),
                text: None,
            })
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_sender_is_rejected() {
        assert!(EmailService::new(&config("not a mailbox")).is_err());
    }
}
