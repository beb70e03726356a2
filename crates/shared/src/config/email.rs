use crate::errors::ConfigError;
use tracing::warn;

const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub requires_auth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Gmail,
    Namecheap,
    Outlook,
    Yahoo,
    Cpanel,
    Custom,
}

impl EmailProvider {
    /// Unknown or empty names resolve to `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "gmail" => EmailProvider::Gmail,
            "namecheap" => EmailProvider::Namecheap,
            "outlook" => EmailProvider::Outlook,
            "yahoo" => EmailProvider::Yahoo,
            "cpanel" => EmailProvider::Cpanel,
            "custom" | "" => EmailProvider::Custom,
            other => {
                warn!("Unknown EMAIL_PROVIDER '{other}', falling back to custom");
                EmailProvider::Custom
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::Namecheap => "namecheap",
            EmailProvider::Outlook => "outlook",
            EmailProvider::Yahoo => "yahoo",
            EmailProvider::Cpanel => "cpanel",
            EmailProvider::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from: String,
    pub auth: SmtpCredentials,
    pub settings: ProviderSettings,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key lookup. Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let provider = EmailProvider::from_name(&var("EMAIL_PROVIDER").unwrap_or_default());

        let port = match var("SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "SMTP_PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_SMTP_PORT,
        };
        let secure = var("SMTP_SECURE").as_deref() == Some("true");

        let settings = match provider {
            EmailProvider::Gmail => preset("smtp.gmail.com", 465, true),
            EmailProvider::Namecheap => preset("mail.privateemail.com", 587, false),
            EmailProvider::Outlook => preset("smtp.office365.com", 587, false),
            EmailProvider::Yahoo => preset("smtp.mail.yahoo.com", 587, false),
            EmailProvider::Cpanel => ProviderSettings {
                host: var("SMTP_HOST").unwrap_or_else(|| "mail.domain.com".to_string()),
                port,
                secure,
                requires_auth: true,
            },
            EmailProvider::Custom => ProviderSettings {
                host: var("SMTP_HOST").unwrap_or_default(),
                port,
                secure,
                requires_auth: true,
            },
        };

        let user = var("SMTP_USER").unwrap_or_default();
        let pass = var("SMTP_PASS").unwrap_or_default();
        let from = var("EMAIL_FROM").unwrap_or_else(|| user.clone());

        Ok(Self {
            provider,
            from,
            auth: SmtpCredentials { user, pass },
            settings,
        })
    }

    /// Reports every missing field at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.from.is_empty() {
            errors.push("EMAIL_FROM is required".to_string());
        }

        if self.settings.requires_auth {
            if self.auth.user.is_empty() {
                errors.push("SMTP_USER is required".to_string());
            }
            if self.auth.pass.is_empty() {
                errors.push("SMTP_PASS is required".to_string());
            }
        }

        if self.provider == EmailProvider::Custom && self.settings.host.is_empty() {
            errors.push("SMTP_HOST is required for custom provider".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(errors))
        }
    }
}

fn preset(host: &str, port: u16, secure: bool) -> ProviderSettings {
    ProviderSettings {
        host: host.to_string(),
        port,
        secure,
        requires_auth: true,
    }
}
