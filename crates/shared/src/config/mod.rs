mod email;

pub use self::email::{EmailConfig, EmailProvider, ProviderSettings, SmtpCredentials};
