use anyhow::{Context, Result};
use shared::config::EmailConfig;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub unsubscribe_url: String,
    pub rate_limit: RateLimitConfig,
    pub email: EmailConfig,
}

impl ServiceConfig {
    pub fn init() -> Result<Self> {
        let port = parse_or("PORT", 4000u16)?;

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?,
            window_seconds: parse_or("RATE_LIMIT_WINDOW_SECS", defaults.window_seconds)?,
        };

        let unsubscribe_url = std::env::var("UNSUBSCRIBE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "#".to_string());

        let email = EmailConfig::from_env().context("Failed to resolve email configuration")?;
        email.validate()?;

        Ok(Self {
            port,
            unsubscribe_url,
            rate_limit,
            email,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        _ => Ok(default),
    }
}
