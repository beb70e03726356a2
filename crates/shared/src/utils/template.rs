use askama::Template;
use prometheus_client::encoding::{EncodeLabelValue, LabelValueEncoder};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKind {
    Welcome,
    Verify,
    ResetPassword,
    Newsletter,
    OrderConfirmation,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Welcome => "welcome",
            TemplateKind::Verify => "verify",
            TemplateKind::ResetPassword => "resetPassword",
            TemplateKind::Newsletter => "newsletter",
            TemplateKind::OrderConfirmation => "orderConfirmation",
        }
    }
}

impl EncodeLabelValue for TemplateKind {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        encoder.write_str(self.as_str())
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated fields for one of the fixed email templates.
#[derive(Debug, Clone, PartialEq)]
pub enum EmailTemplateData {
    Welcome {
        name: String,
    },
    Verify {
        name: String,
        otp: String,
    },
    ResetPassword {
        name: String,
        otp: String,
    },
    Newsletter {
        subject: String,
        content: String,
        unsubscribe_url: String,
    },
    OrderConfirmation {
        name: String,
        order_number: String,
        total: f64,
    },
}

impl EmailTemplateData {
    pub fn kind(&self) -> TemplateKind {
        match self {
            EmailTemplateData::Welcome { .. } => TemplateKind::Welcome,
            EmailTemplateData::Verify { .. } => TemplateKind::Verify,
            EmailTemplateData::ResetPassword { .. } => TemplateKind::ResetPassword,
            EmailTemplateData::Newsletter { .. } => TemplateKind::Newsletter,
            EmailTemplateData::OrderConfirmation { .. } => TemplateKind::OrderConfirmation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "welcome.html", escape = "none")]
struct WelcomeTemplate<'a> {
    name: &'a str,
}

#[derive(Template)]
#[template(path = "verify_email.html", escape = "none")]
struct VerifyEmailTemplate<'a> {
    name: &'a str,
    otp: &'a str,
}

#[derive(Template)]
#[template(path = "reset_password.html", escape = "none")]
struct ResetPasswordTemplate<'a> {
    name: &'a str,
    otp: &'a str,
}

#[derive(Template)]
#[template(path = "newsletter.html", escape = "none")]
struct NewsletterTemplate<'a> {
    subject: &'a str,
    content: &'a str,
    unsubscribe_url: &'a str,
}

#[derive(Template)]
#[template(path = "order_confirmation.html", escape = "none")]
struct OrderConfirmationTemplate<'a> {
    name: &'a str,
    order_number: &'a str,
    total: f64,
}

pub fn render_email(data: &EmailTemplateData) -> Result<RenderedEmail, askama::Error> {
    debug!("📧 Rendering {} email template", data.kind());

    let rendered = match data {
        EmailTemplateData::Welcome { name } => WelcomeTemplate { name }
            .render()
            .map(|html| ("Welcome to NectarNosh Haven!".to_string(), html)),
        EmailTemplateData::Verify { name, otp } => VerifyEmailTemplate { name, otp }
            .render()
            .map(|html| ("Verify Your Email Address".to_string(), html)),
        EmailTemplateData::ResetPassword { name, otp } => ResetPasswordTemplate { name, otp }
            .render()
            .map(|html| ("Password Reset Request".to_string(), html)),
        EmailTemplateData::Newsletter {
            subject,
            content,
            unsubscribe_url,
        } => NewsletterTemplate {
            subject,
            content,
            unsubscribe_url,
        }
        .render()
        .map(|html| (subject.clone(), html)),
        EmailTemplateData::OrderConfirmation {
            name,
            order_number,
            total,
        } => OrderConfirmationTemplate {
            name,
            order_number,
            total: *total,
        }
        .render()
        .map(|html| (format!("Order Confirmed - #{order_number}"), html)),
    };

    match rendered {
        Ok((subject, html)) => Ok(RenderedEmail {
            subject,
            html,
            text: plain_text(data),
        }),
        Err(e) => {
            error!("❌ Failed to render {} email template: {}", data.kind(), e);
            Err(e)
        }
    }
}

/// Plain-text alternative sent next to the HTML body.
fn plain_text(data: &EmailTemplateData) -> String {
    const SIGNATURE: &str = "Best regards,\nThe NectarNosh Haven Team";

    match data {
        EmailTemplateData::Welcome { name } => format!(
            "Hi {name},\n\nThank you for joining NectarNosh Haven. We're excited to have you on board!\n\n{SIGNATURE}"
        ),
        EmailTemplateData::Verify { name, otp } => format!(
            "Hi {name},\n\nPlease use the following OTP to verify your email address: {otp}\n\nThis code will expire in 10 minutes. If you didn't request this, please ignore this email.\n\n{SIGNATURE}"
        ),
        EmailTemplateData::ResetPassword { name, otp } => format!(
            "Hi {name},\n\nWe received a request to reset your password. Use this OTP to proceed: {otp}\n\nThis code will expire in 10 minutes. If you didn't request this, please ignore this email.\n\n{SIGNATURE}"
        ),
        EmailTemplateData::Newsletter {
            subject,
            unsubscribe_url,
            ..
        } => format!("{subject}\n\nView this newsletter in an HTML-capable mail client.\n\nUnsubscribe: {unsubscribe_url}"),
        EmailTemplateData::OrderConfirmation {
            name,
            order_number,
            total,
        } => format!(
            "Hi {name},\n\nThank you for your order!\nOrder Number: #{order_number}\nOrder Total: ${total}\n\n{SIGNATURE}"
        ),
    }
}
