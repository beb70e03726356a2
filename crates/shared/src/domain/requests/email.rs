use crate::utils::EmailTemplateData;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{borrow::Cow, collections::HashMap};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// JSON number or a numeric string.
    Number,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => parse_number(value).is_some(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
        }
    }
}

/// Declared fields in the order violations are reported.
pub trait RequestSchema {
    const FIELDS: &'static [(&'static str, FieldKind)];
}

/// A validated request ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailJob {
    pub to: String,
    pub data: EmailTemplateData,
}

#[derive(Debug, Deserialize, Validate, ToSchema, Clone)]
pub struct WelcomeEmailRequest {
    #[validate(
        required(message = "\"to\" is required"),
        length(min = 1, message = "\"to\" is not allowed to be empty"),
        email(message = "\"to\" must be a valid email"),
        custom(function = "validate_email_domain", message = "\"to\" must be a valid email")
    )]
    pub to: Option<String>,

    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,
}

impl RequestSchema for WelcomeEmailRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] =
        &[("to", FieldKind::String), ("name", FieldKind::String)];
}

impl WelcomeEmailRequest {
    pub fn into_job(self) -> EmailJob {
        EmailJob {
            to: self.to.unwrap_or_default(),
            data: EmailTemplateData::Welcome {
                name: self.name.unwrap_or_default(),
            },
        }
    }
}

/// Body shared by the verification and password reset endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema, Clone)]
pub struct OtpEmailRequest {
    #[validate(
        required(message = "\"to\" is required"),
        length(min = 1, message = "\"to\" is not allowed to be empty"),
        email(message = "\"to\" must be a valid email"),
        custom(function = "validate_email_domain", message = "\"to\" must be a valid email")
    )]
    pub to: Option<String>,

    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "\"otp\" is required"),
        length(equal = 6, message = "\"otp\" length must be 6 characters long")
    )]
    pub otp: Option<String>,
}

impl RequestSchema for OtpEmailRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("to", FieldKind::String),
        ("name", FieldKind::String),
        ("otp", FieldKind::String),
    ];
}

impl OtpEmailRequest {
    pub fn into_verify_job(self) -> EmailJob {
        EmailJob {
            to: self.to.unwrap_or_default(),
            data: EmailTemplateData::Verify {
                name: self.name.unwrap_or_default(),
                otp: self.otp.unwrap_or_default(),
            },
        }
    }

    pub fn into_reset_password_job(self) -> EmailJob {
        EmailJob {
            to: self.to.unwrap_or_default(),
            data: EmailTemplateData::ResetPassword {
                name: self.name.unwrap_or_default(),
                otp: self.otp.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema, Clone)]
pub struct NewsletterRequest {
    #[validate(
        required(message = "\"to\" is required"),
        length(min = 1, message = "\"to\" is not allowed to be empty"),
        email(message = "\"to\" must be a valid email"),
        custom(function = "validate_email_domain", message = "\"to\" must be a valid email")
    )]
    pub to: Option<String>,

    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "\"subject\" is required"),
        length(min = 1, message = "\"subject\" is not allowed to be empty")
    )]
    pub subject: Option<String>,

    #[validate(
        required(message = "\"content\" is required"),
        length(min = 1, message = "\"content\" is not allowed to be empty")
    )]
    pub content: Option<String>,
}

impl RequestSchema for NewsletterRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("to", FieldKind::String),
        ("name", FieldKind::String),
        ("subject", FieldKind::String),
        ("content", FieldKind::String),
    ];
}

impl NewsletterRequest {
    pub fn into_job(self, unsubscribe_url: &str) -> EmailJob {
        EmailJob {
            to: self.to.unwrap_or_default(),
            data: EmailTemplateData::Newsletter {
                subject: self.subject.unwrap_or_default(),
                content: self.content.unwrap_or_default(),
                unsubscribe_url: unsubscribe_url.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema, Clone)]
pub struct OrderConfirmationRequest {
    #[validate(
        required(message = "\"to\" is required"),
        length(min = 1, message = "\"to\" is not allowed to be empty"),
        email(message = "\"to\" must be a valid email"),
        custom(function = "validate_email_domain", message = "\"to\" must be a valid email")
    )]
    pub to: Option<String>,

    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "\"orderNumber\" is required"),
        length(min = 1, message = "\"orderNumber\" is not allowed to be empty")
    )]
    #[serde(rename = "orderNumber")]
    pub order_number: Option<String>,

    #[validate(custom(function = "validate_total"))]
    #[serde(default)]
    #[schema(value_type = f64)]
    pub total: Value,
}

impl RequestSchema for OrderConfirmationRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("to", FieldKind::String),
        ("name", FieldKind::String),
        ("orderNumber", FieldKind::String),
        ("total", FieldKind::Number),
    ];
}

impl OrderConfirmationRequest {
    pub fn into_job(self) -> EmailJob {
        EmailJob {
            to: self.to.unwrap_or_default(),
            data: EmailTemplateData::OrderConfirmation {
                name: self.name.unwrap_or_default(),
                order_number: self.order_number.unwrap_or_default(),
                total: parse_number(&self.total).unwrap_or_default(),
            },
        }
    }
}

/// Accepts JSON numbers and numeric strings.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

fn validate_total(total: &Value) -> Result<(), ValidationError> {
    if total.is_null() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed("\"total\" is required"))
        );
    }

    match parse_number(total) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("number")
            .with_message(Cow::Borrowed("\"total\" must be a number"))),
    }
}

/// Rejects single-label domains and non-alphabetic top-level domains.
fn validate_email_domain(to: &str) -> Result<(), ValidationError> {
    let valid = to.rsplit_once('@').is_some_and(|(_, domain)| {
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2
            && labels.iter().all(|label| !label.is_empty())
            && labels
                .last()
                .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
    });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("\"to\" must be a valid email")))
    }
}

fn field_violation(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|errs| errs.first())
        .map(|err| match &err.message {
            Some(message) => message.to_string(),
            None => format!("\"{field}\" is invalid"),
        })
}

/// Message of the first failing field in schema order.
pub fn first_violation(errors: &ValidationErrors, fields: &[&str]) -> String {
    fields
        .iter()
        .find_map(|field| field_violation(errors, field))
        .or_else(|| {
            errors
                .field_errors()
                .keys()
                .find_map(|field| field_violation(errors, field))
        })
        .unwrap_or_else(|| "Validation failed".to_string())
}

/// Checks a JSON body against `T`'s schema. Declared fields are checked in
/// order (type first, then rules); unknown keys are reported after them.
pub fn parse_request<T>(body: Value) -> Result<T, String>
where
    T: DeserializeOwned + Validate + RequestSchema,
{
    let Value::Object(mut fields) = body else {
        return Err("\"value\" must be of type object".to_string());
    };

    let mut type_errors: HashMap<&str, String> = HashMap::new();
    for &(name, kind) in T::FIELDS {
        if fields.get(name).is_some_and(|value| !kind.accepts(value)) {
            fields.remove(name);
            type_errors.insert(name, format!("\"{name}\" must be a {}", kind.as_str()));
        }
    }

    let unknown: Vec<String> = fields
        .keys()
        .filter(|key| !T::FIELDS.iter().any(|(name, _)| *name == key.as_str()))
        .cloned()
        .collect();
    let declared: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !unknown.contains(key))
        .collect();

    let request: T = serde_json::from_value(Value::Object(declared)).map_err(|e| e.to_string())?;
    let errors = request.validate().err();

    for (name, _) in T::FIELDS {
        if let Some(message) = type_errors.remove(name) {
            return Err(message);
        }
        if let Some(message) = errors.as_ref().and_then(|e| field_violation(e, name)) {
            return Err(message);
        }
    }

    if let Some(key) = unknown.first() {
        return Err(format!("\"{key}\" is not allowed"));
    }

    match errors {
        Some(errors) => {
            let names: Vec<&str> = T::FIELDS.iter().map(|(name, _)| *name).collect();
            Err(first_violation(&errors, &names))
        }
        None => Ok(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation<T>(body: Value) -> Option<String>
    where
        T: DeserializeOwned + Validate + RequestSchema,
    {
        parse_request::<T>(body).err()
    }

    #[test]
    fn welcome_requires_recipient_first() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({})).as_deref(),
            Some("\"to\" is required")
        );
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "a@b.com" })).as_deref(),
            Some("\"name\" is required")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "not-an-email", "name": "Jo" }))
                .as_deref(),
            Some("\"to\" must be a valid email")
        );
    }

    #[test]
    fn email_domain_needs_a_dotted_alphabetic_tld() {
        for to in ["a@localhost", "a@shop.123", "a@shop.", "a@.com"] {
            assert_eq!(
                violation::<WelcomeEmailRequest>(json!({ "to": to, "name": "Jo" })).as_deref(),
                Some("\"to\" must be a valid email"),
                "{to} was accepted"
            );
        }

        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "jo@mail.shop.co", "name": "Jo" })),
            None
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "a@b.com", "name": "" })).as_deref(),
            Some("\"name\" is not allowed to be empty")
        );
    }

    #[test]
    fn otp_must_be_exactly_six_characters() {
        for otp in ["12345", "1234567"] {
            assert_eq!(
                violation::<OtpEmailRequest>(json!({ "to": "a@b.com", "name": "Jo", "otp": otp }))
                    .as_deref(),
                Some("\"otp\" length must be 6 characters long")
            );
        }

        assert_eq!(
            violation::<OtpEmailRequest>(json!({ "to": "a@b.com", "name": "Jo", "otp": "123456" })),
            None
        );
    }

    #[test]
    fn wrong_types_are_reported_in_field_order() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": 5, "name": "Jo" })).as_deref(),
            Some("\"to\" must be a string")
        );
        assert_eq!(
            violation::<OtpEmailRequest>(json!({ "to": "a@b.com", "name": "Jo", "otp": 123456 }))
                .as_deref(),
            Some("\"otp\" must be a string")
        );
        assert_eq!(
            violation::<OtpEmailRequest>(json!({ "to": "bad", "name": null, "otp": 1 }))
                .as_deref(),
            Some("\"to\" must be a valid email")
        );
    }

    #[test]
    fn unknown_keys_are_reported_after_declared_fields() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "bad", "name": "Jo", "extra": 1 }))
                .as_deref(),
            Some("\"to\" must be a valid email")
        );
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!({ "to": "a@b.com", "name": "Jo", "extra": 1 }))
                .as_deref(),
            Some("\"extra\" is not allowed")
        );
    }

    #[test]
    fn body_must_be_an_object() {
        assert_eq!(
            violation::<WelcomeEmailRequest>(json!(["a@b.com"])).as_deref(),
            Some("\"value\" must be of type object")
        );
    }

    #[test]
    fn total_accepts_numbers_and_numeric_strings() {
        let base = |total: Value| json!({ "to": "a@b.com", "name": "Jo", "orderNumber": "1", "total": total });

        assert_eq!(violation::<OrderConfirmationRequest>(base(json!(49.99))), None);
        assert_eq!(violation::<OrderConfirmationRequest>(base(json!("49.99"))), None);
        assert_eq!(
            violation::<OrderConfirmationRequest>(base(json!("lots"))).as_deref(),
            Some("\"total\" must be a number")
        );
        assert_eq!(
            violation::<OrderConfirmationRequest>(base(json!(true))).as_deref(),
            Some("\"total\" must be a number")
        );
        assert_eq!(
            violation::<OrderConfirmationRequest>(
                json!({ "to": "a@b.com", "name": "Jo", "orderNumber": "1" })
            )
            .as_deref(),
            Some("\"total\" is required")
        );
    }

    #[test]
    fn order_job_carries_converted_total() {
        let request = parse_request::<OrderConfirmationRequest>(
            json!({ "to": "a@b.com", "name": "Jo", "orderNumber": "123", "total": "49.99" }),
        )
        .unwrap();

        assert_eq!(
            request.into_job(),
            EmailJob {
                to: "a@b.com".into(),
                data: EmailTemplateData::OrderConfirmation {
                    name: "Jo".into(),
                    order_number: "123".into(),
                    total: 49.99,
                },
            }
        );
    }
}
