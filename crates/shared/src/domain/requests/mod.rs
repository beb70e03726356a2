mod email;

pub use self::email::{
    EmailJob, FieldKind, NewsletterRequest, OrderConfirmationRequest, OtpEmailRequest,
    RequestSchema, WelcomeEmailRequest, first_violation, parse_number, parse_request,
};
