use crate::{
    middleware::{rate_limit::rate_limit_middleware, validate::SimpleValidatedJson},
    service::EmailDispatchService,
    state::AppState,
};
use axum::{
    Extension, Json, http::StatusCode, middleware, response::IntoResponse, routing::post,
};
use shared::{
    domain::{
        requests::{
            EmailJob, NewsletterRequest, OrderConfirmationRequest, OtpEmailRequest,
            WelcomeEmailRequest,
        },
        responses::MessageResponse,
    },
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;

#[derive(Debug, Clone)]
pub struct NewsletterSettings {
    pub unsubscribe_url: String,
}

async fn send_job(
    dispatcher: &EmailDispatchService,
    job: EmailJob,
    success_message: &str,
    failure_context: &str,
) -> Result<(StatusCode, Json<MessageResponse>), HttpError> {
    dispatcher.dispatch(&job).await.map_err(|e| {
        error!("Error sending {failure_context}: {e}");
        HttpError::from(e)
    })?;

    Ok((StatusCode::OK, Json(MessageResponse::success(success_message))))
}

#[utoipa::path(
    post,
    path = "/api/email/welcome",
    request_body = WelcomeEmailRequest,
    responses(
        (status = 200, description = "Welcome email sent", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Mail transport failure", body = ErrorResponse)
    ),
    tag = "Email"
)]
pub async fn send_welcome_email(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
    SimpleValidatedJson(body): SimpleValidatedJson<WelcomeEmailRequest>,
) -> Result<impl IntoResponse, HttpError> {
    send_job(
        &dispatcher,
        body.into_job(),
        "Welcome email sent successfully",
        "welcome email",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/email/verify",
    request_body = OtpEmailRequest,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Mail transport failure", body = ErrorResponse)
    ),
    tag = "Email"
)]
pub async fn send_verification_email(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
    SimpleValidatedJson(body): SimpleValidatedJson<OtpEmailRequest>,
) -> Result<impl IntoResponse, HttpError> {
    send_job(
        &dispatcher,
        body.into_verify_job(),
        "Verification email sent successfully",
        "verification email",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/email/reset-password",
    request_body = OtpEmailRequest,
    responses(
        (status = 200, description = "Reset password email sent", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Mail transport failure", body = ErrorResponse)
    ),
    tag = "Email"
)]
pub async fn send_password_reset_email(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
    SimpleValidatedJson(body): SimpleValidatedJson<OtpEmailRequest>,
) -> Result<impl IntoResponse, HttpError> {
    send_job(
        &dispatcher,
        body.into_reset_password_job(),
        "Reset password email sent successfully",
        "reset password email",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/email/newsletter",
    request_body = NewsletterRequest,
    responses(
        (status = 200, description = "Newsletter sent", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Mail transport failure", body = ErrorResponse)
    ),
    tag = "Email"
)]
pub async fn send_newsletter(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
    Extension(settings): Extension<NewsletterSettings>,
    SimpleValidatedJson(body): SimpleValidatedJson<NewsletterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    send_job(
        &dispatcher,
        body.into_job(&settings.unsubscribe_url),
        "Newsletter sent successfully",
        "newsletter",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/email/order-confirmation",
    request_body = OrderConfirmationRequest,
    responses(
        (status = 200, description = "Order confirmation sent", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Mail transport failure", body = ErrorResponse)
    ),
    tag = "Email"
)]
pub async fn send_order_confirmation(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
    SimpleValidatedJson(body): SimpleValidatedJson<OrderConfirmationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    send_job(
        &dispatcher,
        body.into_job(),
        "Order confirmation email sent successfully",
        "order confirmation",
    )
    .await
}

pub fn email_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let newsletter = NewsletterSettings {
        unsubscribe_url: app_state.unsubscribe_url.clone(),
    };

    OpenApiRouter::new()
        .route("/api/email/welcome", post(send_welcome_email))
        .route("/api/email/verify", post(send_verification_email))
        .route("/api/email/reset-password", post(send_password_reset_email))
        .route("/api/email/newsletter", post(send_newsletter))
        .route(
            "/api/email/order-confirmation",
            post(send_order_confirmation),
        )
        .route_layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(app_state.di_container.dispatcher.clone()))
        .layer(Extension(app_state.rate_limit.clone()))
        .layer(Extension(newsletter))
        .with_state(app_state)
}
