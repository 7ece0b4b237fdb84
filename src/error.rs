use crate::ports::StoreError;
use crate::push::DeliveryError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

pub(crate) const SEND_REQUIRED_FIELDS: &[&str] = &["title", "body"];
pub(crate) const SUBSCRIBE_REQUIRED_FIELDS: &[&str] = &["endpoint", "keys.p256dh", "keys.auth"];
pub(crate) const UNSUBSCRIBE_REQUIRED_FIELDS: &[&str] = &["endpoint"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingFields(&'static [&'static str]),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("No subscriptions found")]
    NoSubscriptions,
    #[error("Subscription not found")]
    SubscriptionNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Push notifications are not configured")]
    PushNotConfigured,
    #[error("Subscription store error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::InvalidPayload(_) => ApiError::MissingFields(SEND_REQUIRED_FIELDS),
            DeliveryError::NoRecipients => ApiError::NoSubscriptions,
            DeliveryError::Store(err) => ApiError::Store(err),
            DeliveryError::Serialize(err) => ApiError::Internal(err.to_string()),
            DeliveryError::RoundAborted(reason) => ApiError::Internal(reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MissingFields(required) => {
                tracing::debug!(?required, "missing required fields");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": self.to_string(), "required": required }),
                )
            }
            ApiError::InvalidBody(details) => {
                tracing::debug!(%details, "invalid request body");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "Invalid request body", "details": details }),
                )
            }
            ApiError::Unauthorized => {
                tracing::debug!("trigger authorization failed");
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            ApiError::NoSubscriptions => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": self.to_string(),
                    "message": "There are no devices subscribed to push notifications",
                }),
            ),
            ApiError::SubscriptionNotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": self.to_string() }),
            ),
            ApiError::PushNotConfigured => {
                tracing::warn!("push request rejected: VAPID credentials not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "VAPID keys not configured",
                        "message": "Set the VAPID private key, public key and subject",
                    }),
                )
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "subscription store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Subscription store unavailable", "details": err.to_string() }),
                )
            }
            ApiError::Internal(details) => {
                tracing::error!(%details, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
