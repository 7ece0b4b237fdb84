use crate::error::{
    ApiError, Result, SEND_REQUIRED_FIELDS, SUBSCRIBE_REQUIRED_FIELDS, UNSUBSCRIBE_REQUIRED_FIELDS,
};
use crate::push as push_service;
use crate::state;
use crate::types::delivery::{DeliveryReport, DeliveryStats};
use crate::types::notification::NotificationPayload;
use crate::types::push::{NewSubscription, Subscription, SubscriptionKeys};

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

const UNKNOWN_USER_AGENT: &str = "Unknown";

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidBody(rejection.body_text())
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SendResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) stats: DeliveryStats,
    pub(crate) results: Vec<DeliveryReport>,
}

pub(crate) async fn push_send(
    State(state): State<state::AppState>,
    request: std::result::Result<Json<NotificationPayload>, JsonRejection>,
) -> Result<Json<SendResponse>> {
    let Json(payload) = request.map_err(invalid_body)?;
    payload
        .validate()
        .map_err(|_| ApiError::MissingFields(SEND_REQUIRED_FIELDS))?;
    let engine = state.engine.as_ref().ok_or(ApiError::PushNotConfigured)?;

    let summary = engine.run_round(&payload).await?;

    Ok(Json(SendResponse {
        success: true,
        message: "Notifications sent".to_string(),
        stats: summary.stats,
        results: summary.results,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscribeRequest {
    endpoint: Option<String>,
    keys: Option<SubscribeKeys>,
}

#[derive(Debug, Deserialize)]
struct SubscribeKeys {
    p256dh: Option<String>,
    auth: Option<String>,
}

impl SubscribeRequest {
    fn into_new_subscription(self, user_agent: String) -> Option<NewSubscription> {
        let endpoint = non_empty(self.endpoint)?;
        let keys = self.keys?;
        Some(NewSubscription {
            endpoint,
            keys: SubscriptionKeys {
                p256dh: non_empty(keys.p256dh)?,
                auth: non_empty(keys.auth)?,
            },
            user_agent: Some(user_agent),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) subscription_id: String,
}

pub(crate) async fn push_subscribe(
    State(state): State<state::AppState>,
    headers: HeaderMap,
    request: std::result::Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SubscribeResponse>> {
    let Json(request) = request.map_err(invalid_body)?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN_USER_AGENT)
        .to_string();
    let subscription = request
        .into_new_subscription(user_agent)
        .ok_or(ApiError::MissingFields(SUBSCRIBE_REQUIRED_FIELDS))?;

    let stored = state.store.upsert(subscription).await?;
    tracing::info!(id = %stored.id, endpoint = %stored.endpoint, "subscription saved");

    Ok(Json(SubscribeResponse {
        success: true,
        message: "Subscription saved successfully".to_string(),
        subscription_id: stored.id,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnsubscribeRequest {
    endpoint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UnsubscribeResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
}

pub(crate) async fn push_unsubscribe(
    State(state): State<state::AppState>,
    request: std::result::Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> Result<Json<UnsubscribeResponse>> {
    let Json(request) = request.map_err(invalid_body)?;
    let endpoint =
        non_empty(request.endpoint).ok_or(ApiError::MissingFields(UNSUBSCRIBE_REQUIRED_FIELDS))?;

    let removed = state.store.delete_by_endpoint(&endpoint).await?;
    if removed == 0 {
        return Err(ApiError::SubscriptionNotFound);
    }
    tracing::info!(%endpoint, "subscription removed");

    Ok(Json(UnsubscribeResponse {
        success: true,
        message: "Subscription removed successfully".to_string(),
    }))
}

/// Listing entry; encryption keys stay server-side.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionEntry {
    pub(crate) id: String,
    pub(crate) endpoint: String,
    pub(crate) user_agent: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

impl From<Subscription> for SubscriptionEntry {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            endpoint: subscription.endpoint,
            user_agent: subscription.user_agent,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ListSubscriptionsResponse {
    pub(crate) success: bool,
    pub(crate) count: usize,
    pub(crate) subscriptions: Vec<SubscriptionEntry>,
}

pub(crate) async fn push_list_subscriptions(
    State(state): State<state::AppState>,
) -> Result<Json<ListSubscriptionsResponse>> {
    let subscriptions: Vec<SubscriptionEntry> = state
        .store
        .list_all()
        .await?
        .into_iter()
        .map(SubscriptionEntry::from)
        .collect();

    Ok(Json(ListSubscriptionsResponse {
        success: true,
        count: subscriptions.len(),
        subscriptions,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub(crate) public_key: String,
}

pub(crate) async fn push_public_key(
    State(state): State<state::AppState>,
) -> Result<Json<PublicKeyResponse>> {
    if state.engine.is_none() {
        return Err(ApiError::PushNotConfigured);
    }
    let vapid = match push_service::load_vapid_config(&state.config) {
        push_service::VapidConfigStatus::Ready(vapid) => vapid,
        push_service::VapidConfigStatus::Incomplete | push_service::VapidConfigStatus::Missing => {
            return Err(ApiError::PushNotConfigured);
        }
    };

    Ok(Json(PublicKeyResponse {
        public_key: vapid.public_key,
    }))
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
