use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;
use crate::types::push::{Subscription, VapidConfig};

mod http_trigger;

pub use http_trigger::HttpTrigger;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

/// Web Push transport: aes128gcm payload encryption plus a VAPID signature per request.
#[derive(Clone)]
pub struct WebPushSender {
    vapid: VapidConfig,
    client: Arc<web_push::WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig) -> Result<Self, web_push::WebPushError> {
        let client = web_push::WebPushClient::new()?;
        Ok(Self {
            vapid,
            client: Arc::new(client),
        })
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        message: &str,
    ) -> Result<(), web_push::WebPushError> {
        let subscription_info = web_push::SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );
        let mut builder = web_push::WebPushMessageBuilder::new(&subscription_info)?;
        builder.set_payload(web_push::ContentEncoding::Aes128Gcm, message.as_bytes());
        let mut signature_builder = web_push::VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &subscription_info,
        )?;
        signature_builder.add_claim("sub", self.vapid.subject.as_str());
        builder.set_vapid_signature(signature_builder.build()?);
        self.client.send(builder.build()?).await
    }
}

impl std::fmt::Debug for WebPushSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebPushSender")
            .field("subject", &self.vapid.subject)
            .finish_non_exhaustive()
    }
}

impl ports::PushSender for WebPushSender {
    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> ports::SendFuture<'a> {
        Box::pin(async move {
            self.deliver(subscription, message)
                .await
                .map_err(send_error_from_web_push)
        })
    }
}

/// Recovers the push service's status code from the client's error kinds.
fn send_error_from_web_push(err: web_push::WebPushError) -> ports::SendError {
    use web_push::WebPushError;

    let status = match &err {
        WebPushError::EndpointNotValid { .. } => Some(410),
        WebPushError::EndpointNotFound { .. } => Some(404),
        WebPushError::Unauthorized { .. } => Some(401),
        WebPushError::BadRequest { .. } => Some(400),
        WebPushError::PayloadTooLarge { .. } => Some(413),
        WebPushError::ServerError { .. } => Some(500),
        _ => None,
    };
    let message = err.to_string();
    match status {
        Some(status) => ports::SendError::Rejected { status, message },
        None => ports::SendError::Transport(message),
    }
}
