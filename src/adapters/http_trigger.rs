use crate::ports::{RoundTrigger, TriggerError, TriggerFuture};
use crate::types::delivery::DeliveryStats;
use crate::types::notification::NotificationPayload;

use serde::Deserialize;
use std::time::Duration;

/// Fires delivery rounds by calling a running server's `/push/send` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTrigger {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    stats: DeliveryStats,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl HttpTrigger {
    pub fn new(
        base_url: &str,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TriggerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TriggerError::Request(err.to_string()))?;
        Ok(Self {
            client,
            url: format!("{}/push/send", base_url.trim_end_matches('/')),
            secret,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RoundTrigger for HttpTrigger {
    fn fire<'a>(&'a self, payload: &'a NotificationPayload) -> TriggerFuture<'a> {
        Box::pin(async move {
            let mut request = self.client.post(&self.url).json(payload);
            if let Some(secret) = self.secret.as_deref() {
                request = request.bearer_auth(secret);
            }
            let response = request
                .send()
                .await
                .map_err(|err| TriggerError::Request(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = match response.json::<ErrorResponse>().await {
                    Ok(body) => body.error,
                    Err(_) => status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_string(),
                };
                return Err(TriggerError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: SendResponse = response
                .json()
                .await
                .map_err(|err| TriggerError::Request(err.to_string()))?;
            Ok(body.stats)
        })
    }
}
