//! Push delivery to subscription endpoints

use async_trait::async_trait;
use journal::Subscription;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::error::DeliveryError;
use crate::reminder::ReminderMessage;

/// Upper bound on one delivery attempt
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one message to one subscriber
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn deliver(
        &self,
        subscription: &Subscription,
        message: &ReminderMessage,
    ) -> Result<(), DeliveryError>;
}

/// Posts the message as JSON to the subscription endpoint
pub struct HttpPushProvider {
    client: reqwest::Client,
}

impl HttpPushProvider {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Provider around a preconfigured `reqwest::Client`
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushProvider for HttpPushProvider {
    async fn deliver(
        &self,
        subscription: &Subscription,
        message: &ReminderMessage,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&subscription.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;

        let status = response.status();
        debug!("Push to {} answered {}", subscription.endpoint, status);

        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(DeliveryError::Gone),
            s if s.is_success() => Ok(()),
            s => Err(DeliveryError::Failed(format!("HTTP {}", s.as_u16()))),
        }
    }
}
