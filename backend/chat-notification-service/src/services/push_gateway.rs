use async_trait::async_trait;
use nova_fcm_shared::{FCMClient, FCMError, PushNotification};

use crate::models::NotificationPayload;

/// Outbound push delivery
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver `payload` to one device; returns the provider's message id
    async fn send(&self, token: &str, payload: &NotificationPayload) -> Result<String, FCMError>;
}

/// [`PushGateway`] backed by Firebase Cloud Messaging
pub struct FcmPushGateway {
    client: FCMClient,
}

impl FcmPushGateway {
    pub fn new(client: FCMClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send(&self, token: &str, payload: &NotificationPayload) -> Result<String, FCMError> {
        let notification: PushNotification = payload.clone().into();
        let result = self.client.send(token, &notification).await?;
        Ok(result.message_id)
    }
}
