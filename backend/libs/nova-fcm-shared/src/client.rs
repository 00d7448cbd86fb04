use uuid::Uuid;

use crate::auth::ServiceAccountTokenProvider;
use crate::errors::FCMError;
use crate::models::*;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Firebase Cloud Messaging Client
///
/// Sends notifications through the FCM HTTP v1 API. Authentication is
/// delegated to a shared [`ServiceAccountTokenProvider`].
#[derive(Clone)]
pub struct FCMClient {
    pub project_id: String,
    auth: ServiceAccountTokenProvider,
    http_client: reqwest::Client,
    endpoint: String,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `auth` - Token provider for the project's service account
    /// * `http_client` - Connection pool, usually shared with other Google clients
    pub fn new(
        project_id: String,
        auth: ServiceAccountTokenProvider,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            project_id,
            auth,
            http_client,
            endpoint: FCM_ENDPOINT.to_string(),
        }
    }

    /// Override the API base URL (emulators, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Send notification via FCM to a single device
    pub async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<FCMSendResult, FCMError> {
        if !self.validate_token(device_token) {
            return Err(FCMError::InvalidToken);
        }

        let access_token = self.auth.access_token().await?;
        let message = build_message(device_token, notification);

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&message)
            .send()
            .await
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let fcm_response: FcmApiResponse = response
                    .json()
                    .await
                    .map_err(|e| FCMError::ResponseParseError(e.to_string()))?;

                Ok(FCMSendResult {
                    message_id: fcm_response
                        .name
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                })
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(FCMError::ApiError(status.to_string(), error_text))
            }
        }
    }

    /// Validate device token format
    pub fn validate_token(&self, device_token: &str) -> bool {
        // FCM tokens are typically 100-200 characters
        !device_token.trim().is_empty() && device_token.len() <= 4096
    }
}

/// Map a notification onto the HTTP v1 message shape.
///
/// The legacy `sound` field has no top-level equivalent in v1; it is carried
/// in the platform-specific sections instead.
pub fn build_message(device_token: &str, notification: &PushNotification) -> FcmMessage {
    let (android, apns) = match notification.sound.as_deref() {
        Some(sound) => (
            Some(serde_json::json!({ "notification": { "sound": sound } })),
            Some(serde_json::json!({ "payload": { "aps": { "sound": sound } } })),
        ),
        None => (None, None),
    };

    FcmMessage {
        message: FcmMessageContent {
            token: device_token.to_string(),
            notification: FcmNotification {
                title: notification.title.clone(),
                body: notification.body.clone(),
            },
            android,
            apns,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> FCMClient {
        let creds = ServiceAccountKey {
            project_id: "test-project".to_string(),
            private_key_id: "key-id".to_string(),
            private_key: "private-key".to_string(),
            client_email: "test@test.iam.gserviceaccount.com".to_string(),
            client_id: "123456".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        };

        FCMClient::new(
            "test-project".to_string(),
            ServiceAccountTokenProvider::new(creds, reqwest::Client::new()),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_send_url() {
        let client = test_client();
        assert_eq!(
            client.send_url(),
            "https://fcm.googleapis.com/v1/projects/test-project/messages:send"
        );

        let client = test_client().with_endpoint("http://localhost:9099/");
        assert_eq!(
            client.send_url(),
            "http://localhost:9099/v1/projects/test-project/messages:send"
        );
    }

    #[test]
    fn test_validate_token() {
        let client = test_client();
        assert!(client.validate_token("tok123"));
        assert!(!client.validate_token(""));
        assert!(!client.validate_token("   "));
    }

    #[tokio::test]
    async fn test_send_rejects_empty_token_before_auth() {
        let client = test_client();
        let notification = PushNotification {
            title: "t".to_string(),
            body: "b".to_string(),
            sound: None,
        };

        let err = client.send("", &notification).await.unwrap_err();
        assert!(matches!(err, FCMError::InvalidToken));
    }

    #[test]
    fn test_build_message_with_sound() {
        let notification = PushNotification {
            title: "New message from Alice".to_string(),
            body: "hi".to_string(),
            sound: Some("default".to_string()),
        };

        let json = serde_json::to_value(build_message("tok123", &notification)).unwrap();
        assert_eq!(json["message"]["token"], "tok123");
        assert_eq!(json["message"]["notification"]["title"], "New message from Alice");
        assert_eq!(json["message"]["notification"]["body"], "hi");
        assert_eq!(json["message"]["android"]["notification"]["sound"], "default");
        assert_eq!(json["message"]["apns"]["payload"]["aps"]["sound"], "default");
    }

    #[test]
    fn test_build_message_without_sound_omits_platform_sections() {
        let notification = PushNotification {
            title: "t".to_string(),
            body: "b".to_string(),
            sound: None,
        };

        let json = serde_json::to_value(build_message("tok", &notification)).unwrap();
        assert!(json["message"].get("android").is_none());
        assert!(json["message"].get("apns").is_none());
    }
}
