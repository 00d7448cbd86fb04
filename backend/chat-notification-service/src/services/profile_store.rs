/// Profile lookups against the user collection
///
/// The dispatcher only sees the [`ProfileStore`] trait; production wiring uses
/// [`FirestoreProfileStore`], which reads documents through the Firestore REST
/// API with the shared service-account credentials.
use async_trait::async_trait;
use nova_fcm_shared::ServiceAccountTokenProvider;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::UserProfile;

const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Whether `user_id` can name a single document in the user collection
pub fn is_document_id(user_id: &str) -> bool {
    !user_id.is_empty() && !user_id.contains('/')
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by user id; `Ok(None)` when no such document exists
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
}

pub struct FirestoreProfileStore {
    project_id: String,
    collection: String,
    auth: ServiceAccountTokenProvider,
    http_client: reqwest::Client,
    endpoint: String,
}

impl FirestoreProfileStore {
    pub fn new(
        project_id: String,
        collection: String,
        auth: ServiceAccountTokenProvider,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            project_id,
            collection,
            auth,
            http_client,
            endpoint: FIRESTORE_ENDPOINT.to_string(),
        }
    }

    /// Point at a Firestore emulator or test server
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn document_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.endpoint, self.project_id, self.collection, user_id
        )
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        if !is_document_id(user_id) {
            return Err(AppError::ProfileStore(format!(
                "invalid user id '{}'",
                user_id
            )));
        }

        let access_token = self.auth.access_token().await?;

        let response = self
            .http_client
            .get(self.document_url(user_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ProfileStore(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                debug!(user_id, "profile document not found");
                Ok(None)
            }
            status if status.is_success() => {
                let document: FirestoreDocument = response
                    .json()
                    .await
                    .map_err(|e| AppError::ProfileStore(format!("bad document: {}", e)))?;
                Ok(Some(document.into_profile()))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(AppError::ProfileStore(format!(
                    "Firestore API error: {} - {}",
                    status, error_text
                )))
            }
        }
    }
}

/// Firestore REST document; only the fields map is of interest
#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Typed Firestore value. Non-string values are kept opaque.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FirestoreValue {
    String {
        #[serde(rename = "stringValue")]
        string_value: String,
    },
    Other(serde_json::Value),
}

impl FirestoreValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FirestoreValue::String { string_value } => Some(string_value),
            FirestoreValue::Other(_) => None,
        }
    }
}

impl FirestoreDocument {
    pub fn into_profile(self) -> UserProfile {
        let field = |name: &str| {
            self.fields
                .get(name)
                .and_then(FirestoreValue::as_str)
                .map(str::to_string)
        };

        UserProfile {
            display_name: field("displayName"),
            fcm_token: field("fcmToken"),
        }
    }
}
