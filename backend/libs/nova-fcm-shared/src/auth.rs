use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::FCMError;
use crate::models::{GoogleTokenResponse, JwtClaims, ServiceAccountKey, TokenCache};

/// Scope covering both Firestore and FCM
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Cached tokens are refreshed this many seconds before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Clone)]
enum TokenSource {
    ServiceAccount(Arc<ServiceAccountKey>),
    Static(String),
}

/// Google service-account token provider
///
/// Signs a JWT assertion with the service account key, exchanges it for an
/// OAuth2 access token and caches the token until shortly before expiry.
/// Cloning shares the cache.
#[derive(Clone)]
pub struct ServiceAccountTokenProvider {
    source: TokenSource,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl ServiceAccountTokenProvider {
    pub fn new(credentials: ServiceAccountKey, http_client: reqwest::Client) -> Self {
        Self {
            source: TokenSource::ServiceAccount(Arc::new(credentials)),
            token_cache: Arc::new(Mutex::new(None)),
            http_client,
        }
    }

    /// Fixed bearer token. The Firebase emulators accept `owner`.
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            token_cache: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    /// Load the service account JSON file (the `GOOGLE_APPLICATION_CREDENTIALS` format)
    pub async fn from_file(
        path: impl AsRef<Path>,
        http_client: reqwest::Client,
    ) -> Result<Self, FCMError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        let credentials: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;

        Ok(Self::new(credentials, http_client))
    }

    /// Get access token from service account (with caching)
    pub async fn access_token(&self) -> Result<String, FCMError> {
        let credentials = match &self.source {
            TokenSource::ServiceAccount(credentials) => credentials,
            TokenSource::Static(token) => return Ok(token.clone()),
        };

        let mut cache = self.token_cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Utc::now().timestamp() + REFRESH_MARGIN_SECS {
                return Ok(cached.access_token.clone());
            }
        }

        let assertion = signed_assertion(credentials)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FCMError::TokenRequestFailed(response.status().to_string()));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FCMError::TokenParseError(e.to_string()))?;

        tracing::debug!(
            client_email = %credentials.client_email,
            expires_in = token_response.expires_in,
            "refreshed Google access token"
        );

        *cache = Some(TokenCache {
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now().timestamp() + token_response.expires_in,
        });

        Ok(token_response.access_token)
    }
}

fn signed_assertion(credentials: &ServiceAccountKey) -> Result<String, FCMError> {
    let now = Utc::now();
    let claims = JwtClaims {
        iss: credentials.client_email.clone(),
        sub: credentials.client_email.clone(),
        scope: CLOUD_PLATFORM_SCOPE.to_string(),
        aud: credentials.token_uri.clone(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| FCMError::KeyParseError(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(credentials.private_key_id.clone());

    encode(&header, &claims, &encoding_key).map_err(|e| FCMError::JwtEncodeError(e.to_string()))
}
