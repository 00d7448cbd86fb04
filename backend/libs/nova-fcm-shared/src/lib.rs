/// Nova FCM Shared Library
///
/// Firebase access shared by the chat services:
/// - OAuth2 access tokens minted from a Google service account, cached until expiry
/// - Firebase Cloud Messaging (HTTP v1) delivery to a single device token
/// - Notification sound routed to both Android and APNs sections of the message

pub mod auth;
pub mod client;
pub mod errors;
pub mod models;

pub use auth::ServiceAccountTokenProvider;
pub use client::FCMClient;
pub use errors::FCMError;
pub use models::{FCMSendResult, PushNotification, ServiceAccountKey};
