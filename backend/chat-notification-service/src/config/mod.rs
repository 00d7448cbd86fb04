use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub firebase: FirebaseConfig,
    pub kafka: KafkaConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Path to the service account JSON key
    pub credentials_path: String,
    pub users_collection: String,
    /// `host:port` of a Firestore emulator; profile reads go there when set
    pub firestore_emulator_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    pub message_topic: String,
    pub group_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub missing_sender_policy: MissingSenderPolicy,
}

/// What to do when the sender of a message has no profile record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSenderPolicy {
    /// Fail the invocation, surfacing the error to the event source
    #[default]
    Fail,
    /// End the invocation quietly without sending
    Skip,
}

impl MissingSenderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingSenderPolicy::Fail => "fail",
            MissingSenderPolicy::Skip => "skip",
        }
    }
}

impl FromStr for MissingSenderPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(MissingSenderPolicy::Fail),
            "skip" => Ok(MissingSenderPolicy::Skip),
            other => Err(AppError::Config(format!(
                "MISSING_SENDER_POLICY must be 'fail' or 'skip', got '{}'",
                other
            ))),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: env::var("APP_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .map_err(|e| AppError::Config(format!("APP_PORT: {}", e)))?,
            },
            firebase: FirebaseConfig {
                project_id: required("FIREBASE_PROJECT_ID")?,
                credentials_path: required("GOOGLE_APPLICATION_CREDENTIALS")?,
                users_collection: env::var("FIRESTORE_USERS_COLLECTION")
                    .unwrap_or_else(|_| "users".to_string()),
                firestore_emulator_host: env::var("FIRESTORE_EMULATOR_HOST")
                    .ok()
                    .filter(|host| !host.trim().is_empty()),
            },
            kafka: KafkaConfig {
                brokers: env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                message_topic: env::var("KAFKA_MESSAGE_TOPIC")
                    .unwrap_or_else(|_| "chat.message.created".to_string()),
                group_id: env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "chat-notification-service".to_string()),
            },
            dispatch: DispatchConfig {
                missing_sender_policy: env::var("MISSING_SENDER_POLICY")
                    .unwrap_or_else(|_| "fail".to_string())
                    .parse()?,
            },
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sender_policy_parse() {
        assert_eq!(
            "fail".parse::<MissingSenderPolicy>().unwrap(),
            MissingSenderPolicy::Fail
        );
        assert_eq!(
            " SKIP ".parse::<MissingSenderPolicy>().unwrap(),
            MissingSenderPolicy::Skip
        );
        assert!(matches!(
            "ignore".parse::<MissingSenderPolicy>(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_sender_policy_default_is_fail() {
        assert_eq!(MissingSenderPolicy::default(), MissingSenderPolicy::Fail);
        assert_eq!(MissingSenderPolicy::default().as_str(), "fail");
    }
}
