use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fallback display name when the sender has none
pub const DEFAULT_DISPLAY_NAME: &str = "Someone";
/// Body used for messages without text (image attachments)
pub const IMAGE_MESSAGE_BODY: &str = "Sent an image";
pub const DEFAULT_SOUND: &str = "default";

/// Separator between the two participant ids of a conversation
pub const CONVERSATION_ID_SEPARATOR: char = '_';

/// Chat message record as written by the clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// User profile record, read-only here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

impl UserProfile {
    /// Delivery token, if present and non-empty
    pub fn delivery_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn display_name_or_default(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Notification shown on the recipient's device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub sound: String,
}

impl NotificationPayload {
    pub fn for_message(sender_name: &str, message: &MessageRecord) -> Self {
        let body = message
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(IMAGE_MESSAGE_BODY);

        Self {
            title: format!("New message from {}", sender_name),
            body: body.to_string(),
            sound: DEFAULT_SOUND.to_string(),
        }
    }
}

impl From<NotificationPayload> for nova_fcm_shared::PushNotification {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            title: payload.title,
            body: payload.body,
            sound: Some(payload.sound),
        }
    }
}

/// "Document created" event for a chat message.
///
/// `document` is the full document path, `chats/{chatId}/messages/{messageId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub document: String,
    #[serde(default)]
    pub data: MessageRecord,
}

impl MessageCreatedEvent {
    pub fn new(chat_id: &str, message_id: &str, data: MessageRecord) -> Self {
        Self {
            document: format!("chats/{}/messages/{}", chat_id, message_id),
            data,
        }
    }

    /// Split the document path into `(chat_id, message_id)`
    pub fn path_params(&self) -> Result<(&str, &str), AppError> {
        let segments: Vec<&str> = self.document.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["chats", chat_id, "messages", message_id]
                if !chat_id.is_empty() && !message_id.is_empty() =>
            {
                Ok((*chat_id, *message_id))
            }
            _ => Err(AppError::MalformedEvent(format!(
                "unexpected document path '{}'",
                self.document
            ))),
        }
    }

    pub fn conversation_id(&self) -> Result<&str, AppError> {
        self.path_params().map(|(chat_id, _)| chat_id)
    }

    pub fn message_id(&self) -> Result<&str, AppError> {
        self.path_params().map(|(_, message_id)| message_id)
    }
}

/// How a single dispatch invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    NoRecipient,
    RecipientProfileMissing { recipient_id: String },
    NoDeliveryToken { recipient_id: String },
    /// Only produced under `MissingSenderPolicy::Skip`
    SenderProfileMissing { sender_id: Option<String> },
    Sent { recipient_id: String, message_id: String },
    /// The push service rejected the send; logged and suppressed
    SendFailed { recipient_id: String, error: String },
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::NoRecipient => "no_recipient",
            DispatchOutcome::RecipientProfileMissing { .. } => "recipient_profile_missing",
            DispatchOutcome::NoDeliveryToken { .. } => "no_delivery_token",
            DispatchOutcome::SenderProfileMissing { .. } => "sender_profile_missing",
            DispatchOutcome::Sent { .. } => "sent",
            DispatchOutcome::SendFailed { .. } => "send_failed",
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_record_from_firestore_fields() {
        let record: MessageRecord =
            serde_json::from_value(json!({"senderId": "u1", "text": "hi"})).unwrap();
        assert_eq!(record.sender_id.as_deref(), Some("u1"));
        assert_eq!(record.text.as_deref(), Some("hi"));

        let record: MessageRecord =
            serde_json::from_value(json!({"senderId": "u1", "imageUrl": "x"})).unwrap();
        assert_eq!(record.text, None);
    }

    #[test]
    fn test_display_name_fallback() {
        let profile = UserProfile {
            display_name: Some("Alice".to_string()),
            fcm_token: None,
        };
        assert_eq!(profile.display_name_or_default(), "Alice");

        let profile = UserProfile {
            display_name: Some(String::new()),
            fcm_token: None,
        };
        assert_eq!(profile.display_name_or_default(), "Someone");
        assert_eq!(UserProfile::default().display_name_or_default(), "Someone");
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let profile = UserProfile {
            display_name: None,
            fcm_token: Some(String::new()),
        };
        assert_eq!(profile.delivery_token(), None);
    }

    #[test]
    fn test_payload_for_text_message() {
        let message = MessageRecord {
            sender_id: Some("u1".to_string()),
            text: Some("hi".to_string()),
        };
        let payload = NotificationPayload::for_message("Alice", &message);
        assert_eq!(payload.title, "New message from Alice");
        assert_eq!(payload.body, "hi");
        assert_eq!(payload.sound, "default");
    }

    #[test]
    fn test_payload_for_image_message() {
        let mut message = MessageRecord {
            sender_id: Some("u1".to_string()),
            text: None,
        };
        assert_eq!(
            NotificationPayload::for_message("Alice", &message).body,
            "Sent an image"
        );

        message.text = Some(String::new());
        assert_eq!(
            NotificationPayload::for_message("Alice", &message).body,
            "Sent an image"
        );
    }

    #[test]
    fn test_event_path_params() {
        let event = MessageCreatedEvent::new("u1_u2", "m1", MessageRecord::default());
        assert_eq!(event.document, "chats/u1_u2/messages/m1");
        assert_eq!(event.conversation_id().unwrap(), "u1_u2");
        assert_eq!(event.message_id().unwrap(), "m1");
    }

    #[test]
    fn test_event_malformed_path() {
        for document in ["users/u1", "chats//messages/m1", "chats/u1_u2/messages", ""] {
            let event = MessageCreatedEvent {
                document: document.to_string(),
                data: MessageRecord::default(),
            };
            assert!(
                matches!(event.conversation_id(), Err(AppError::MalformedEvent(_))),
                "{document}"
            );
        }
    }

    #[test]
    fn test_event_deserialization() {
        let event: MessageCreatedEvent = serde_json::from_value(json!({
            "document": "chats/u1_u2/messages/m1",
            "data": {"senderId": "u1"}
        }))
        .unwrap();
        assert_eq!(event.data.sender_id.as_deref(), Some("u1"));
        assert_eq!(event.data.text, None);
    }
}
