/// Chat message notification dispatcher
///
/// One invocation per created message record:
/// 1. resolve the recipient from the conversation id
/// 2. load the recipient profile and its delivery token
/// 3. load the sender profile for the display name
/// 4. build and send the push notification
///
/// Every step that finds nothing ends the invocation with a
/// [`DispatchOutcome`]. A failed send is logged and reported as
/// `SendFailed`, never as an error.
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn, Instrument};

use crate::config::MissingSenderPolicy;
use crate::error::DispatchError;
use crate::metrics;
use crate::models::{DispatchOutcome, MessageCreatedEvent, MessageRecord, NotificationPayload};
use crate::services::profile_store::{is_document_id, ProfileStore};
use crate::services::push_gateway::PushGateway;
use crate::services::recipient::resolve_recipient;

#[derive(Clone)]
pub struct NotificationDispatcher {
    profiles: Arc<dyn ProfileStore>,
    push: Arc<dyn PushGateway>,
    missing_sender_policy: MissingSenderPolicy,
}

impl NotificationDispatcher {
    pub fn new(profiles: Arc<dyn ProfileStore>, push: Arc<dyn PushGateway>) -> Self {
        Self {
            profiles,
            push,
            missing_sender_policy: MissingSenderPolicy::default(),
        }
    }

    pub fn with_missing_sender_policy(mut self, policy: MissingSenderPolicy) -> Self {
        self.missing_sender_policy = policy;
        self
    }

    /// Entry point for the record-created event source
    pub async fn handle_event(
        &self,
        event: &MessageCreatedEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (chat_id, message_id) = event.path_params()?;
        let span = tracing::info_span!("chat_notification", chat_id, message_id);

        let started = Instant::now();
        let result = self.dispatch(chat_id, &event.data).instrument(span).await;

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "error",
        };
        metrics::observe_dispatch(label, started.elapsed());

        result
    }

    pub async fn dispatch(
        &self,
        conversation_id: &str,
        message: &MessageRecord,
    ) -> Result<DispatchOutcome, DispatchError> {
        let sender_id = message.sender_id.as_deref();

        let Some(recipient_id) = resolve_recipient(conversation_id, sender_id) else {
            info!(conversation_id, ?sender_id, "Recipient not found");
            return Ok(DispatchOutcome::NoRecipient);
        };

        let Some(recipient) = self.profiles.get_profile(recipient_id).await? else {
            info!(recipient_id, "Recipient data not found");
            return Ok(DispatchOutcome::RecipientProfileMissing {
                recipient_id: recipient_id.to_string(),
            });
        };

        let Some(token) = recipient.delivery_token() else {
            info!(recipient_id, "Recipient FCM token not found");
            return Ok(DispatchOutcome::NoDeliveryToken {
                recipient_id: recipient_id.to_string(),
            });
        };

        // An absent, empty or path-like sender id has no document to look up
        let sender = match sender_id {
            Some(id) if is_document_id(id) => self.profiles.get_profile(id).await?,
            _ => None,
        };

        let Some(sender) = sender else {
            return match self.missing_sender_policy {
                MissingSenderPolicy::Fail => {
                    warn!(?sender_id, "Sender data not found, failing invocation");
                    Err(DispatchError::SenderProfileMissing {
                        sender_id: sender_id.map(str::to_string),
                    })
                }
                MissingSenderPolicy::Skip => {
                    info!(?sender_id, "Sender data not found");
                    Ok(DispatchOutcome::SenderProfileMissing {
                        sender_id: sender_id.map(str::to_string),
                    })
                }
            };
        };

        let payload = NotificationPayload::for_message(sender.display_name_or_default(), message);

        match self.push.send(token, &payload).await {
            Ok(message_id) => {
                info!(recipient_id, message_id = %message_id, "Notification sent successfully");
                Ok(DispatchOutcome::Sent {
                    recipient_id: recipient_id.to_string(),
                    message_id,
                })
            }
            Err(e) => {
                error!(recipient_id, error = %e, "Error sending notification");
                Ok(DispatchOutcome::SendFailed {
                    recipient_id: recipient_id.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }
}
