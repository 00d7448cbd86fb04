/// Record-created event sources
///
/// The dispatcher is registered against a [`MessageEventSource`] at startup
/// by [`run_event_loop`]. Each event is handled in its own task; invocations
/// share nothing but the dispatcher's clients.
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::collections::VecDeque;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::KafkaConfig;
use crate::error::{AppError, DispatchError, Result};
use crate::models::{DispatchOutcome, MessageCreatedEvent};
use crate::services::dispatcher::NotificationDispatcher;

#[async_trait]
pub trait MessageEventSource: Send {
    /// Next event; `None` once the source is exhausted
    async fn next_event(&mut self) -> Option<Result<MessageCreatedEvent>>;
}

/// Decode one JSON event payload
pub fn parse_event(payload: &[u8]) -> Result<MessageCreatedEvent> {
    let event: MessageCreatedEvent = serde_json::from_slice(payload)
        .map_err(|e| AppError::MalformedEvent(e.to_string()))?;
    event.path_params()?;
    Ok(event)
}

/// Kafka topic carrying `chats/{chatId}/messages/{messageId}` create events
pub struct KafkaMessageEventSource {
    consumer: StreamConsumer,
}

impl KafkaMessageEventSource {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "true")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "10000")
            .create()
            .map_err(|e| AppError::EventSource(format!("Failed to create Kafka consumer: {}", e)))?;

        consumer
            .subscribe(&[config.message_topic.as_str()])
            .map_err(|e| AppError::EventSource(format!("Failed to subscribe to topic: {}", e)))?;

        info!(
            brokers = %config.brokers,
            topic = %config.message_topic,
            group_id = %config.group_id,
            "Subscribed to message events"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageEventSource for KafkaMessageEventSource {
    async fn next_event(&mut self) -> Option<Result<MessageCreatedEvent>> {
        let event = match self.consumer.recv().await {
            Ok(message) => match message.payload() {
                Some(payload) => parse_event(payload),
                None => Err(AppError::MalformedEvent("empty payload".to_string())),
            },
            Err(e) => Err(AppError::EventSource(e.to_string())),
        };
        Some(event)
    }
}

/// In-memory source, drained in order
#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    events: VecDeque<Result<MessageCreatedEvent>>,
}

impl InMemoryEventSource {
    pub fn new(events: impl IntoIterator<Item = MessageCreatedEvent>) -> Self {
        Self {
            events: events.into_iter().map(Ok).collect(),
        }
    }

    pub fn push(&mut self, event: Result<MessageCreatedEvent>) {
        self.events.push_back(event);
    }
}

#[async_trait]
impl MessageEventSource for InMemoryEventSource {
    async fn next_event(&mut self) -> Option<Result<MessageCreatedEvent>> {
        self.events.pop_front()
    }
}

/// Summary of a drained event loop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLoopStats {
    pub handled: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Pull events from `source` and dispatch each in its own task.
///
/// Malformed events are skipped. Invocation failures are logged and do not
/// stop the loop. Returns once the source is exhausted and every spawned
/// invocation has finished.
pub async fn run_event_loop<S: MessageEventSource>(
    mut source: S,
    dispatcher: NotificationDispatcher,
) -> EventLoopStats {
    let mut stats = EventLoopStats::default();
    let mut invocations: JoinSet<std::result::Result<DispatchOutcome, DispatchError>> =
        JoinSet::new();

    while let Some(next) = source.next_event().await {
        match next {
            Ok(event) => {
                let dispatcher = dispatcher.clone();
                invocations.spawn(async move { dispatcher.handle_event(&event).await });
            }
            Err(e) => {
                warn!(error = %e, "Skipping message event");
                stats.skipped += 1;
            }
        }

        while let Some(done) = invocations.try_join_next() {
            record_invocation(done, &mut stats);
        }
    }

    while let Some(done) = invocations.join_next().await {
        record_invocation(done, &mut stats);
    }

    info!(?stats, "Message event source exhausted");
    stats
}

fn record_invocation(
    done: std::result::Result<
        std::result::Result<DispatchOutcome, DispatchError>,
        tokio::task::JoinError,
    >,
    stats: &mut EventLoopStats,
) {
    match done {
        Ok(Ok(_)) => stats.handled += 1,
        Ok(Err(e)) => {
            error!(error = %e, "Notification invocation failed");
            stats.failed += 1;
        }
        Err(e) => {
            error!(error = %e, "Notification invocation panicked");
            stats.failed += 1;
        }
    }
}
