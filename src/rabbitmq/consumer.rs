use super::messages::{ClipApprovedPayload, ClipSubmittedPayload, StatsRequestedPayload};
use super::subscriber::{Callback, Message, Subscriber, SubscriberError};
use crate::app_state::AppState;
use crate::models::{CampaignCreatedEvent, CampaignStatusChangedEvent};
use crate::services::{campaign_cache, stats_collector};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

const QUEUE_NAME: &str = "statistics.events";
const PREFETCH_COUNT: u16 = 10;
const MAX_ATTEMPTS: u32 = 3;

const ROUTING_KEYS: [&str; 5] = [
    "clip.submitted",
    "clip.approved",
    "stats.requested",
    "campaign.created",
    "campaign.status_changed",
];

/// Tagged sum type over the bound routing keys: one variant per key, each
/// carrying its own typed payload, matched exhaustively at dispatch time.
enum Event {
    ClipSubmitted(ClipSubmittedPayload),
    ClipApproved(ClipApprovedPayload),
    StatsRequested(StatsRequestedPayload),
    CampaignCreated(CampaignCreatedEvent),
    CampaignStatusChanged(CampaignStatusChangedEvent),
}

impl Event {
    fn parse(routing_key: &str, message: &Message) -> Result<Self, serde_json::Error> {
        match routing_key {
            "clip.submitted" => Ok(Event::ClipSubmitted(message.unmarshal_to()?)),
            "clip.approved" => Ok(Event::ClipApproved(message.unmarshal_to()?)),
            "stats.requested" => Ok(Event::StatsRequested(message.unmarshal_to()?)),
            "campaign.created" => Ok(Event::CampaignCreated(message.unmarshal_to()?)),
            "campaign.status_changed" => Ok(Event::CampaignStatusChanged(message.unmarshal_to()?)),
            other => Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "no event variant bound to routing key {other}"
            ))),
        }
    }
}

/// Single callback shared across every bound routing key; it parses the
/// message into the tagged `Event` and dispatches on the tag, the same
/// registry style this crate uses for platform dispatch.
struct Dispatcher {
    state: AppState,
}

#[async_trait]
impl Callback for Dispatcher {
    async fn on_message(&self, message: &Message) -> Result<(), Box<dyn Error + Send + Sync>> {
        let event = Event::parse(&message.routing_key, message)?;

        match event {
            Event::ClipSubmitted(payload) => {
                log::info!("clip.submitted: {}", payload.submission_id);
                Ok(())
            }
            Event::ClipApproved(payload) => {
                let clip = self.state.clip_service.get_clip(&payload.submission_id).await?;
                match clip.platform_video_id {
                    Some(video_id) => {
                        let platform = crate::models::Platform::parse(&clip.platform).ok_or_else(|| {
                            crate::error::AppError::Validation(format!(
                                "unknown platform {}",
                                clip.platform
                            ))
                        })?;
                        stats_collector::refresh_clip_stats(
                            &self.state,
                            &payload.submission_id,
                            platform,
                            &video_id,
                        )
                        .await?;
                        Ok(())
                    }
                    None => {
                        log::info!(
                            "clip.approved {} has no platformVideoId, skipping refresh",
                            payload.submission_id
                        );
                        Ok(())
                    }
                }
            }
            Event::StatsRequested(payload) => {
                // No handler is wired for this routing key yet: its
                // refresh policy is still undecided. Logging and acking
                // keeps the queue moving without guessing at one.
                log::info!("stats.requested received for {} (no-op)", payload.clip_id);
                Ok(())
            }
            Event::CampaignCreated(payload) => {
                campaign_cache::upsert_from_event(
                    &self.state,
                    &payload.campaign_id,
                    &payload.title,
                    "ACTIVE",
                )
                .await?;
                Ok(())
            }
            Event::CampaignStatusChanged(payload) => {
                campaign_cache::upsert_status(&self.state, &payload.campaign_id, &payload.new_status)
                    .await?;
                Ok(())
            }
        }
    }
}

/// Owns the subscriber connection and wires the routing-key registry.
pub struct EventConsumer {
    subscriber: Subscriber,
    state: AppState,
}

impl EventConsumer {
    pub async fn new(state: AppState) -> Result<Self, SubscriberError> {
        let subscriber = Subscriber::new(
            &state.config.rabbitmq_url,
            &state.config.event_exchange,
            QUEUE_NAME,
            PREFETCH_COUNT,
        )
        .await?;
        Ok(Self { subscriber, state })
    }

    /// Binds the routing keys and starts consuming. The returned handle
    /// lets the caller stop the consumer later: `shutdown()` stops
    /// accepting new deliveries and waits for every in-flight one to be
    /// acked or nacked before returning.
    pub async fn run(mut self) -> Result<EventConsumerHandle, SubscriberError> {
        let dispatcher: Arc<dyn Callback> = Arc::new(Dispatcher { state: self.state.clone() });

        let mut callbacks: HashMap<String, Arc<dyn Callback>> = HashMap::new();
        for key in ROUTING_KEYS {
            callbacks.insert(key.to_string(), dispatcher.clone());
        }

        log::info!(
            "event consumer bound to {} with keys {:?}, prefetch {}",
            QUEUE_NAME, ROUTING_KEYS, PREFETCH_COUNT
        );
        let (shutdown, task) = self.subscriber.start(callbacks, MAX_ATTEMPTS).await?;
        Ok(EventConsumerHandle { shutdown, task })
    }
}

pub struct EventConsumerHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl EventConsumerHandle {
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            log::error!("event consumer task panicked during shutdown: {e}");
        }
    }
}
