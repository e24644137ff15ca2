use async_trait::async_trait;
use lapin::{
    options::*, types::FieldTable, types::AMQPValue, Channel, Connection, ConnectionProperties,
    Consumer, ExchangeKind,
};
use serde::de::DeserializeOwned;
use std::{collections::HashMap, error::Error, sync::Arc, time::Duration};
use thiserror::Error as ThisError;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;

#[derive(ThisError, Debug)]
pub enum SubscriberError {
    #[error("failed to connect to rabbitmq: {0}")]
    ConnectionFailed(String),
    #[error("failed to open channel: {0}")]
    ChannelFailed(String),
    #[error("failed to declare exchange: {0}")]
    ExchangeDeclarationFailed(String),
    #[error("failed to declare queue: {0}")]
    QueueDeclarationFailed(String),
    #[error("failed to bind queue: {0}")]
    QueueBindFailed(String),
    #[error("failed to register consumer: {0}")]
    ConsumerRegistrationFailed(String),
    #[error("connection timeout: {0}")]
    Timeout(String),
}

/// A received message, wrapping the lapin delivery in the shape handed
/// to callbacks.
#[derive(Debug, Clone)]
pub struct Message {
    pub body: Vec<u8>,
    pub routing_key: String,
    pub delivery_tag: u64,
}

impl Message {
    pub fn unmarshal_to<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// `async`, awaited to completion before the message is acked or nacked --
/// the per-event retry and dead-letter policy requires knowing whether the
/// handler actually succeeded, not just that it was dispatched.
#[async_trait]
pub trait Callback: Send + Sync {
    async fn on_message(&self, message: &Message) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Topic-exchange subscriber with a dead-letter queue: routing keys like
/// `clip.approved` need pattern-style binding across more than one key on
/// one exchange, and the main queue's `x-dead-letter-exchange` argument
/// means a final `basic_nack` without requeue routes the message to
/// `{queue}.dlq`.
pub struct Subscriber {
    channel: Channel,
    exchange: String,
    queue: String,
}

impl Subscriber {
    pub async fn new(
        amqp_url: &str,
        exchange_name: &str,
        queue_name: &str,
        prefetch_count: u16,
    ) -> Result<Self, SubscriberError> {
        let connection = timeout(
            Duration::from_secs(60),
            Connection::connect(amqp_url, ConnectionProperties::default()),
        )
        .await
        .map_err(|_| SubscriberError::Timeout("connection timeout".to_string()))?
        .map_err(|e| SubscriberError::ConnectionFailed(e.to_string()))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| SubscriberError::ChannelFailed(e.to_string()))?;

        channel
            .basic_qos(prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| SubscriberError::ChannelFailed(e.to_string()))?;

        channel
            .exchange_declare(
                exchange_name,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    auto_delete: false,
                    internal: false,
                    nowait: false,
                    passive: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SubscriberError::ExchangeDeclarationFailed(e.to_string()))?;

        let dlx_name = format!("{queue_name}.dlx");
        channel
            .exchange_declare(
                &dlx_name,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: true,
                    auto_delete: false,
                    internal: false,
                    nowait: false,
                    passive: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SubscriberError::ExchangeDeclarationFailed(e.to_string()))?;

        let dlq_name = format!("{queue_name}.dlq");
        channel
            .queue_declare(
                &dlq_name,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    nowait: false,
                    passive: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SubscriberError::QueueDeclarationFailed(e.to_string()))?;

        channel
            .queue_bind(
                &dlq_name,
                &dlx_name,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| SubscriberError::QueueBindFailed(e.to_string()))?;

        let mut queue_args = FieldTable::default();
        queue_args.insert("x-dead-letter-exchange".into(), AMQPValue::LongString(dlx_name.into()));

        let queue = channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    nowait: false,
                    passive: false,
                },
                queue_args,
            )
            .await
            .map_err(|e| SubscriberError::QueueDeclarationFailed(e.to_string()))?;

        Ok(Self {
            channel,
            exchange: exchange_name.to_string(),
            queue: queue.name().to_string(),
        })
    }

    /// Binds each routing key, starts consuming, and runs each delivery
    /// through its callback with up to `max_attempts` tries (exponential
    /// backoff between tries). Acks on success; on final failure nacks
    /// without requeue, which the `x-dead-letter-exchange` argument routes
    /// to the dead-letter queue.
    ///
    /// Returns a `Notify` the caller can fire to stop accepting new
    /// deliveries, and the `JoinHandle` of the processing task, which only
    /// resolves once every already-accepted delivery has been acked or
    /// nacked.
    pub async fn start(
        &mut self,
        routing_key_callbacks: HashMap<String, Arc<dyn Callback>>,
        max_attempts: u32,
    ) -> Result<(Arc<Notify>, JoinHandle<()>), SubscriberError> {
        for routing_key in routing_key_callbacks.keys() {
            self.channel
                .queue_bind(
                    &self.queue,
                    &self.exchange,
                    routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(|e| {
                    SubscriberError::QueueBindFailed(format!(
                        "failed to bind {} to {} with key {routing_key}: {e}",
                        self.queue, self.exchange
                    ))
                })?;
        }

        let consumer = self
            .channel
            .basic_consume(
                &self.queue,
                "statistics-service",
                BasicConsumeOptions {
                    no_ack: false,
                    exclusive: false,
                    no_local: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SubscriberError::ConsumerRegistrationFailed(e.to_string()))?;

        Ok(self.process_messages(consumer, routing_key_callbacks, max_attempts))
    }

    fn process_messages(
        &self,
        consumer: Consumer,
        routing_key_callbacks: HashMap<String, Arc<dyn Callback>>,
        max_attempts: u32,
    ) -> (Arc<Notify>, JoinHandle<()>) {
        let callbacks = Arc::new(routing_key_callbacks);
        let channel = self.channel.clone();
        let shutdown = Arc::new(Notify::new());
        let shutdown_rx = shutdown.clone();

        let task = tokio::spawn(async move {
            use futures_util::stream::StreamExt;

            let mut stream = consumer.into_stream();
            let mut in_flight = JoinSet::new();

            loop {
                tokio::select! {
                    _ = shutdown_rx.notified() => {
                        log::info!("event consumer stopping: draining in-flight deliveries");
                        break;
                    }
                    delivery = stream.next() => {
                        let Some(delivery) = delivery else { break };
                        let delivery = match delivery {
                            Ok(d) => d,
                            Err(e) => {
                                log::error!("error receiving delivery: {e}");
                                continue;
                            }
                        };

                        let msg = Message {
                            body: delivery.data.clone(),
                            routing_key: delivery.routing_key.to_string(),
                            delivery_tag: delivery.delivery_tag,
                        };

                        let Some(callback) = callbacks.get(&msg.routing_key).cloned() else {
                            log::warn!("no handler bound for routing key {}", msg.routing_key);
                            if let Err(e) = channel
                                .basic_nack(delivery.delivery_tag, BasicNackOptions { requeue: false, ..Default::default() })
                                .await
                            {
                                log::error!("failed to nack unroutable message: {e}");
                            }
                            continue;
                        };

                        let channel = channel.clone();
                        in_flight.spawn(async move {
                            let mut last_err = None;
                            let mut delay = Duration::from_millis(200);
                            let mut succeeded = false;

                            for attempt in 1..=max_attempts {
                                match callback.on_message(&msg).await {
                                    Ok(()) => {
                                        succeeded = true;
                                        break;
                                    }
                                    Err(e) => {
                                        log::warn!(
                                            "handler for {} failed on attempt {attempt}/{max_attempts}: {e}",
                                            msg.routing_key
                                        );
                                        last_err = Some(e);
                                        if attempt < max_attempts {
                                            tokio::time::sleep(delay).await;
                                            delay *= 2;
                                        }
                                    }
                                }
                            }

                            if succeeded {
                                if let Err(e) = channel
                                    .basic_ack(delivery.delivery_tag, BasicAckOptions::default())
                                    .await
                                {
                                    log::error!("failed to ack {}: {e}", msg.routing_key);
                                }
                            } else {
                                log::error!(
                                    "handler for {} exhausted {max_attempts} attempts, routing to dead-letter queue: {:?}",
                                    msg.routing_key,
                                    last_err
                                );
                                if let Err(e) = channel
                                    .basic_nack(delivery.delivery_tag, BasicNackOptions { requeue: false, ..Default::default() })
                                    .await
                                {
                                    log::error!("failed to nack {}: {e}", msg.routing_key);
                                }
                            }
                        });
                    }
                }
            }

            while in_flight.join_next().await.is_some() {}
        });

        (shutdown, task)
    }
}
