use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection, ConnectionProperties,
    ExchangeKind,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum PublisherError {
    #[error("failed to connect to rabbitmq: {0}")]
    ConnectionFailed(String),
    #[error("failed to open channel: {0}")]
    ChannelFailed(String),
    #[error("failed to declare exchange: {0}")]
    ExchangeDeclarationFailed(String),
    #[error("failed to publish: {0}")]
    PublishFailed(String),
    #[error("failed to serialize message: {0}")]
    SerializationFailed(String),
    #[error("connection timeout: {0}")]
    Timeout(String),
}

/// Publishes JSON-encoded events to a topic (not direct) exchange, since
/// the statistics pipeline publishes under more than one routing key on
/// the same exchange.
pub struct EventPublisher {
    channel: Channel,
    exchange: String,
}

impl EventPublisher {
    pub async fn new(amqp_url: &str, exchange_name: &str) -> Result<Self, PublisherError> {
        let connection = timeout(
            Duration::from_secs(60),
            Connection::connect(amqp_url, ConnectionProperties::default()),
        )
        .await
        .map_err(|_| PublisherError::Timeout("connection timeout".to_string()))?
        .map_err(|e| PublisherError::ConnectionFailed(e.to_string()))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublisherError::ChannelFailed(e.to_string()))?;

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
            .map_err(|e| PublisherError::ExchangeDeclarationFailed(e.to_string()))?;

        Ok(Self {
            channel,
            exchange: exchange_name.to_string(),
        })
    }

    pub async fn publish<T: Serialize>(
        &self,
        routing_key: &str,
        event: &T,
    ) -> Result<(), PublisherError> {
        let body = serde_json::to_vec(event)
            .map_err(|e| PublisherError::SerializationFailed(e.to_string()))?;

        self.channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
            .map_err(|e| PublisherError::PublishFailed(e.to_string()))?
            .await
            .map_err(|e| PublisherError::PublishFailed(e.to_string()))?;

        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.status().connected()
    }

    /// Takes `&self`, not `self`, since the publisher is held behind an
    /// `Arc` shared with every task that publishes events; closing the
    /// underlying channel doesn't require being its sole owner.
    pub async fn close(&self) -> Result<(), PublisherError> {
        self.channel
            .close(200, "closing")
            .await
            .map_err(|e| PublisherError::ChannelFailed(e.to_string()))
    }
}
