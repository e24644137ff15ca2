pub mod consumer;
pub mod messages;
pub mod publisher;
pub mod subscriber;

pub use consumer::{EventConsumer, EventConsumerHandle};
pub use publisher::EventPublisher;
