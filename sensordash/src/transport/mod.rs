//! Transport
//!
//! Publish/subscribe access to the broker. The emulator only needs the
//! [`Publisher`] capability; [`mqtt::MqttTransport`] provides it together
//! with subscriptions and inbound delivery.

pub mod mqtt;

use std::time::Duration;

use thiserror::Error;

pub use mqtt::{MqttPublisher, MqttTransport};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to connect to broker: {0}")]
    Connect(#[source] rumqttc::ConnectionError),

    #[error("broker refused connection: {0}")]
    ConnectRefused(String),

    #[error("no answer from broker within {0:?}")]
    ConnectTimeout(Duration),

    #[error("publish failed: {0}")]
    Publish(#[source] rumqttc::ClientError),

    #[error("subscribe failed: {0}")]
    Subscribe(#[source] rumqttc::ClientError),

    #[error("network thread exited")]
    Disconnected,
}

/// Something that can put a payload on a topic.
pub trait Publisher {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        (**self).publish(topic, payload)
    }
}
