//! MQTT 3.1.1 transport on top of the blocking `rumqttc` client.
//!
//! The connection is driven by a dedicated `mqtt-io` thread, which also
//! runs the inbound message callback. Subscriptions are re-issued every
//! time the broker acknowledges a (re)connect.

use super::{Publisher, TransportError};
use crate::config::BrokerConfig;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Outgoing, Packet,
    QoS,
};

const REQUEST_QUEUE: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

/// Cheap handle for publishing from another thread.
#[derive(Clone)]
pub struct MqttPublisher {
    client: Client,
}

impl Publisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(TransportError::Publish)
    }
}

pub struct MqttTransport {
    publisher: MqttPublisher,
    subscriptions: Arc<Mutex<Vec<String>>>,
    stopping: Arc<AtomicBool>,
    // Reports disconnected once the network thread has returned.
    io_done: channel::Receiver<()>,
}

impl MqttTransport {
    /// Connects to the broker and blocks until it accepts the session, the
    /// connection fails, or `connect_timeout` passes. `on_message` runs on
    /// the network thread for every incoming publish.
    pub fn connect<F>(
        broker: &BrokerConfig,
        subscriptions: Vec<String>,
        on_message: F,
    ) -> Result<MqttTransport, TransportError>
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        let mut options = MqttOptions::new(&broker.client_id, &broker.host, broker.port);
        options.set_keep_alive(broker.keep_alive());
        options.set_clean_session(true);
        if let Some((user, pass)) = broker.credentials() {
            options.set_credentials(user, pass);
        }

        let (client, connection) = Client::new(options, REQUEST_QUEUE);
        let subscriptions = Arc::new(Mutex::new(subscriptions));
        let stopping = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = channel::bounded(1);
        let (done_tx, io_done) = channel::bounded::<()>(0);

        tracing::info!(host = %broker.host, port = broker.port, "connecting to broker");

        let io = NetworkLoop {
            client: client.clone(),
            subscriptions: subscriptions.clone(),
            stopping: stopping.clone(),
            ready: Some(ready_tx),
        };
        thread::Builder::new()
            .name("mqtt-io".to_string())
            .spawn(move || {
                io.run(connection, on_message);
                drop(done_tx);
            })
            .map_err(|_| TransportError::Disconnected)?;

        let timeout = broker.connect_timeout();
        let outcome = match ready_rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(channel::RecvTimeoutError::Timeout) => Err(TransportError::ConnectTimeout(timeout)),
            Err(channel::RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        };

        let transport = MqttTransport {
            publisher: MqttPublisher { client },
            subscriptions,
            stopping,
            io_done,
        };
        match outcome {
            Ok(()) => Ok(transport),
            Err(e) => {
                transport.shutdown();
                Err(e)
            }
        }
    }

    pub fn publisher(&self) -> MqttPublisher {
        self.publisher.clone()
    }

    /// Subscribes now and again after every reconnect.
    pub fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        if let Ok(mut subs) = self.subscriptions.lock() {
            if !subs.iter().any(|t| t == topic) {
                subs.push(topic.to_string());
            }
        }
        self.publisher
            .client
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(TransportError::Subscribe)
    }

    /// Ends the session and waits briefly for the network thread.
    pub fn disconnect(self) {
        tracing::info!("disconnecting from broker");
        self.shutdown();
    }

    fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        let _ = self.publisher.client.try_disconnect();
        if let Err(channel::RecvTimeoutError::Timeout) = self.io_done.recv_timeout(SHUTDOWN_WAIT) {
            // Still blocked in a connect attempt; it exits on its next error.
            tracing::debug!("network thread did not stop in time");
        }
    }
}

struct NetworkLoop {
    client: Client,
    subscriptions: Arc<Mutex<Vec<String>>>,
    stopping: Arc<AtomicBool>,
    // Taken on the first connect outcome.
    ready: Option<channel::Sender<Result<(), TransportError>>>,
}

impl NetworkLoop {
    fn run<F>(mut self, mut connection: Connection, mut on_message: F)
    where
        F: FnMut(&str, &str),
    {
        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code != ConnectReturnCode::Success {
                        let reason = format!("{:?}", ack.code);
                        tracing::error!(%reason, "broker refused connection");
                        if self.report(Err(TransportError::ConnectRefused(reason))) {
                            return;
                        }
                        continue;
                    }
                    tracing::info!("connected to broker");
                    self.resubscribe();
                    self.report(Ok(()));
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload);
                    tracing::debug!(topic = %publish.topic, %payload, "received");
                    on_message(publish.topic.as_str(), &*payload);
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    tracing::debug!(pkid = ack.pkid, "subscription acknowledged");
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    tracing::debug!("disconnect sent");
                    return;
                }
                Ok(_) => {}
                Err(ConnectionError::RequestsDone) => return,
                Err(e) => {
                    if self.stopping.load(Ordering::SeqCst) {
                        return;
                    }
                    if self.report(Err(TransportError::Connect(e))) {
                        return;
                    }
                    thread::sleep(RECONNECT_DELAY);
                }
            }
        }
    }

    /// Hands the connect outcome to `connect` the first time. Returns true
    /// when that outcome was a failure, i.e. the loop should end.
    fn report(&mut self, outcome: Result<(), TransportError>) -> bool {
        match self.ready.take() {
            Some(ready) => {
                let failed = outcome.is_err();
                let _ = ready.send(outcome);
                failed
            }
            None => {
                if let Err(e) = outcome {
                    tracing::warn!(error = %e, "connection lost, reconnecting");
                }
                false
            }
        }
    }

    fn resubscribe(&self) {
        let Ok(subs) = self.subscriptions.lock() else {
            return;
        };
        for topic in subs.iter() {
            match self.client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                Ok(()) => tracing::info!(%topic, "subscribed"),
                Err(e) => tracing::warn!(%topic, error = %e, "subscribe failed"),
            }
        }
    }
}
