//! MQTT subscription and the delivery loop feeding [`Ingest`].

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode,
};
use std::sync::Arc;

use crate::config::BrokerConfig;
use crate::error::ConnectionError;
use crate::ingest::Ingest;

pub fn qos_from_level(level: u8) -> Result<QoS, ConnectionError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(ConnectionError::InvalidQos(other)),
    }
}

pub fn mqtt_options(config: &BrokerConfig) -> MqttOptions {
    let mut options = MqttOptions::new(config.client_id(), &config.host, config.port);
    options.set_keep_alive(config.keepalive());
    options
}

/// What the delivery loop does after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Continue,
    Finished,
}

/// Handles one event of the subscription's event loop.
///
/// Publish payloads go to `ingest`; a payload that does not decode is logged
/// and skipped. A refused subscription is an error. Delivery finishes when
/// either side disconnects.
pub fn handle_event(
    event: Event,
    ingest: &Ingest,
    topic: &str,
) -> Result<Delivery, ConnectionError> {
    match event {
        Event::Incoming(Packet::Publish(publish)) => {
            if let Err(e) = ingest.on_message(&publish.payload) {
                log::warn!("dropping message on '{}': {}", publish.topic, e);
            }
        }
        Event::Incoming(Packet::SubAck(ack)) => {
            if ack
                .return_codes
                .iter()
                .any(|c| matches!(c, SubscribeReasonCode::Failure))
            {
                return Err(ConnectionError::Rejected(format!(
                    "subscription to '{}' refused",
                    topic
                )));
            }
            log::debug!("subscribed to '{}'", topic);
        }
        Event::Incoming(Packet::Disconnect) => {
            log::info!("broker closed the connection");
            return Ok(Delivery::Finished);
        }
        Event::Outgoing(Outgoing::Disconnect) => {
            log::debug!("disconnect sent");
            return Ok(Delivery::Finished);
        }
        _ => {}
    }
    Ok(Delivery::Continue)
}

/// Polls `eventloop` until a disconnect requested through its client has
/// been written to the broker.
///
/// Requests queued before the disconnect are written first.
pub async fn drain_until_disconnect(mut eventloop: EventLoop) -> Result<(), ConnectionError> {
    loop {
        if let Event::Outgoing(Outgoing::Disconnect) = eventloop.poll().await? {
            return Ok(());
        }
    }
}

pub struct Subscription {
    // the event loop stops once every client handle is dropped
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
}

impl Subscription {
    /// Connects to the broker and subscribes to the configured topic.
    ///
    /// Returns once the broker acknowledged the connection. There is no retry.
    pub async fn connect(config: &BrokerConfig) -> Result<Subscription, ConnectionError> {
        let qos = qos_from_level(config.qos)?;
        log::info!("connecting to {}:{}...", config.host, config.port);
        let (client, mut eventloop) =
            AsyncClient::new(mqtt_options(config), config.channel_capacity.max(1));
        client.subscribe(config.topic.as_str(), qos).await?;

        loop {
            match eventloop.poll().await? {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    if ack.code != ConnectReturnCode::Success {
                        return Err(ConnectionError::Rejected(format!("{:?}", ack.code)));
                    }
                    break;
                }
                event => log::trace!("pre-connect event {:?}", event),
            }
        }
        log::info!("connected, listening on topic '{}'", config.topic);

        Ok(Subscription {
            client,
            eventloop,
            topic: config.topic.clone(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Handle for requests to the broker, e.g. a disconnect on shutdown.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Runs the delivery loop, see [`handle_event`].
    ///
    /// A connection failure ends delivery.
    pub async fn deliver(mut self, ingest: Arc<Ingest>) -> Result<(), ConnectionError> {
        loop {
            let event = self.eventloop.poll().await?;
            if handle_event(event, &ingest, &self.topic)? == Delivery::Finished {
                return Ok(());
            }
        }
    }
}
