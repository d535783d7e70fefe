//! MQTT transport built on `rumqttc`.
//!
//! ```no_run
//! use techlife_rs::{BulbConfig, mqtt};
//!
//! # async fn run() -> Result<(), techlife_rs::Error> {
//! let identity = BulbConfig::new("7c:b9:4c:57:6e:1f", "192.168.1.129").identity()?;
//! let (bulb, _pump) = mqtt::connect_bulb(identity).await;
//! bulb.set_color(255, 0, 0, 200).await?;
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::bulb::Bulb;
use crate::config::BulbIdentity;
use crate::errors::Error;
use crate::runtime::{self, JoinHandle};
use crate::transport::{Transport, TransportEvent};

type Result<T> = std::result::Result<T, Error>;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CAPACITY: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Publishes and subscribes through one broker connection.
///
/// Publishing is QoS 0 and never waits for the broker.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Prepares a connection for `identity`'s broker.
    ///
    /// Nothing connects until the returned [`MqttEvents`] task starts polling,
    /// which happens immediately in the background. Dropping the events
    /// stream stops the connection.
    pub fn new(identity: &BulbIdentity) -> (Self, MqttEvents) {
        let broker = identity.broker();
        let mut options = MqttOptions::new(identity.client_id(), &broker.host, broker.port);
        options.set_credentials(&broker.username, &broker.password);
        options.set_keep_alive(KEEP_ALIVE);

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (tx, rx) = mpsc::unbounded();
        let pump = runtime::spawn(poll_events(eventloop, tx));

        (MqttTransport { client }, MqttEvents { rx, pump })
    }
}

impl Transport for MqttTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| Error::transport("subscribe", e))
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .map_err(|e| Error::transport("publish", e))
    }
}

/// Connection events from an [`MqttTransport`].
pub struct MqttEvents {
    rx: UnboundedReceiver<TransportEvent>,
    pump: JoinHandle<()>,
}

impl Stream for MqttEvents {
    type Item = TransportEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

impl Drop for MqttEvents {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn poll_events(mut eventloop: EventLoop, events: UnboundedSender<TransportEvent>) {
    // None until the first connection attempt resolves
    let mut connected: Option<bool> = None;

    loop {
        let event = match eventloop.poll().await {
            Ok(event) => to_transport_event(event, &mut connected),
            Err(e) => {
                warn!("mqtt connection error: {}", e);
                if let Some(event) = connection_lost(&mut connected) {
                    if events.unbounded_send(event).is_err() {
                        break;
                    }
                }
                runtime::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        if let Some(event) = event {
            if events.unbounded_send(event).is_err() {
                break;
            }
        }
    }
    debug!("mqtt event receiver dropped, stopping");
}

/// Maps one client event to what the bulb cares about.
fn to_transport_event(event: Event, connected: &mut Option<bool>) -> Option<TransportEvent> {
    match event {
        Event::Incoming(Packet::ConnAck(ack)) if ack.code == ConnectReturnCode::Success => {
            info!("broker accepted connection");
            *connected = Some(true);
            Some(TransportEvent::Connected)
        }
        Event::Incoming(Packet::ConnAck(ack)) => {
            warn!("broker refused connection: {:?}", ack.code);
            None
        }
        Event::Incoming(Packet::Publish(publish)) => Some(TransportEvent::Message {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
        }),
        Event::Incoming(Packet::Disconnect) => connection_lost(connected),
        _ => None,
    }
}

/// `Disconnected` once per outage, however many errors follow.
fn connection_lost(connected: &mut Option<bool>) -> Option<TransportEvent> {
    let was_connected = *connected != Some(false);
    *connected = Some(false);
    was_connected.then_some(TransportEvent::Disconnected)
}

/// Creates a bulb on its own broker connection, starts its event pump and
/// subscribes to its topics.
///
/// A failed subscribe is logged and leaves the bulb unreachable; it
/// becomes reachable once the broker connection comes up.
pub async fn connect_bulb(identity: BulbIdentity) -> (Arc<Bulb<MqttTransport>>, JoinHandle<()>) {
    let (transport, events) = MqttTransport::new(&identity);
    let bulb = Arc::new(Bulb::new(identity, transport));
    let pump = bulb.listen(events);

    if let Err(e) = bulb.connect().await {
        info!("[{}] {}", bulb.name(), e);
    }
    (bulb, pump)
}
