//! Byte-channel abstraction between the bulb controller and the broker.
//!
//! The controller only needs to publish raw frames and subscribe to the
//! bulb's two topics. Everything the broker delivers back arrives as a
//! [`TransportEvent`], handed to [`Bulb::handle_event`](crate::Bulb::handle_event)
//! directly or through [`Bulb::listen`](crate::Bulb::listen).

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Outbound side of a broker connection.
///
/// Publishing is fire-and-forget: an `Ok` means the frame was handed to the
/// transport, not that the bulb received it. Implementations shared between
/// bulbs must tolerate concurrent calls.
pub trait Transport: Send + Sync {
    /// Subscribe to a topic.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<()>> + Send;

    /// Publish a payload on a topic.
    fn publish(&self, topic: &str, payload: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).subscribe(topic)
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> impl Future<Output = Result<()>> + Send {
        (**self).publish(topic, payload)
    }
}

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The broker acknowledged the connection
    Connected,
    /// The connection to the broker was lost
    Disconnected,
    /// A message arrived on a subscribed topic
    Message { topic: String, payload: Vec<u8> },
}

impl TransportEvent {
    pub fn message(topic: &str, payload: &[u8]) -> Self {
        TransportEvent::Message {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        }
    }
}

/// A frame handed to a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug)]
struct MemoryInner {
    online: bool,
    subscriptions: Vec<String>,
    published: Vec<Published>,
}

/// In-process transport that records everything sent through it.
///
/// Useful for tests and for replaying captured traffic. While offline, every
/// call fails the way a dropped broker connection would.
///
/// ```
/// use techlife_rs::{MemoryTransport, Transport};
///
/// # tokio_test_block(async {
/// let transport = MemoryTransport::new();
/// transport.publish("dev_sub_aa", &[0xFA]).await.unwrap();
/// assert_eq!(transport.published()[0].payload, vec![0xFA]);
///
/// transport.set_online(false);
/// assert!(transport.publish("dev_sub_aa", &[0xFA]).await.is_err());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    inner: Mutex<MemoryInner>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport {
            inner: Mutex::new(MemoryInner {
                online: true,
                subscriptions: Vec::new(),
                published: Vec::new(),
            }),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.lock().online = online;
    }

    pub fn is_online(&self) -> bool {
        self.lock().online
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.lock().subscriptions.clone()
    }

    pub fn published(&self) -> Vec<Published> {
        self.lock().published.clone()
    }

    /// Returns and forgets everything published so far.
    pub fn take_published(&self) -> Vec<Published> {
        std::mem::take(&mut self.lock().published)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.online {
            return Err(Error::transport("subscribe", "transport offline"));
        }
        if !inner.subscriptions.iter().any(|t| t == topic) {
            inner.subscriptions.push(topic.to_string());
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if !inner.online {
            return Err(Error::transport("publish", "transport offline"));
        }
        inner.published.push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
