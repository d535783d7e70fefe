//! Individual bulb control.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::config::BulbIdentity;
use crate::curve;
use crate::errors::Error;
use crate::frame::{self, ACK_REPLY, CommandFrame};
use crate::history::{MessageHistory, MessageType};
use crate::request::LightRequest;
use crate::runtime::{self, JoinHandle};
use crate::state::{BrightnessReading, BulbState, LightMode};
use crate::transport::{Transport, TransportEvent};
use crate::types::{Color, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// A single TechLife bulb reached through a [`Transport`].
///
/// The bulb keeps the last state it was commanded into, so queries never
/// need a round trip. State is updated before each frame is sent and is not
/// rolled back if publishing fails; check [`Bulb::is_reachable`] first when
/// that matters.
///
/// # Example
///
/// ```
/// use techlife_rs::{Bulb, BulbConfig, LightMode, MemoryTransport};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let identity = BulbConfig::new("7c:b9:4c:57:6e:1f", "192.168.1.129").identity()?;
/// let bulb = Bulb::new(identity, MemoryTransport::new());
///
/// bulb.connect().await?;
/// bulb.turn_on().await?;
/// bulb.set_white(5).await?;
/// assert_eq!(bulb.current_mode(), LightMode::White);
/// assert_eq!(bulb.current_brightness().value, 5);
/// # Ok::<(), techlife_rs::Error>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct Bulb<T> {
    identity: BulbIdentity,
    transport: T,
    state: Mutex<BulbState>,
    // Held across "update state, publish" so frames leave in state order.
    outbound: runtime::Mutex<()>,
    history: Mutex<MessageHistory>,
}

impl<T: Transport> Bulb<T> {
    /// Create a bulb in its default state. No I/O happens until
    /// [`Bulb::connect`].
    pub fn new(identity: BulbIdentity, transport: T) -> Self {
        Bulb {
            identity,
            transport,
            state: Mutex::new(BulbState::default()),
            outbound: runtime::Mutex::new(()),
            history: Mutex::new(MessageHistory::new()),
        }
    }

    pub fn identity(&self) -> &BulbIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribes to the bulb's topic pair.
    ///
    /// On failure the bulb is marked unreachable and the error is returned;
    /// the bulb stays usable and `connect` may be retried.
    pub async fn connect(&self) -> Result<()> {
        info!("[{}] connecting to {}", self.name(), self.identity.broker().host);
        self.subscribe_topics().await?;
        self.with_state(|s| s.reachable = true);
        Ok(())
    }

    /// Feeds one transport event into the bulb.
    ///
    /// A handshake probe on the command topic is answered with the fixed
    /// acknowledgement on the device topic. Other messages are only logged.
    pub async fn handle_event(&self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Connected => {
                info!("[{}] connected", self.name());
                self.with_state(|s| s.reachable = true);
                self.subscribe_topics().await
            }
            TransportEvent::Disconnected => {
                info!("[{}] disconnected", self.name());
                self.with_state(|s| s.reachable = false);
                Ok(())
            }
            TransportEvent::Message { topic, payload } => {
                debug!(
                    "[{}] message on {}: {}",
                    self.name(),
                    topic,
                    frame::to_hex(&payload)
                );
                self.with_history(|h| h.record(MessageType::Receive, &topic, &payload));

                if topic == self.identity.command_topic() && frame::is_handshake_probe(&payload) {
                    let device_topic = self.identity.device_topic();
                    self.publish(MessageType::Ack, &device_topic, &ACK_REPLY)
                        .await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Pumps `events` into [`Bulb::handle_event`] on a background task until
    /// the stream ends. Failures are logged and do not stop the pump.
    pub fn listen<S>(self: &Arc<Self>, mut events: S) -> JoinHandle<()>
    where
        T: 'static,
        S: Stream<Item = TransportEvent> + Send + Unpin + 'static,
    {
        let bulb = Arc::clone(self);
        runtime::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = bulb.handle_event(event).await {
                    warn!("[{}] failed to handle event: {}", bulb.name(), e);
                }
            }
            debug!("[{}] event stream closed", bulb.name());
        })
    }

    pub async fn turn_on(&self) -> Result<()> {
        self.set_power(PowerMode::On).await
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.set_power(PowerMode::Off).await
    }

    /// Sends the power frame. Repeating the current state still sends it.
    pub async fn set_power(&self, power: PowerMode) -> Result<()> {
        let _order = self.outbound.lock().await;
        self.send_power(power).await
    }

    /// Sets an RGB color at the given intensity, all in `[0, 255]`.
    ///
    /// The intensity goes through [`curve::color_alpha`] and each channel is
    /// scaled by the result. State keeps the raw input, not the scaled values.
    pub async fn set_color(&self, red: u8, green: u8, blue: u8, intensity: u8) -> Result<()> {
        let _order = self.outbound.lock().await;
        self.send_color(Color::rgb(red, green, blue), intensity)
            .await
    }

    /// Switches to white mode at the given intensity in `[0, 255]`.
    pub async fn set_white(&self, intensity: u8) -> Result<()> {
        let _order = self.outbound.lock().await;
        self.send_white(intensity).await
    }

    /// Changes brightness in whichever mode is active, keeping the stored
    /// color in color mode.
    pub async fn set_brightness(&self, brightness: u8) -> Result<()> {
        let _order = self.outbound.lock().await;
        let (mode, rgb) = self.with_state(|s| (s.mode, s.rgb));
        match mode {
            LightMode::Color => self.send_color(rgb, brightness).await,
            LightMode::White => self.send_white(brightness).await,
        }
    }

    /// Turns the bulb on if needed, then applies `request` on top of the
    /// last known state.
    pub async fn apply(&self, request: &LightRequest) -> Result<()> {
        debug!("[{}] apply {:?}", self.name(), request);
        let _order = self.outbound.lock().await;
        if !self.is_on() {
            self.send_power(PowerMode::On).await?;
        }

        let (mode, stored_rgb) = self.with_state(|s| (s.mode, s.rgb));
        let mut white_mode = mode == LightMode::White;
        let mut brightness = request
            .brightness
            .unwrap_or_else(|| self.current_brightness().value);

        let color = match request.color {
            Some(color) => {
                white_mode = false;
                color
            }
            None => stored_rgb,
        };

        if let Some(white) = request.white {
            brightness = white;
            white_mode = true;
        }

        if white_mode {
            self.send_white(brightness).await
        } else {
            self.send_color(color, brightness).await
        }
    }

    /// Brightness of the active mode, or zero with `available == false`
    /// while the bulb is unreachable.
    pub fn current_brightness(&self) -> BrightnessReading {
        let reading = self.with_state(|s| s.brightness());
        if !reading.available {
            warn!("[{}] light not available, cant get brightness", self.name());
        }
        reading
    }

    pub fn current_mode(&self) -> LightMode {
        self.with_state(|s| s.mode)
    }

    pub fn is_color_mode(&self) -> bool {
        self.current_mode() == LightMode::Color
    }

    pub fn is_reachable(&self) -> bool {
        self.with_state(|s| s.reachable)
    }

    pub fn is_on(&self) -> bool {
        self.with_state(|s| s.power)
    }

    /// Last requested color, before intensity scaling.
    pub fn rgb(&self) -> Color {
        self.with_state(|s| s.rgb)
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> BulbState {
        self.with_state(|s| s.clone())
    }

    pub fn history(&self) -> MessageHistory {
        self.with_history(|h| h.clone())
    }

    pub fn clear_history(&self) {
        self.with_history(MessageHistory::clear);
    }

    /// Returns diagnostics including identity, state, and history.
    pub fn diagnostics(&self) -> Value {
        let broker = self.identity.broker();
        let state = self.state();
        let summary = self.with_history(|h| h.summary());

        json!({
            "name": self.identity.name(),
            "unique_id": self.identity.unique_id(),
            "mac": self.identity.mac(),
            "broker": format!("{}:{}", broker.host, broker.port),
            "state": serde_json::to_value(&state).unwrap_or(Value::Null),
            "history": serde_json::to_value(summary).unwrap_or(Value::Null),
        })
    }

    async fn subscribe_topics(&self) -> Result<()> {
        for topic in [self.identity.device_topic(), self.identity.command_topic()] {
            if let Err(e) = self.transport.subscribe(&topic).await {
                warn!("[{}] subscribe to {} failed: {}", self.name(), topic, e);
                self.with_state(|s| s.reachable = false);
                self.with_history(|h| h.record_error(&e.to_string()));
                return Err(Error::connect(&topic, &e));
            }
            debug!("[{}] subscribed to {}", self.name(), topic);
        }
        Ok(())
    }

    // The send_* helpers expect the caller to hold `outbound`.

    async fn send_power(&self, power: PowerMode) -> Result<()> {
        let frame = match power {
            PowerMode::On => frame::power_on_frame(),
            PowerMode::Off => frame::power_off_frame(),
        };
        self.with_state(|s| s.power = power.into());
        self.send(&frame).await
    }

    async fn send_color(&self, color: Color, intensity: u8) -> Result<()> {
        let alpha = curve::color_alpha(intensity);
        let [r, g, b] = color.channels().map(|c| curve::scale_channel(c, alpha));
        debug!(
            "[{}] color r: {} g: {} b: {} alpha: {}",
            self.name(),
            r,
            g,
            b,
            alpha
        );
        let frame = frame::color_frame(r, g, b, alpha)?;
        self.with_state(|s| s.apply_color(color, intensity));
        self.send(&frame).await
    }

    async fn send_white(&self, intensity: u8) -> Result<()> {
        let value = curve::white_level(intensity);
        debug!("[{}] white {} -> {}", self.name(), intensity, value);
        let frame = frame::brightness_frame(value)?;
        self.with_state(|s| s.apply_white(intensity));
        self.send(&frame).await
    }

    async fn send(&self, frame: &CommandFrame) -> Result<()> {
        let topic = self.identity.command_topic();
        self.publish(MessageType::Send, &topic, frame.as_ref())
            .await
    }

    async fn publish(&self, kind: MessageType, topic: &str, payload: &[u8]) -> Result<()> {
        debug!(
            "[{}] publishing {} on {}",
            self.name(),
            frame::to_hex(payload),
            topic
        );
        match self.transport.publish(topic, payload).await {
            Ok(()) => {
                self.with_history(|h| h.record(kind, topic, payload));
                Ok(())
            }
            Err(e) => {
                warn!("[{}] publish on {} failed: {}", self.name(), topic, e);
                self.with_history(|h| h.record_error(&e.to_string()));
                Err(Error::publish(topic, &e))
            }
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut BulbState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    fn with_history<R>(&self, f: impl FnOnce(&mut MessageHistory) -> R) -> R {
        f(&mut lock(&self.history))
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulbConfig;
    use crate::transport::{MemoryTransport, Published};

    const MAC: &str = "7c:b9:4c:57:6e:1f";

    fn bulb() -> Bulb<MemoryTransport> {
        let identity = BulbConfig::new(MAC, "192.168.1.129").identity().unwrap();
        Bulb::new(identity, MemoryTransport::new())
    }

    fn sent(bulb: &Bulb<MemoryTransport>) -> Vec<Vec<u8>> {
        bulb.transport()
            .take_published()
            .into_iter()
            .map(|p| {
                assert_eq!(p.topic, format!("dev_sub_{MAC}"));
                p.payload
            })
            .collect()
    }

    fn xor_payload(bytes: &[u8]) -> u8 {
        bytes[1..14].iter().fold(0, |acc, b| acc ^ b)
    }

    #[tokio::test]
    async fn test_connect_subscribes_topic_pair() {
        let bulb = bulb();
        bulb.connect().await.unwrap();
        assert_eq!(
            bulb.transport().subscriptions(),
            vec![format!("dev_pub_{MAC}"), format!("dev_sub_{MAC}")]
        );
        assert!(bulb.is_reachable());
    }

    #[tokio::test]
    async fn test_connect_failure_is_recoverable() {
        let bulb = bulb();
        bulb.transport().set_online(false);

        let err = bulb.connect().await.unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
        assert!(err.is_recoverable());
        assert!(!bulb.is_reachable());

        bulb.transport().set_online(true);
        bulb.connect().await.unwrap();
        assert!(bulb.is_reachable());
    }

    #[tokio::test]
    async fn test_power_frames() {
        let bulb = bulb();
        bulb.turn_on().await.unwrap();
        assert!(bulb.is_on());
        bulb.turn_off().await.unwrap();
        assert!(!bulb.is_on());
        // repeated commands are sent again
        bulb.turn_off().await.unwrap();

        let frames = sent(&bulb);
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0],
            vec![0xFA, 0x23, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x23, 0xFB]
        );
        assert_eq!(
            frames[1],
            vec![0xFA, 0x24, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x24, 0xFB]
        );
        assert_eq!(frames[1], frames[2]);
    }

    #[tokio::test]
    async fn test_low_intensity_color() {
        let bulb = bulb();
        bulb.set_color(255, 0, 255, 10).await.unwrap();

        let frame = &sent(&bulb)[0];
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[1..7], &[22, 0, 0, 0, 22, 0]);
        assert_eq!(frame[11], 22);
        assert_eq!(frame[14], xor_payload(frame));

        assert_eq!(bulb.rgb(), Color::rgb(255, 0, 255));
        assert_eq!(bulb.current_brightness().value, 10);
        assert_eq!(bulb.current_mode(), LightMode::Color);
    }

    #[tokio::test]
    async fn test_high_intensity_color() {
        let bulb = bulb();
        bulb.set_color(255, 255, 255, 200).await.unwrap();

        let frame = &sent(&bulb)[0];
        assert_eq!(&frame[1..7], &[0x9E, 0x1E, 0x9E, 0x1E, 0x9E, 0x1E]);
        assert_eq!(frame[14], xor_payload(frame));
    }

    #[tokio::test]
    async fn test_dim_channels_stay_visible() {
        let bulb = bulb();
        bulb.set_color(1, 0, 3, 1).await.unwrap();

        let frame = &sent(&bulb)[0];
        assert_eq!(&frame[1..7], &[16, 0, 0, 0, 16, 0]);
        assert_eq!(frame[11], 13);
    }

    #[tokio::test]
    async fn test_white_mode() {
        let bulb = bulb();
        bulb.set_white(5).await.unwrap();

        let frame = &sent(&bulb)[0];
        assert_eq!(&frame[7..9], &[0x14, 0x00]);
        assert_eq!(frame[13], 0xF0);
        assert_eq!(frame[14], xor_payload(frame));
        assert_eq!(bulb.current_mode(), LightMode::White);
        assert!(!bulb.is_color_mode());
    }

    #[tokio::test]
    async fn test_brightness_follows_mode() {
        let bulb = bulb();
        bulb.set_color(10, 20, 30, 80).await.unwrap();
        bulb.set_white(150).await.unwrap();
        assert_eq!(bulb.current_brightness().value, 150);
        // color survives white mode
        assert_eq!(bulb.rgb(), Color::rgb(10, 20, 30));

        bulb.set_color(10, 20, 30, 60).await.unwrap();
        assert_eq!(bulb.current_brightness().value, 60);
        assert_eq!(bulb.state().white_brightness(), 150);
    }

    #[tokio::test]
    async fn test_unreachable_brightness() {
        let bulb = bulb();
        bulb.set_white(90).await.unwrap();
        bulb.handle_event(TransportEvent::Disconnected).await.unwrap();

        let reading = bulb.current_brightness();
        assert_eq!(reading.value, 0);
        assert!(!reading.available);
        assert!(!bulb.is_reachable());
        assert_eq!(bulb.state().white_brightness(), 90);
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_state() {
        let bulb = bulb();
        bulb.transport().set_online(false);

        let err = bulb.set_color(0, 255, 0, 100).await.unwrap_err();
        assert!(matches!(err, Error::Publish { .. }));
        assert_eq!(bulb.rgb(), Color::rgb(0, 255, 0));
        assert_eq!(bulb.state().color_brightness(), 100);
        assert_eq!(
            bulb.history().last_error(),
            Some("transport publish error: transport offline")
        );
    }

    #[tokio::test]
    async fn test_set_brightness_in_each_mode() {
        let bulb = bulb();
        bulb.set_color(255, 0, 0, 255).await.unwrap();
        bulb.set_brightness(10).await.unwrap();
        assert_eq!(bulb.rgb(), Color::rgb(255, 0, 0));
        assert_eq!(bulb.current_brightness().value, 10);

        bulb.set_white(200).await.unwrap();
        bulb.set_brightness(20).await.unwrap();
        assert_eq!(bulb.current_mode(), LightMode::White);
        assert_eq!(bulb.current_brightness().value, 20);

        let frames = sent(&bulb);
        assert_eq!(frames.len(), 4);
        assert_eq!(&frames[1][1..3], &[22, 0]);
        assert_eq!(&frames[3][7..9], &[80, 0]);
    }

    #[tokio::test]
    async fn test_set_brightness_reads_color_after_queued_writes() {
        let bulb = Arc::new(bulb());
        bulb.set_color(255, 0, 0, 200).await.unwrap();
        bulb.transport().take_published();

        let order = bulb.outbound.lock().await;
        let task = tokio::spawn({
            let bulb = Arc::clone(&bulb);
            async move { bulb.set_brightness(10).await }
        });
        // let the task queue up behind the held lock
        tokio::task::yield_now().await;
        // a color committed while the brightness change is waiting
        bulb.with_state(|s| s.apply_color(Color::rgb(0, 0, 255), 200));
        drop(order);
        task.await.unwrap().unwrap();

        assert_eq!(bulb.rgb(), Color::rgb(0, 0, 255));
        assert_eq!(bulb.current_brightness().value, 10);
        let frames = sent(&bulb);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][1..7], &[0, 0, 0, 0, 22, 0]);
    }

    #[tokio::test]
    async fn test_apply_reads_state_after_queued_writes() {
        let bulb = Arc::new(bulb());
        bulb.turn_on().await.unwrap();
        bulb.set_color(255, 0, 0, 200).await.unwrap();
        bulb.transport().take_published();

        let order = bulb.outbound.lock().await;
        let task = tokio::spawn({
            let bulb = Arc::clone(&bulb);
            async move {
                let mut request = LightRequest::new();
                request.brightness(10);
                bulb.apply(&request).await
            }
        });
        tokio::task::yield_now().await;
        bulb.with_state(|s| s.apply_white(90));
        drop(order);
        task.await.unwrap().unwrap();

        assert_eq!(bulb.current_mode(), LightMode::White);
        assert_eq!(bulb.current_brightness().value, 10);
        let frames = sent(&bulb);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][13], 0xF0);
    }

    #[tokio::test]
    async fn test_apply_turns_on_and_keeps_mode() {
        let bulb = bulb();
        bulb.set_white(100).await.unwrap();
        bulb.transport().take_published();

        let mut request = LightRequest::new();
        request.brightness(50);
        bulb.apply(&request).await.unwrap();

        let frames = sent(&bulb);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][1], 0x23);
        assert_eq!(&frames[1][7..9], &[200, 0]);
        assert!(bulb.is_on());
        assert_eq!(bulb.current_mode(), LightMode::White);
        assert_eq!(bulb.current_brightness().value, 50);
    }

    #[tokio::test]
    async fn test_apply_color_and_white_precedence() {
        let bulb = bulb();
        bulb.turn_on().await.unwrap();
        bulb.set_white(30).await.unwrap();

        bulb.apply(&LightRequest::from(&Color::rgb(0, 0, 255)))
            .await
            .unwrap();
        assert_eq!(bulb.current_mode(), LightMode::Color);
        assert_eq!(bulb.rgb(), Color::rgb(0, 0, 255));
        // brightness carried over from the white setting
        assert_eq!(bulb.current_brightness().value, 30);

        let mut request = LightRequest::new();
        request.color(&Color::rgb(255, 0, 0));
        request.white(70);
        bulb.apply(&request).await.unwrap();
        assert_eq!(bulb.current_mode(), LightMode::White);
        assert_eq!(bulb.current_brightness().value, 70);
        assert_eq!(bulb.rgb(), Color::rgb(0, 0, 255));
    }

    #[tokio::test]
    async fn test_handshake_probe_is_acknowledged() {
        let bulb = bulb();
        let probe = TransportEvent::message(&format!("dev_sub_{MAC}"), &[0xFC, 0xF0, 0x00]);
        bulb.handle_event(probe).await.unwrap();

        assert_eq!(
            bulb.transport().take_published(),
            vec![Published {
                topic: format!("dev_pub_{MAC}"),
                payload: ACK_REPLY.to_vec(),
            }]
        );
        assert_eq!(bulb.history().summary().ack_count, 1);
    }

    #[tokio::test]
    async fn test_other_messages_are_ignored() {
        let bulb = bulb();
        let before = bulb.state();
        for event in [
            TransportEvent::message(&format!("dev_pub_{MAC}"), &[0xFC, 0xF0]),
            TransportEvent::message(&format!("dev_sub_{MAC}"), &[0xFC]),
            TransportEvent::message(&format!("dev_sub_{MAC}"), &[0x28, 0x00]),
            TransportEvent::message(&format!("dev_sub_{MAC}"), &[]),
        ] {
            bulb.handle_event(event).await.unwrap();
        }
        assert!(bulb.transport().published().is_empty());
        assert_eq!(bulb.state(), before);
        assert_eq!(bulb.history().summary().receive_count, 4);
    }

    #[tokio::test]
    async fn test_reconnect_resubscribes() {
        let bulb = bulb();
        bulb.handle_event(TransportEvent::Disconnected).await.unwrap();
        bulb.handle_event(TransportEvent::Connected).await.unwrap();
        assert!(bulb.is_reachable());
        assert_eq!(bulb.transport().subscriptions().len(), 2);
    }

    #[tokio::test]
    async fn test_listen_pumps_events() {
        let bulb = Arc::new(bulb());
        let (tx, rx) = futures::channel::mpsc::unbounded();
        let handle = bulb.listen(rx);

        tx.unbounded_send(TransportEvent::Connected).unwrap();
        tx.unbounded_send(TransportEvent::message(
            &format!("dev_sub_{MAC}"),
            &[0xFC, 0xF0],
        ))
        .unwrap();
        tx.unbounded_send(TransportEvent::Disconnected).unwrap();
        drop(tx);

        assert_eq!(handle.await, Some(()));
        assert!(!bulb.is_reachable());
        assert_eq!(bulb.transport().published().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commands_stay_ordered() {
        let bulb = Arc::new(bulb());
        let tasks: Vec<_> = (0..32u8)
            .map(|i| {
                let bulb = Arc::clone(&bulb);
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        bulb.set_color(i, 255 - i, 7, i.wrapping_mul(7)).await
                    } else {
                        bulb.set_white(i).await
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let frames = sent(&bulb);
        assert_eq!(frames.len(), 32);

        // the last frame on the wire matches the final state
        let state = bulb.state();
        let expected = match state.mode() {
            LightMode::Color => {
                let alpha = curve::color_alpha(state.color_brightness());
                let [r, g, b] = state.rgb().channels().map(|c| curve::scale_channel(c, alpha));
                frame::color_frame(r, g, b, alpha).unwrap()
            }
            LightMode::White => {
                frame::brightness_frame(curve::white_level(state.white_brightness())).unwrap()
            }
        };
        assert_eq!(frames.last().unwrap().as_slice(), expected.as_ref());
    }

    #[test]
    fn test_diagnostics() {
        let bulb = bulb();
        let diag = bulb.diagnostics();
        assert_eq!(diag["name"], format!("light_{MAC}"));
        assert_eq!(diag["broker"], "192.168.1.129:1883");
        assert_eq!(diag["state"]["mode"], "Color");
        assert_eq!(diag["history"]["send_count"], 0);
    }
}
