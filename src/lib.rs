//! # techlife_rs
//!
//! An async Rust library for controlling TechLife Pro color/white bulbs over MQTT.
//!
//! TechLife bulbs speak a small proprietary binary protocol: every command is a
//! fixed 16-byte frame with an XOR checksum, published to a per-device MQTT
//! topic. This crate builds those frames, applies the bulb's visual correction
//! curves, and remembers what each bulb was last told to do so queries never
//! need a round trip.
//!
//! ## Quick Start
//!
//! ```ignore
//! use techlife_rs::{BulbConfig, mqtt};
//!
//! async fn control_light() -> Result<(), Box<dyn std::error::Error>> {
//!     let identity = BulbConfig::new("7c:b9:4c:57:6e:1f", "192.168.1.129").identity()?;
//!     let (bulb, _pump) = mqtt::connect_bulb(identity).await;
//!
//!     bulb.turn_on().await?;
//!     // Magenta at low intensity
//!     bulb.set_color(255, 0, 255, 10).await?;
//!     // Then white
//!     bulb.set_white(200).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Frame codec**: [`frame`] builds power, color and brightness frames
//! - **Correction curves**: [`curve`] maps `[0, 255]` intensities to protocol scale
//! - **State cache**: [`Bulb`] tracks power, mode, color and per-mode brightness
//! - **Handshake**: probes from the bulb are answered automatically
//! - **Pluggable transport**: anything implementing [`Transport`]; an in-memory
//!   [`MemoryTransport`] is included for tests
//! - **Diagnostics**: frame history and a JSON summary per bulb
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//! - `mqtt` (default): [`mqtt::MqttTransport`] on top of `rumqttc`; requires tokio

mod bulb;
mod config;
pub mod curve;
mod errors;
pub mod frame;
mod history;
#[cfg(feature = "mqtt")]
pub mod mqtt;
mod request;
pub mod runtime;
mod state;
mod transport;
mod types;

// Re-export public API
pub use bulb::Bulb;
pub use config::{BrokerAddress, BulbConfig, BulbIdentity, DEFAULT_BROKER_PORT};
pub use errors::Error;
pub use frame::CommandFrame;
pub use history::{HistoryEntry, HistorySummary, MessageHistory, MessageType};
pub use request::LightRequest;
pub use state::{BrightnessReading, BulbState, LightMode};
pub use transport::{MemoryTransport, Published, Transport, TransportEvent};
pub use types::{Color, PowerMode};
