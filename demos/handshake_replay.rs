//! Replay captured bulb traffic against an in-memory transport.
//!
//! This example demonstrates:
//! - Building command frames for a few typical requests
//! - The bulb answering a handshake probe
//!
//! Run with: cargo run --example handshake_replay

use techlife_rs::{Bulb, BulbConfig, MemoryTransport, TransportEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let identity = BulbConfig::new("7c:b9:4c:57:6e:1f", "127.0.0.1").identity()?;
    let probe_topic = identity.command_topic();
    let bulb = Bulb::new(identity, MemoryTransport::new());

    bulb.connect().await?;
    bulb.turn_on().await?;
    bulb.set_color(255, 0, 255, 10).await?;
    bulb.set_color(255, 255, 255, 200).await?;
    bulb.set_white(5).await?;

    // The bulb probes with FC F0 on its command topic
    bulb.handle_event(TransportEvent::message(&probe_topic, &[0xFC, 0xF0, 0x00, 0x01]))
        .await?;

    for entry in bulb.history().entries() {
        println!("{:?} {:<28} {}", entry.msg_type, entry.topic, entry.payload);
    }

    println!("\nState: {:?}", bulb.state());
    Ok(())
}
