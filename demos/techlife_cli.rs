//! CLI application for controlling a TechLife bulb.
//!
//! This example drives one bulb through an MQTT broker the bulb has been
//! pointed at.
//!
//! Run with: cargo run --example techlife_cli -- --help

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use techlife_rs::{BulbConfig, Color, LightRequest, mqtt};

#[derive(Parser)]
#[command(name = "techlife-cli")]
#[command(about = "Control a TechLife Pro bulb from the command line", long_about = None)]
struct Cli {
    /// JSON config file (mac_address, broker_url, ...); overrides the flags below
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// MAC address of the bulb
    #[arg(short, long, global = true)]
    mac: Option<String>,

    /// MQTT broker host, optionally with :port
    #[arg(short, long, global = true)]
    broker: Option<String>,

    /// Broker username
    #[arg(long, global = true, default_value = "user")]
    username: String,

    /// Broker password
    #[arg(long, global = true, default_value = "passwd")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the bulb on
    On,

    /// Turn the bulb off
    Off,

    /// Set RGB color and intensity (0-255 each)
    Color {
        /// Red component (0-255)
        red: u8,
        /// Green component (0-255)
        green: u8,
        /// Blue component (0-255)
        blue: u8,
        /// Intensity (0-255)
        #[arg(default_value = "255")]
        intensity: u8,
    },

    /// Switch to white at the given intensity (0-255)
    White {
        /// Intensity (0-255)
        intensity: u8,
    },

    /// Turn on, optionally changing color, brightness or white
    Set {
        /// Color as r,g,b
        #[arg(long)]
        color: Option<Color>,
        /// Brightness (0-255)
        #[arg(long)]
        brightness: Option<u8>,
        /// White intensity (0-255); forces white mode
        #[arg(long)]
        white: Option<u8>,
    },

    /// Stay connected, answering handshakes and printing state changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BulbConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => {
            let mac = cli.mac.as_deref().ok_or("--mac is required without --config")?;
            let broker = cli
                .broker
                .as_deref()
                .ok_or("--broker is required without --config")?;
            let mut config = BulbConfig::new(mac, broker);
            config.broker_username = cli.username.clone();
            config.broker_password = cli.password.clone();
            config
        }
    };
    let identity = config.identity()?;

    println!(
        "Connecting to {} via {}:{}...",
        identity.name(),
        identity.broker().host,
        identity.broker().port
    );
    let (bulb, pump) = mqtt::connect_bulb(identity).await;

    let result = match cli.command {
        Commands::On => bulb.turn_on().await,
        Commands::Off => bulb.turn_off().await,
        Commands::Color {
            red,
            green,
            blue,
            intensity,
        } => {
            println!(
                "Setting color to RGB({}, {}, {}) at intensity {}...",
                red, green, blue, intensity
            );
            bulb.set_color(red, green, blue, intensity).await
        }
        Commands::White { intensity } => {
            println!("Setting white at intensity {}...", intensity);
            bulb.set_white(intensity).await
        }
        Commands::Set {
            color,
            brightness,
            white,
        } => {
            let mut request = LightRequest::new();
            if let Some(color) = &color {
                request.color(color);
            }
            if let Some(brightness) = brightness {
                request.brightness(brightness);
            }
            if let Some(white) = white {
                request.white(white);
            }
            bulb.apply(&request).await
        }
        Commands::Watch => {
            println!("Watching... (Press Ctrl+C to stop)\n");
            let mut last = bulb.state();
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let state = bulb.state();
                if state != last {
                    println!("{}", serde_json::to_string(&state)?);
                    last = state;
                }
            }
        }
    };

    match result {
        Ok(()) => println!("Done"),
        Err(e) => eprintln!("Error: {}", e),
    }

    // Publishing is fire-and-forget; give the connection time to flush.
    tokio::time::sleep(Duration::from_millis(500)).await;
    println!(
        "\nDiagnostics:\n{}",
        serde_json::to_string_pretty(&bulb.diagnostics())?
    );
    pump.abort();
    Ok(())
}
