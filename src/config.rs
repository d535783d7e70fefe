//! Bulb configuration and identity.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_USERNAME: &str = "user";
const DEFAULT_PASSWORD: &str = "passwd";

/// Default MQTT broker port.
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// User-facing configuration for one bulb.
///
/// ```
/// use techlife_rs::BulbConfig;
///
/// let config = BulbConfig::from_json(
///     r#"{"mac_address": "7c:b9:4c:57:6e:1f", "broker_url": "192.168.1.129"}"#,
/// ).unwrap();
/// let identity = config.identity().unwrap();
/// assert_eq!(identity.name(), "light_7c:b9:4c:57:6e:1f");
/// assert_eq!(identity.command_topic(), "dev_sub_7c:b9:4c:57:6e:1f");
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BulbConfig {
    pub mac_address: String,
    /// Broker host, optionally followed by `:port`
    pub broker_url: String,
    #[serde(default = "default_username")]
    pub broker_username: String,
    #[serde(default = "default_password")]
    pub broker_password: String,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

impl BulbConfig {
    pub fn new(mac_address: &str, broker_url: &str) -> Self {
        BulbConfig {
            mac_address: mac_address.to_string(),
            broker_url: broker_url.to_string(),
            broker_username: default_username(),
            broker_password: default_password(),
            unique_id: None,
            name: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    /// Validates the configuration and resolves defaults.
    pub fn identity(&self) -> Result<BulbIdentity> {
        let mac = self.mac_address.trim();
        if mac.is_empty() {
            return Err(Error::InvalidConfig("mac_address is empty".into()));
        }

        let (host, port) = split_broker_url(self.broker_url.trim())?;

        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("light_{mac}"),
        };
        let unique_id = self
            .unique_id
            .clone()
            .unwrap_or_else(|| format!("tl_{host}_{mac}"));

        Ok(BulbIdentity {
            broker: BrokerAddress {
                host,
                port,
                username: self.broker_username.clone(),
                password: self.broker_password.clone(),
            },
            mac: mac.to_string(),
            name,
            unique_id,
        })
    }
}

fn split_broker_url(url: &str) -> Result<(String, u16)> {
    if url.is_empty() {
        return Err(Error::InvalidConfig("broker_url is empty".into()));
    }
    // "[addr]" or "[addr]:port" for IPv6 hosts
    if let Some(rest) = url.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .filter(|(host, _)| !host.is_empty())
            .ok_or_else(|| Error::InvalidConfig(format!("invalid broker host in {url}")))?;
        return match tail.strip_prefix(':') {
            Some(port) => Ok((host.to_string(), parse_port(port, url)?)),
            None if tail.is_empty() => Ok((host.to_string(), DEFAULT_BROKER_PORT)),
            None => Err(Error::InvalidConfig(format!("invalid broker host in {url}"))),
        };
    }

    match url.rsplit_once(':') {
        // a second ':' means a bare IPv6 address, which carries no port
        Some((host, port)) if !host.is_empty() && !host.contains(':') => {
            Ok((host.to_string(), parse_port(port, url)?))
        }
        _ => Ok((url.to_string(), DEFAULT_BROKER_PORT)),
    }
}

fn parse_port(port: &str, url: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid broker port in {url}")))
}

/// Broker endpoint and credentials.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Immutable identity of a bulb. Topic names derive from the MAC.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BulbIdentity {
    broker: BrokerAddress,
    mac: String,
    name: String,
    unique_id: String,
}

impl BulbIdentity {
    pub fn broker(&self) -> &BrokerAddress {
        &self.broker
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn client_id(&self) -> String {
        format!("clientid{}", self.mac)
    }

    /// Topic the bulb publishes on; handshake acks are sent here.
    pub fn device_topic(&self) -> String {
        format!("dev_pub_{}", self.mac)
    }

    /// Topic the bulb listens on; commands are sent here.
    pub fn command_topic(&self) -> String {
        format!("dev_sub_{}", self.mac)
    }
}
