use std::fmt::Display;

/// All error types that can occur when driving a TechLife bulb.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Subscribing to the bulb's topics failed. The bulb stays usable and
    /// `connect` may be retried.
    #[error("failed to connect on topic {topic}: {reason}")]
    Connect { topic: String, reason: String },

    /// A value was outside the range the protocol accepts. Nothing was
    /// mutated or sent.
    #[error("invalid argument {name}={value}; expected at most {max}")]
    InvalidArgument {
        name: &'static str,
        value: u32,
        max: u32,
    },

    /// The transport failed to send a frame. Bulb state was already updated.
    #[error("failed to publish on topic {topic}: {reason}")]
    Publish { topic: String, reason: String },

    /// A transport operation failed.
    #[error("transport {action} error: {reason}")]
    Transport { action: String, reason: String },

    /// The bulb configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),
}

impl Error {
    /// Create a new transport error
    pub fn transport(action: &str, reason: impl Display) -> Self {
        Error::Transport {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(name: &'static str, value: impl Into<u32>, max: impl Into<u32>) -> Self {
        Error::InvalidArgument {
            name,
            value: value.into(),
            max: max.into(),
        }
    }

    pub(crate) fn connect(topic: &str, err: &Error) -> Self {
        Error::Connect {
            topic: topic.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn publish(topic: &str, err: &Error) -> Self {
        Error::Publish {
            topic: topic.to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether the bulb may recover from this error by retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Connect { .. } | Error::Publish { .. } | Error::Transport { .. }
        )
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
