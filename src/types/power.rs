//! Power mode for light control.

use serde::{Deserialize, Serialize};

/// Power state for a light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl From<bool> for PowerMode {
    fn from(on: bool) -> Self {
        if on { PowerMode::On } else { PowerMode::Off }
    }
}

impl From<PowerMode> for bool {
    fn from(power: PowerMode) -> Self {
        matches!(power, PowerMode::On)
    }
}
