//! Last-known bulb state.
//!
//! The protocol has no query command, so this is an optimistic cache of what
//! was last commanded, not state confirmed by the hardware.

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Which brightness channel of the bulb is authoritative.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    /// RGB output, brightness from the color intensity
    #[default]
    Color,
    /// White output, brightness from the white intensity
    White,
}

/// Result of a brightness query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessReading {
    /// Brightness in `[0, 255]`; zero when the bulb is unavailable
    pub value: u8,
    /// Whether the bulb was reachable when queried
    pub available: bool,
}

/// Tracks the last commanded settings for a bulb.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BulbState {
    pub(crate) reachable: bool,
    pub(crate) power: bool,
    pub(crate) mode: LightMode,
    pub(crate) rgb: Color,
    pub(crate) color_brightness: u8,
    pub(crate) white_brightness: u8,
}

impl Default for BulbState {
    fn default() -> Self {
        BulbState {
            reachable: true,
            power: false,
            mode: LightMode::Color,
            rgb: Color::rgb(255, 255, 255),
            color_brightness: 255,
            white_brightness: 255,
        }
    }
}

impl BulbState {
    pub fn reachable(&self) -> bool {
        self.reachable
    }

    pub fn power(&self) -> bool {
        self.power
    }

    pub fn mode(&self) -> LightMode {
        self.mode
    }

    /// Raw color as last requested, before any scaling.
    pub fn rgb(&self) -> &Color {
        &self.rgb
    }

    pub fn color_brightness(&self) -> u8 {
        self.color_brightness
    }

    pub fn white_brightness(&self) -> u8 {
        self.white_brightness
    }

    /// Brightness of the active mode. The other mode's value is kept so
    /// switching back restores it.
    pub fn brightness(&self) -> BrightnessReading {
        if !self.reachable {
            return BrightnessReading {
                value: 0,
                available: false,
            };
        }
        let value = match self.mode {
            LightMode::Color => self.color_brightness,
            LightMode::White => self.white_brightness,
        };
        BrightnessReading {
            value,
            available: true,
        }
    }

    pub(crate) fn apply_color(&mut self, rgb: Color, intensity: u8) {
        self.rgb = rgb;
        self.color_brightness = intensity;
        self.mode = LightMode::Color;
    }

    pub(crate) fn apply_white(&mut self, intensity: u8) {
        self.white_brightness = intensity;
        self.mode = LightMode::White;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = BulbState::default();
        assert!(state.reachable());
        assert!(!state.power());
        assert_eq!(state.mode(), LightMode::Color);
        assert_eq!(state.rgb(), &Color::rgb(255, 255, 255));
        assert_eq!(state.color_brightness(), 255);
        assert_eq!(state.white_brightness(), 255);
    }

    #[test]
    fn test_mode_selects_brightness() {
        let mut state = BulbState::default();
        state.apply_color(Color::rgb(1, 2, 3), 40);
        state.apply_white(90);
        assert_eq!(state.brightness().value, 90);
        // color values survive white mode
        assert_eq!(state.rgb(), &Color::rgb(1, 2, 3));
        assert_eq!(state.color_brightness(), 40);

        state.apply_color(Color::rgb(1, 2, 3), 70);
        assert_eq!(state.brightness().value, 70);
        assert_eq!(state.white_brightness(), 90);
    }

    #[test]
    fn test_unreachable_brightness() {
        let state = BulbState {
            reachable: false,
            ..BulbState::default()
        };
        assert_eq!(
            state.brightness(),
            BrightnessReading {
                value: 0,
                available: false
            }
        );
    }
}
