//! Combined "turn on" requests.

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// A turn-on request combining brightness, color and white settings.
///
/// Unset fields fall back to the bulb's last known state when applied with
/// [`Bulb::apply`](crate::Bulb::apply). A color forces color mode; a white
/// value forces white mode and takes precedence as the brightness.
///
/// ```
/// use techlife_rs::{Color, LightRequest};
///
/// let mut request = LightRequest::new();
/// request.color(&Color::rgb(255, 0, 0));
/// request.brightness(128);
/// assert_eq!(request.get_color(), Some(Color::rgb(255, 0, 0)));
/// assert_eq!(request.get_white(), None);
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LightRequest {
    pub(crate) brightness: Option<u8>,
    pub(crate) color: Option<Color>,
    pub(crate) white: Option<u8>,
}

impl LightRequest {
    /// Create an empty request. Applying it just turns the bulb on and
    /// re-sends the current setting.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brightness(&mut self, brightness: u8) {
        self.brightness = Some(brightness);
    }

    pub fn color(&mut self, color: &Color) {
        self.color = Some(*color);
    }

    pub fn white(&mut self, white: u8) {
        self.white = Some(white);
    }

    pub fn get_brightness(&self) -> Option<u8> {
        self.brightness
    }

    pub fn get_color(&self) -> Option<Color> {
        self.color
    }

    pub fn get_white(&self) -> Option<u8> {
        self.white
    }
}

impl From<&Color> for LightRequest {
    fn from(color: &Color) -> Self {
        let mut r = LightRequest::new();
        r.color(color);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_unset_fields() {
        let mut request = LightRequest::new();
        request.white(40);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"white": 40}));
    }

    #[test]
    fn test_from_color() {
        let request = LightRequest::from(&Color::rgb(1, 2, 3));
        assert_eq!(request.get_color(), Some(Color::rgb(1, 2, 3)));
        assert_eq!(request.get_brightness(), None);
    }
}
