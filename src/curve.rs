//! Visual correction curves.
//!
//! The bulb's response to protocol-scale values is far from linear. These
//! curves map user-facing intensities in `[0, 255]` to values in
//! `[0, 10000]` that look right on the hardware. They were measured
//! empirically and are reproduced exactly.

use crate::frame::PROTOCOL_MAX;

/// Smallest protocol value a lit color channel is sent with.
pub const MIN_COLOR_VAL: u16 = 16;

/// Smallest protocol value sent for white mode.
pub const MIN_WHITE_VAL: u16 = 12;

const ALPHA_OFFSET: u16 = 12;

/// Maps a color-mode intensity to the protocol alpha.
///
/// ```
/// use techlife_rs::curve::color_alpha;
///
/// assert_eq!(color_alpha(0), 0);
/// assert_eq!(color_alpha(10), 22);
/// assert_eq!(color_alpha(200), 7843);
/// ```
pub fn color_alpha(intensity: u8) -> u16 {
    let i = u16::from(intensity);
    match intensity {
        0 => 0,
        1..=127 => i + ALPHA_OFFSET,
        128..=163 => i * 12,
        164..=191 => i * 30,
        192..=255 => rounded_ratio(u32::from(i) * u32::from(PROTOCOL_MAX), 255),
    }
}

/// Scales a raw color channel by an already-corrected alpha.
///
/// A channel that was lit in the input never goes below [`MIN_COLOR_VAL`],
/// otherwise the bulb renders it as fully off. An unlit channel stays at zero.
pub fn scale_channel(channel: u8, alpha: u16) -> u16 {
    if channel == 0 {
        return 0;
    }
    rounded_ratio(u32::from(channel) * u32::from(alpha), 255).max(MIN_COLOR_VAL)
}

/// Maps a white-mode intensity to the protocol brightness.
pub fn white_level(intensity: u8) -> u16 {
    let i = u16::from(intensity);
    if intensity < 128 {
        (i * 4).max(MIN_WHITE_VAL)
    } else {
        rounded_ratio(u32::from(i) * u32::from(PROTOCOL_MAX), 256)
    }
}

// Round to nearest, ties up. Callers keep the result within u16.
fn rounded_ratio(numerator: u32, denominator: u32) -> u16 {
    ((numerator + denominator / 2) / denominator) as u16
}
