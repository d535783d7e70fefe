//! Binary command frames understood by TechLife bulb firmware.
//!
//! Every command is a fixed 16-byte frame. Byte 0 marks the command family
//! (`0xFA` power, `0x28` color/brightness), byte 15 terminates it, and byte 14
//! holds an XOR checksum over bytes 1 through 13. Multi-byte fields are
//! little-endian.
//!
//! ```
//! use techlife_rs::frame;
//!
//! let on = frame::power_on_frame();
//! assert_eq!(on.as_bytes()[14], 0x23);
//! assert_eq!(frame::checksum(*on.as_bytes()), *on.as_bytes());
//! ```

use std::fmt;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Length of every command frame.
pub const FRAME_LEN: usize = 16;

/// Highest value accepted by the protocol-scale fields.
pub const PROTOCOL_MAX: u16 = 10_000;

/// Lowest alpha the bulb renders in color mode.
pub const MIN_ALPHA: u16 = 12;

const CHECKSUM_INDEX: usize = 14;

const POWER_ON: [u8; FRAME_LEN] = [
    0xFA, 0x23, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x23, 0xFB,
];
const POWER_OFF: [u8; FRAME_LEN] = [
    0xFA, 0x24, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x24, 0xFB,
];
const COLOR_TEMPLATE: [u8; FRAME_LEN] = [
    0x28, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x0F, 0, 0x29,
];
const BRIGHTNESS_TEMPLATE: [u8; FRAME_LEN] = [
    0x28, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xF0, 0, 0x29,
];

/// Reply the bulb expects after it sends a handshake probe.
///
/// This is not a command frame: it is 23 bytes long and carries no checksum.
pub const ACK_REPLY: [u8; 23] = [
    0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3F, 0x0D, 0x00, 0x00, 0x00, 0x01, 0x41, 0x00,
    0xFF, 0xFF, 0xFF, 0x15, 0x24, 0xF1, 0x4D, 0x22,
];

/// Leading bytes of the handshake probe sent by the bulb.
pub const HANDSHAKE_PROBE: [u8; 2] = [0xFC, 0xF0];

/// A checksummed 16-byte command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    /// Wraps raw bytes, recomputing the checksum.
    pub fn new(bytes: [u8; FRAME_LEN]) -> Self {
        CommandFrame(checksum(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn checksum_byte(&self) -> u8 {
        self.0[CHECKSUM_INDEX]
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

/// XOR-folds bytes 1..=13 into byte 14. Other bytes are left untouched.
pub fn checksum(mut frame: [u8; FRAME_LEN]) -> [u8; FRAME_LEN] {
    frame[CHECKSUM_INDEX] = frame[1..CHECKSUM_INDEX].iter().fold(0, |acc, b| acc ^ b);
    frame
}

pub fn power_on_frame() -> CommandFrame {
    CommandFrame::new(POWER_ON)
}

pub fn power_off_frame() -> CommandFrame {
    CommandFrame::new(POWER_OFF)
}

/// Builds a color frame from protocol-scale components.
///
/// `r`, `g`, `b` and `alpha` must already be scaled to `[0, 10000]`; the
/// codec does not rescale. Alpha is raised to [`MIN_ALPHA`] and only its low
/// byte fits the frame.
pub fn color_frame(r: u16, g: u16, b: u16, alpha: u16) -> Result<CommandFrame> {
    for (name, value) in [("red", r), ("green", g), ("blue", b), ("alpha", alpha)] {
        check_protocol_range(name, value)?;
    }

    let mut payload = COLOR_TEMPLATE;
    payload[1..3].copy_from_slice(&r.to_le_bytes());
    payload[3..5].copy_from_slice(&g.to_le_bytes());
    payload[5..7].copy_from_slice(&b.to_le_bytes());
    payload[11] = alpha.max(MIN_ALPHA).to_le_bytes()[0];
    Ok(CommandFrame::new(payload))
}

/// Builds a white-mode brightness frame. `value` is in `[0, 10000]`.
pub fn brightness_frame(value: u16) -> Result<CommandFrame> {
    check_protocol_range("brightness", value)?;

    let mut payload = BRIGHTNESS_TEMPLATE;
    payload[7..9].copy_from_slice(&value.to_le_bytes());
    Ok(CommandFrame::new(payload))
}

/// Whether an inbound payload is the bulb's handshake probe.
pub fn is_handshake_probe(payload: &[u8]) -> bool {
    payload.starts_with(&HANDSHAKE_PROBE)
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn check_protocol_range(name: &'static str, value: u16) -> Result<()> {
    if value > PROTOCOL_MAX {
        return Err(Error::invalid_argument(name, value, PROTOCOL_MAX));
    }
    Ok(())
}
