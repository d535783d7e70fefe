//! Value types for light control parameters.

mod color;
mod power;

pub use color::Color;
pub use power::PowerMode;
