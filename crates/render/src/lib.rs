//! Cover rendering: decode the authoritative image, resize it according to
//! [`RenderOptions`] and re-encode it in the negotiated [`ImageFormat`].

pub mod error;
mod options;
mod render;

pub use crate::options::{ImageFormat, RenderOptions, UnknownFormat};
pub use crate::render::{CoverRenderer, ImageRenderer};

/// Largest width or height [`ImageRenderer`] produces unless configured otherwise.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;
