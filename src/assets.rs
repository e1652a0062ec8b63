pub mod decode;
pub mod library;

use crate::foundation::{
    core::Canvas,
    error::{GlitchError, GlitchResult},
};

/// A decoded image buffer that tiles sample from.
///
/// Frames are immutable once built and shared as `Arc<SourceFrame>`; a source change swaps the
/// `Arc`, never the pixels behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFrame {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Vec<u8>,
}

impl SourceFrame {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> GlitchResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| GlitchError::media("source frame size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(GlitchError::media(format!(
                "source frame data has {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Build from straight-alpha RGBA8, premultiplying in place.
    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> GlitchResult<Self> {
        decode::premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// A zero-sized frame is treated as "not loaded yet".
    pub fn is_ready(&self) -> bool {
        !self.canvas().is_empty()
    }
}
