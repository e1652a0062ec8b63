use crate::foundation::error::{GlitchError, GlitchResult};

pub use kurbo::{Point, Size};

/// Zero-based index of a rendered frame within a session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> GlitchResult<Self> {
        if den == 0 {
            return Err(GlitchError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GlitchError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn frames_to_duration(self, frames: u64) -> std::time::Duration {
        std::time::Duration::from_secs_f64((frames as f64) * f64::from(self.den) / f64::from(self.num))
    }
}

/// Pixel size of the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Largest width or height a window may take.
    pub const MAX_DIM: u32 = 16_384;

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides limited to [`Canvas::MAX_DIM`].
    pub fn clamped(self) -> Self {
        Self::new(self.width.min(Self::MAX_DIM), self.height.min(Self::MAX_DIM))
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Top-left corner of the region a tile copies out of its buffer, in buffer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SampleOffset {
    pub x: u32,
    pub y: u32,
}

impl SampleOffset {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Premultiplied bytes for writing into a premultiplied surface.
    pub fn premultiplied(self) -> [u8; 4] {
        let [r, g, b, a] = self.0;
        let a16 = u16::from(a);
        [
            crate::foundation::math::mul_div255_u8(u16::from(r), a16),
            crate::foundation::math::mul_div255_u8(u16::from(g), a16),
            crate::foundation::math::mul_div255_u8(u16::from(b), a16),
            a,
        ]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
