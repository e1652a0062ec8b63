use std::sync::Arc;

use crate::{
    assets::SourceFrame,
    foundation::core::{Point, SampleOffset, Size},
    render::surface::{FrameRGBA, PixelRect},
};

/// One cell of the mosaic: a fixed screen rectangle showing a moving crop of the buffer.
#[derive(Clone, Debug)]
pub struct Tile {
    position: Point,
    size: Size,
    sample_offset: SampleOffset,
    buffer: Option<Arc<SourceFrame>>,
}

impl Tile {
    pub fn new(position: Point, size: Size, buffer: Option<Arc<SourceFrame>>) -> Self {
        Self {
            position,
            size,
            sample_offset: SampleOffset::default(),
            buffer,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn sample_offset(&self) -> SampleOffset {
        self.sample_offset
    }

    pub fn buffer(&self) -> Option<&Arc<SourceFrame>> {
        self.buffer.as_ref()
    }

    pub fn set_buffer(&mut self, buffer: Option<Arc<SourceFrame>>) {
        self.buffer = buffer;
    }

    /// Overwrites the offset as given. Callers clamp to the buffer's scan range.
    pub fn set_sample_offset(&mut self, x: u32, y: u32) {
        self.sample_offset = SampleOffset::new(x, y);
    }

    /// Screen pixels covered by this tile. Edges are rounded so neighbouring tiles meet exactly.
    pub fn pixel_rect(&self) -> PixelRect {
        let x0 = self.position.x.round() as i64;
        let y0 = self.position.y.round() as i64;
        let x1 = (self.position.x + self.size.width).round() as i64;
        let y1 = (self.position.y + self.size.height).round() as i64;
        PixelRect {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0) as u32,
            height: (y1 - y0).max(0) as u32,
        }
    }

    /// Draw the current crop into `target`. Does nothing without a buffer.
    pub fn render(&self, target: &mut FrameRGBA) {
        let Some(buffer) = self.buffer.as_deref() else {
            return;
        };
        target.copy_region(
            buffer,
            self.sample_offset.x,
            self.sample_offset.y,
            self.pixel_rect(),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mosaic/tile.rs"]
mod tests;
