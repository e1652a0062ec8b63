use std::path::Path;

use anyhow::Context as _;

use crate::{
    assets::{SourceFrame, decode::unpremultiply_rgba8_in_place},
    foundation::{
        core::Canvas,
        error::{GlitchError, GlitchResult},
    },
};

/// Integer pixel rectangle on a render target. May extend past the target's edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Rendered frame: premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Allocate a frame filled with one premultiplied pixel value.
    pub fn filled(canvas: Canvas, px: [u8; 4]) -> Self {
        let len = canvas.width as usize * canvas.height as usize;
        let mut data = Vec::with_capacity(len * 4);
        for _ in 0..len {
            data.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy a `dst.width x dst.height` region starting at `(src_x, src_y)` in `src` to `dst`.
    ///
    /// The copy is clipped against both the target and the source, so out-of-range regions
    /// simply copy fewer (or zero) pixels.
    pub fn copy_region(&mut self, src: &SourceFrame, src_x: u32, src_y: u32, dst: PixelRect) {
        let (mut sx, mut sy) = (i64::from(src_x), i64::from(src_y));
        let (mut dx, mut dy) = (dst.x, dst.y);
        let (mut w, mut h) = (i64::from(dst.width), i64::from(dst.height));

        if dx < 0 {
            sx -= dx;
            w += dx;
            dx = 0;
        }
        if dy < 0 {
            sy -= dy;
            h += dy;
            dy = 0;
        }
        w = w
            .min(i64::from(self.width) - dx)
            .min(i64::from(src.width) - sx);
        h = h
            .min(i64::from(self.height) - dy)
            .min(i64::from(src.height) - sy);
        if w <= 0 || h <= 0 {
            return;
        }

        let (sx, sy, dx, dy, w) = (sx as usize, sy as usize, dx as usize, dy as usize, w as usize);
        let src_stride = src.width as usize * 4;
        let dst_stride = self.width as usize * 4;
        for row in 0..h as usize {
            let s = (sy + row) * src_stride + sx * 4;
            let d = (dy + row) * dst_stride + dx * 4;
            self.data[d..d + w * 4].copy_from_slice(&src.rgba8_premul[s..s + w * 4]);
        }
    }

    /// Nearest-neighbour resize, used when a session's canvas size drifts from its output size.
    pub fn resized_nearest(&self, width: u32, height: u32) -> GlitchResult<FrameRGBA> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| GlitchError::render("frame data does not match its dimensions"))?;
        let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Nearest);
        Ok(FrameRGBA {
            width,
            height,
            data: out.into_raw(),
        })
    }

    /// Straight-alpha copy suitable for image files.
    pub fn to_rgba_image(&self) -> GlitchResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| GlitchError::render("frame data does not match its dimensions"))
    }

    pub fn save_png(&self, path: &Path) -> GlitchResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
