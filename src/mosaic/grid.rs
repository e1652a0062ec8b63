use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    assets::SourceFrame,
    field::noise::CoherentNoise,
    foundation::core::{Canvas, Point, SampleOffset, Size},
    mosaic::tile::Tile,
    render::surface::FrameRGBA,
};

/// Smallest allowed row/column count.
pub const MIN_CELLS: u32 = 1;
/// Largest allowed row/column count.
pub const MAX_CELLS: u32 = 400;
/// Lattice shift between the X and Y offset fields so they evolve independently.
pub const NOISE_FIELD_OFFSET: f64 = 1000.0;

/// Parameters of the scrolling noise field.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NoiseParams {
    /// Lattice distance between neighbouring tiles. Smaller is smoother.
    pub scale: f64,
    /// Noise time advanced per frame. Negative values run the field backwards.
    pub speed: f64,
}

impl NoiseParams {
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.speed.is_finite()
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 0.01,
            speed: 0.0004,
        }
    }
}

pub fn clamp_cells(n: u32) -> u32 {
    n.clamp(MIN_CELLS, MAX_CELLS)
}

/// Range a sample offset may take so a `tile`-sized crop stays inside `buffer`.
pub fn scan_range(buffer: Canvas, tile: Size) -> (f64, f64) {
    (
        (f64::from(buffer.width) - tile.width).max(0.0),
        (f64::from(buffer.height) - tile.height).max(0.0),
    )
}

/// Noise-driven sample offset for the tile at `(row, col)` at noise time `t`.
pub fn noise_offset(
    noise: &CoherentNoise,
    scale: f64,
    row: u32,
    col: u32,
    t: f64,
    max_scan: (f64, f64),
) -> SampleOffset {
    let (cx, cy) = (f64::from(col) * scale, f64::from(row) * scale);
    let nx = noise.sample(cx, cy, t);
    let ny = noise.sample(cx + NOISE_FIELD_OFFSET, cy + NOISE_FIELD_OFFSET, t);
    SampleOffset::new(
        (nx * max_scan.0).floor() as u32,
        (ny * max_scan.1).floor() as u32,
    )
}

/// Row-major mosaic of tiles over a canvas, all sampling one shared buffer.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: u32,
    cols: u32,
    canvas: Canvas,
    tile_size: Size,
    tiles: Vec<Tile>,
    params: NoiseParams,
    noise: CoherentNoise,
    buffer: Option<Arc<SourceFrame>>,
    generation: u64,
}

impl Grid {
    /// Create a grid without tiles. Call [`Grid::rebuild_tiles`] to lay them out.
    pub fn new(
        rows: u32,
        cols: u32,
        canvas: Canvas,
        buffer: Option<Arc<SourceFrame>>,
        noise: CoherentNoise,
    ) -> Self {
        let rows = clamp_cells(rows);
        let cols = clamp_cells(cols);
        Self {
            rows,
            cols,
            canvas,
            tile_size: tile_size_for(canvas, rows, cols),
            tiles: Vec::new(),
            params: NoiseParams::default(),
            noise,
            buffer,
            generation: 0,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn params(&self) -> NoiseParams {
        self.params
    }

    pub fn buffer(&self) -> Option<&Arc<SourceFrame>> {
        self.buffer.as_ref()
    }

    /// Number of completed tile rebuilds since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set the row count (clamped) and rebuild. Returns the applied value.
    pub fn set_rows(&mut self, rows: u32) -> u32 {
        self.set_dimensions(rows, self.cols);
        self.rows
    }

    /// Set the column count (clamped) and rebuild. Returns the applied value.
    pub fn set_cols(&mut self, cols: u32) -> u32 {
        self.set_dimensions(self.rows, cols);
        self.cols
    }

    pub fn set_dimensions(&mut self, rows: u32, cols: u32) {
        self.rows = clamp_cells(rows);
        self.cols = clamp_cells(cols);
        self.rebuild_tiles();
    }

    /// Replace the noise parameters. Non-finite values are rejected and leave the grid as is.
    pub fn set_noise_params(&mut self, params: NoiseParams) -> bool {
        if !params.is_valid() {
            return false;
        }
        self.params = params;
        true
    }

    /// Update the canvas size without rebuilding.
    pub fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }

    /// Update the canvas size and rebuild.
    pub fn resize(&mut self, canvas: Canvas) {
        self.set_canvas(canvas);
        self.rebuild_tiles();
    }

    /// Swap the shared buffer on the grid and every existing tile.
    pub fn set_buffer(&mut self, buffer: Option<Arc<SourceFrame>>) {
        for tile in &mut self.tiles {
            tile.set_buffer(buffer.clone());
        }
        self.buffer = buffer;
    }

    /// Recreate all tiles from the current rows, columns, canvas and buffer.
    #[tracing::instrument(skip(self), fields(rows = self.rows, cols = self.cols))]
    pub fn rebuild_tiles(&mut self) {
        self.tile_size = tile_size_for(self.canvas, self.rows, self.cols);
        let Size { width: tw, height: th } = self.tile_size;
        let max_scan = self
            .buffer
            .as_deref()
            .map(|b| scan_range(b.canvas(), self.tile_size));

        let mut tiles = Vec::with_capacity(self.rows as usize * self.cols as usize);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let position = Point::new(f64::from(col) * tw, f64::from(row) * th);
                let mut tile = Tile::new(position, self.tile_size, self.buffer.clone());
                let (mut sx, mut sy) = (position.x.floor(), position.y.floor());
                if let Some((mx, my)) = max_scan {
                    sx = sx.min(mx.floor());
                    sy = sy.min(my.floor());
                }
                tile.set_sample_offset(sx as u32, sy as u32);
                tiles.push(tile);
            }
        }
        self.tiles = tiles;
        self.generation += 1;
        tracing::debug!(
            tiles = self.tiles.len(),
            tile_width = tw,
            tile_height = th,
            generation = self.generation,
            "rebuilt tiles"
        );
    }

    /// Recompute every tile's sample offset for `frame_counter`.
    ///
    /// Returns `false` without touching any tile when the buffer is missing or empty, or when
    /// there are no tiles.
    pub fn apply_noise(&mut self, frame_counter: u64) -> bool {
        let Some(buffer) = self.buffer.clone().filter(|b| b.is_ready()) else {
            return false;
        };
        if self.tiles.is_empty() {
            return false;
        }

        let max_scan = scan_range(buffer.canvas(), self.tile_size);
        let t = frame_counter as f64 * self.params.speed;
        let scale = self.params.scale;
        let cols = self.cols as usize;
        let noise = self.noise;

        self.tiles.par_iter_mut().enumerate().for_each(|(i, tile)| {
            let (row, col) = ((i / cols) as u32, (i % cols) as u32);
            let off = noise_offset(&noise, scale, row, col, t, max_scan);
            tile.set_sample_offset(off.x, off.y);
            tile.set_buffer(Some(Arc::clone(&buffer)));
        });
        true
    }

    pub fn render(&self, target: &mut FrameRGBA) {
        for tile in &self.tiles {
            tile.render(target);
        }
    }
}

fn tile_size_for(canvas: Canvas, rows: u32, cols: u32) -> Size {
    Size::new(
        f64::from(canvas.width) / f64::from(cols.max(1)),
        f64::from(canvas.height) / f64::from(rows.max(1)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/mosaic/grid.rs"]
mod tests;
