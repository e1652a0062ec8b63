use std::{sync::Arc, time::Duration};

use crate::{
    app::{
        command::{Command, SourceKind},
        config::SketchConfig,
    },
    assets::{SourceFrame, library::AssetLibrary},
    field::noise::CoherentNoise,
    foundation::core::{Canvas, Rgba8},
    media::{
        source::{MediaSource, StillSource},
        wait::{MediaWait, WaitPolicy, WaitStatus},
    },
    mosaic::grid::{Grid, NoiseParams},
    render::surface::FrameRGBA,
};

/// What is currently installed as the grid's buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveSource {
    Camera,
    Image(String),
}

/// A source waiting to report non-zero dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
enum PendingSource {
    Camera,
    Image(String),
}

/// All sketch state, driven by commands and one [`AppContext::tick`] per frame.
pub struct AppContext {
    grid: Grid,
    images: AssetLibrary,
    camera: Option<Box<dyn MediaSource>>,
    source: SourceKind,
    image_name: Option<String>,
    active: Option<ActiveSource>,
    pending: Option<MediaWait<PendingSource>>,
    wait_policy: WaitPolicy,
    fullscreen: bool,
    window: Canvas,
    background: Rgba8,
    frame_count: u64,
    now: Duration,
}

impl AppContext {
    /// Build the sketch: canvas sized to the default image, grid laid out over it, then the
    /// configured source selected.
    pub fn new(
        cfg: &SketchConfig,
        images: AssetLibrary,
        camera: Option<Box<dyn MediaSource>>,
    ) -> Self {
        let image_name = cfg
            .image
            .clone()
            .filter(|n| images.contains(n))
            .or_else(|| images.default_name().map(str::to_string));
        let default_buffer = image_name.as_deref().and_then(|n| images.get(n));
        let canvas = default_buffer
            .as_deref()
            .map_or(cfg.window.clamped(), SourceFrame::canvas);
        let active = default_buffer
            .as_ref()
            .and(image_name.clone().map(ActiveSource::Image));

        let noise = CoherentNoise::new(cfg.seed);
        let mut grid = Grid::new(cfg.rows, cfg.cols, canvas, default_buffer, noise);
        if !grid.set_noise_params(cfg.noise_params()) {
            tracing::warn!("ignoring non-finite noise parameters from config");
        }
        grid.rebuild_tiles();

        let mut ctx = Self {
            grid,
            images,
            camera,
            source: cfg.initial_source(),
            image_name,
            active,
            pending: None,
            wait_policy: cfg.media_wait.policy(),
            fullscreen: false,
            window: cfg.window.clamped(),
            background: cfg.background,
            frame_count: 0,
            now: Duration::ZERO,
        };
        if cfg.fullscreen {
            ctx.set_fullscreen(true);
        }
        ctx.select_source(ctx.source);
        ctx
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn active_source(&self) -> Option<&ActiveSource> {
        self.active.as_ref()
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn canvas(&self) -> Canvas {
        self.grid.canvas()
    }

    pub fn dispatch(&mut self, cmd: Command) {
        tracing::debug!(?cmd, "dispatch");
        match cmd {
            Command::SetRows(rows) => {
                let rows = self.grid.set_rows(rows);
                tracing::info!("Rows: {rows}");
            }
            Command::SetCols(cols) => {
                let cols = self.grid.set_cols(cols);
                tracing::info!("Columns: {cols}");
            }
            Command::SetNoiseScale(scale) => {
                self.update_noise(NoiseParams {
                    scale,
                    ..self.grid.params()
                });
            }
            Command::SetNoiseSpeed(speed) => {
                self.update_noise(NoiseParams {
                    speed,
                    ..self.grid.params()
                });
            }
            Command::SelectSource(kind) => self.select_source(kind),
            Command::SelectImage(name) => self.select_image(name),
            Command::ToggleFullscreen => self.set_fullscreen(!self.fullscreen),
            Command::WindowResized { width, height } => self.window_resized(width, height),
        }
    }

    fn update_noise(&mut self, params: NoiseParams) {
        if self.grid.set_noise_params(params) {
            tracing::info!(
                "Noise scale: {:.3}, Noise speed: {:.4}",
                params.scale,
                params.speed
            );
        } else {
            tracing::warn!(?params, "ignoring non-finite noise parameters");
        }
    }

    fn select_source(&mut self, kind: SourceKind) {
        self.source = kind;
        tracing::info!("Source: {kind}");
        match kind {
            SourceKind::Camera => {
                match self.camera.as_deref() {
                    Some(camera) => tracing::info!(camera = camera.label(), "waiting for camera"),
                    None => tracing::warn!("camera selected but no capture is configured"),
                }
                self.begin_wait(PendingSource::Camera);
            }
            SourceKind::Image => {
                if let Some(prev) = self.pending.take() {
                    tracing::debug!(cancelled = ?prev.target(), "image source selected");
                }
                if let Some(name) = self.image_name.clone() {
                    self.request_image(name);
                }
            }
        }
    }

    fn select_image(&mut self, name: String) {
        if !self.images.contains(&name) {
            tracing::debug!(name = name.as_str(), "unknown image, ignoring");
            return;
        }
        self.image_name = Some(name.clone());
        self.request_image(name);
    }

    fn request_image(&mut self, name: String) {
        if self.source != SourceKind::Image {
            return;
        }
        let Some(frame) = self.images.get(&name) else {
            tracing::debug!(name = name.as_str(), "unknown image, ignoring");
            return;
        };
        if frame.is_ready() {
            self.pending = None;
            self.install(frame, ActiveSource::Image(name));
        } else {
            self.begin_wait(PendingSource::Image(name));
        }
    }

    /// Start waiting for `target`, replacing any earlier wait.
    fn begin_wait(&mut self, target: PendingSource) {
        if let Some(prev) = self.pending.take() {
            tracing::debug!(cancelled = ?prev.target(), "replacing pending source");
        }
        self.pending = Some(MediaWait::new(target, self.now, self.wait_policy));
        self.poll_pending();
    }

    fn poll_pending(&mut self) {
        let Some(mut wait) = self.pending.take() else {
            return;
        };
        match wait.poll(self.now, |t| self.pending_frame(t).is_some()) {
            WaitStatus::Pending => self.pending = Some(wait),
            WaitStatus::TimedOut => {
                tracing::warn!(
                    source = ?wait.target(),
                    "media did not become ready in time, keeping current buffer"
                );
            }
            WaitStatus::Ready => {
                let target = wait.into_target();
                if let Some(frame) = self.pending_frame(&target) {
                    let active = match target {
                        PendingSource::Camera => ActiveSource::Camera,
                        PendingSource::Image(name) => ActiveSource::Image(name),
                    };
                    self.install(frame, active);
                }
            }
        }
    }

    fn pending_frame(&self, target: &PendingSource) -> Option<Arc<SourceFrame>> {
        let frame = match target {
            PendingSource::Camera => self
                .camera
                .as_deref()
                .filter(|c| c.is_ready())
                .and_then(|c| c.frame()),
            PendingSource::Image(name) => self
                .images
                .get(name)
                .map(|f| StillSource::new(name.as_str(), f))
                .filter(|s| s.is_ready())
                .and_then(|s| s.frame()),
        };
        frame.filter(|f| f.is_ready())
    }

    /// Make `buffer` the grid's buffer: resize the canvas to it (unless fullscreen) and
    /// rebuild once.
    fn install(&mut self, buffer: Arc<SourceFrame>, active: ActiveSource) {
        if !buffer.is_ready() {
            return;
        }
        tracing::info!(
            source = ?active,
            width = buffer.width,
            height = buffer.height,
            "installing buffer"
        );
        if !self.fullscreen {
            self.grid.set_canvas(buffer.canvas());
        }
        self.grid.set_buffer(Some(buffer));
        self.grid.rebuild_tiles();
        self.active = Some(active);
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
        tracing::info!(fullscreen = on, "fullscreen toggled");
        if on {
            self.grid.resize(self.window);
        } else if let Some(canvas) = self.grid.buffer().map(|b| b.canvas()) {
            self.grid.resize(canvas);
        }
    }

    fn window_resized(&mut self, width: u32, height: u32) {
        let window = Canvas::new(width, height).clamped();
        if window.is_empty() {
            tracing::debug!(width, height, "ignoring empty window size");
            return;
        }
        self.window = window;
        if self.fullscreen {
            self.grid.resize(window);
        }
    }

    /// Pull the newest camera frame into the grid while the camera is live.
    fn refresh_live(&mut self) {
        if self.active != Some(ActiveSource::Camera) {
            return;
        }
        let Some(frame) = self.camera.as_deref().and_then(|c| c.frame()) else {
            return;
        };
        if !frame.is_ready() {
            return;
        }
        match self.grid.buffer() {
            Some(current) if Arc::ptr_eq(current, &frame) => {}
            Some(current) if current.canvas() == frame.canvas() => {
                self.grid.set_buffer(Some(frame));
            }
            _ => self.install(frame, ActiveSource::Camera),
        }
    }

    /// Advance one frame at time `now`: settle pending sources, refresh live input, then move
    /// the noise field. Returns whether the noise pass ran.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.now = now;
        self.frame_count += 1;
        self.poll_pending();
        self.refresh_live();
        self.grid.apply_noise(self.frame_count)
    }

    /// Paint the background and every tile.
    pub fn draw(&self) -> FrameRGBA {
        let mut frame = FrameRGBA::filled(self.grid.canvas(), self.background.premultiplied());
        self.grid.render(&mut frame);
        frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/context.rs"]
mod tests;
