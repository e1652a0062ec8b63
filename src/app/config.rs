use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    app::command::{ScheduledCommand, SourceKind},
    assets::library::default_asset_names,
    foundation::{
        core::{Canvas, Fps, Rgba8},
        error::{GlitchError, GlitchResult},
    },
    media::{capture::CaptureConfig, wait::WaitPolicy},
    mosaic::grid::{MAX_CELLS, MIN_CELLS, NoiseParams},
};

/// Readiness polling settings, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaWaitConfig {
    pub poll_interval_ms: u64,
    /// `null` disables the timeout.
    pub timeout_ms: Option<u64>,
}

impl Default for MediaWaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            timeout_ms: Some(10_000),
        }
    }
}

impl MediaWaitConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Everything needed to start a sketch session. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub rows: u32,
    pub cols: u32,
    pub noise_scale: f64,
    pub noise_speed: f64,
    pub seed: u64,
    /// Initial source. Unset picks the camera when one is configured, otherwise images.
    pub source: Option<SourceKind>,
    /// Initially selected still image. Unset picks the last asset.
    pub image: Option<String>,
    pub assets_dir: PathBuf,
    pub assets: Vec<String>,
    pub camera: Option<CaptureConfig>,
    pub media_wait: MediaWaitConfig,
    /// Canvas size while fullscreen.
    pub window: Canvas,
    pub fullscreen: bool,
    pub background: Rgba8,
    pub fps: u32,
    pub frames: u64,
    pub events: Vec<ScheduledCommand>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 40,
            noise_scale: NoiseParams::default().scale,
            noise_speed: NoiseParams::default().speed,
            seed: 0,
            source: None,
            image: None,
            assets_dir: PathBuf::from("assets"),
            assets: default_asset_names(),
            camera: None,
            media_wait: MediaWaitConfig::default(),
            window: Canvas::new(1920, 1080),
            fullscreen: false,
            background: Rgba8::WHITE,
            fps: 30,
            frames: 300,
            events: Vec::new(),
        }
    }
}

impl SketchConfig {
    pub fn from_path(path: &Path) -> GlitchResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| GlitchError::serde(format!("parse config '{}': {e}", path.display())))?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> GlitchResult<Self> {
        serde_json::from_str(s).map_err(|e| GlitchError::serde(format!("parse config: {e}")))
    }

    pub fn validate(&self) -> GlitchResult<()> {
        for (what, n) in [("rows", self.rows), ("cols", self.cols)] {
            if !(MIN_CELLS..=MAX_CELLS).contains(&n) {
                return Err(GlitchError::validation(format!(
                    "{what} must be within {MIN_CELLS}..={MAX_CELLS}, got {n}"
                )));
            }
        }
        if !self.noise_params().is_valid() {
            return Err(GlitchError::validation("noise scale/speed must be finite"));
        }
        if self.fps == 0 {
            return Err(GlitchError::validation("fps must be non-zero"));
        }
        if self.frames == 0 {
            return Err(GlitchError::validation("frames must be non-zero"));
        }
        if self.window.is_empty() {
            return Err(GlitchError::validation("window size must be non-zero"));
        }
        if self.window != self.window.clamped() {
            return Err(GlitchError::validation(format!(
                "window size must be at most {max}x{max}, got {}x{}",
                self.window.width,
                self.window.height,
                max = Canvas::MAX_DIM
            )));
        }
        if let Some(camera) = &self.camera {
            camera.validate()?;
        }
        if self.assets.is_empty() && !self.has_camera() {
            return Err(GlitchError::validation(
                "config needs at least one asset or a camera input",
            ));
        }
        if self.source == Some(SourceKind::Camera) && !self.has_camera() {
            return Err(GlitchError::validation(
                "source is 'camera' but no camera input is configured",
            ));
        }
        Ok(())
    }

    pub fn has_camera(&self) -> bool {
        self.camera.as_ref().is_some_and(CaptureConfig::is_configured)
    }

    pub fn initial_source(&self) -> SourceKind {
        self.source.unwrap_or(if self.has_camera() {
            SourceKind::Camera
        } else {
            SourceKind::Image
        })
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            scale: self.noise_scale,
            speed: self.noise_speed,
        }
    }

    pub fn fps(&self) -> GlitchResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Scheduled commands ordered by frame; commands on the same frame keep file order.
    pub fn sorted_events(&self) -> Vec<ScheduledCommand> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.frame);
        events
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/config.rs"]
mod tests;
