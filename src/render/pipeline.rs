use std::{path::PathBuf, time::Instant};

use crate::{
    app::{command::ScheduledCommand, context::AppContext},
    encode::ffmpeg::{EncodeConfig, FfmpegEncoder},
    foundation::{
        core::{Fps, FrameIndex, Rgba8},
        error::{GlitchError, GlitchResult},
    },
    render::surface::FrameRGBA,
};

/// How session time relates to wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramePacing {
    /// Frames are produced as fast as possible; the clock advances one frame period per frame.
    #[default]
    Offline,
    /// Each frame waits for its deadline and the clock is real elapsed time. Use with live
    /// capture.
    Realtime,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub frames: u64,
    pub fps: Fps,
    pub pacing: FramePacing,
    /// Commands to dispatch, ordered by frame.
    pub events: Vec<ScheduledCommand>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_rendered: u64,
    pub noise_passes_skipped: u64,
    pub commands_applied: u64,
    pub rebuilds: u64,
}

/// Destination for rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, index: FrameIndex, frame: &FrameRGBA) -> GlitchResult<()>;

    fn finish(&mut self) -> GlitchResult<()> {
        Ok(())
    }
}

/// Drive `ctx` for `opts.frames` frames, dispatching scheduled commands and handing every
/// frame to `sink`.
#[tracing::instrument(skip_all, fields(frames = opts.frames, pacing = ?opts.pacing))]
pub fn render_session(
    ctx: &mut AppContext,
    opts: &SessionOptions,
    sink: &mut dyn FrameSink,
) -> GlitchResult<SessionStats> {
    if opts.frames == 0 {
        return Err(GlitchError::validation("session must render at least one frame"));
    }

    let mut stats = SessionStats::default();
    let start_generation = ctx.grid().generation();
    let started = Instant::now();
    let mut events = opts.events.iter().peekable();

    for f in 0..opts.frames {
        while let Some(ev) = events.next_if(|e| e.frame <= f) {
            ctx.dispatch(ev.command.clone());
            stats.commands_applied += 1;
        }

        let now = match opts.pacing {
            FramePacing::Offline => opts.fps.frames_to_duration(f),
            FramePacing::Realtime => {
                let deadline = opts.fps.frames_to_duration(f);
                let elapsed = started.elapsed();
                if deadline > elapsed {
                    std::thread::sleep(deadline - elapsed);
                }
                started.elapsed()
            }
        };

        if !ctx.tick(now) {
            stats.noise_passes_skipped += 1;
        }
        let frame = ctx.draw();
        sink.write_frame(FrameIndex(f), &frame)?;
        stats.frames_rendered += 1;
    }

    sink.finish()?;
    stats.rebuilds = ctx.grid().generation() - start_generation;
    tracing::info!(?stats, "session finished");
    Ok(stats)
}

/// Keeps only the most recent frame.
#[derive(Debug, Default)]
pub struct LastFrameSink {
    pub last: Option<(FrameIndex, FrameRGBA)>,
}

impl FrameSink for LastFrameSink {
    fn write_frame(&mut self, index: FrameIndex, frame: &FrameRGBA) -> GlitchResult<()> {
        self.last = Some((index, frame.clone()));
        Ok(())
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> GlitchResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            GlitchError::render(format!("create frame dir '{}': {e}", dir.display()))
        })?;
        Ok(Self { dir, written: 0 })
    }

    pub fn frame_path(&self, index: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index.0))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, index: FrameIndex, frame: &FrameRGBA) -> GlitchResult<()> {
        frame.save_png(&self.frame_path(index))?;
        self.written += 1;
        Ok(())
    }
}

/// Streams frames into an MP4 through `ffmpeg`. The encoder opens on the first frame.
pub struct Mp4Sink {
    cfg: EncodeConfig,
    encoder: Option<FfmpegEncoder>,
}

impl Mp4Sink {
    pub fn new(
        out_path: impl Into<PathBuf>,
        fps: Fps,
        background: Rgba8,
        overwrite: bool,
    ) -> GlitchResult<Self> {
        if fps.den != 1 {
            return Err(GlitchError::validation("mp4 output requires integer fps"));
        }
        let cfg = EncodeConfig {
            out_path: out_path.into(),
            fps: fps.num,
            background,
            overwrite,
        };
        cfg.validate()?;
        Ok(Self { cfg, encoder: None })
    }
}

impl FrameSink for Mp4Sink {
    fn write_frame(&mut self, _index: FrameIndex, frame: &FrameRGBA) -> GlitchResult<()> {
        let encoder = match self.encoder.take() {
            Some(encoder) => encoder,
            None => FfmpegEncoder::spawn(&self.cfg, frame.canvas())?,
        };
        self.encoder.insert(encoder).push(frame)
    }

    fn finish(&mut self) -> GlitchResult<()> {
        if let Some(encoder) = self.encoder.take() {
            encoder.finish()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
