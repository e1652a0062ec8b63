//! glitchgrid renders a noise-driven tile mosaic over a still image or live capture.
//!
//! The canvas is split into a grid of tiles. Every frame each tile looks up a coherent noise
//! field at its grid coordinates and uses the result to pick which region of the source buffer
//! it shows, so neighbouring tiles drift together and the picture flows like a datamosh.
//!
//! # Pipeline overview
//!
//! 1. **Configure**: [`SketchConfig`] (JSON) describes grid, noise, sources and scheduled
//!    [`Command`]s.
//! 2. **Prepare**: still images are decoded into an [`AssetLibrary`]; a camera, if any, is a
//!    [`LiveCapture`] behind the [`MediaSource`] trait.
//! 3. **Drive**: [`AppContext`] owns all sketch state. [`AppContext::dispatch`] applies
//!    commands, [`AppContext::tick`] advances one frame, [`AppContext::draw`] paints it.
//! 4. **Deliver**: [`render_session`] runs the loop and hands frames to a [`FrameSink`]
//!    (PNG sequence, MP4 through the system `ffmpeg`, or in-memory).
//!
//! Frames are premultiplied RGBA8 end to end.
#![forbid(unsafe_code)]

mod app;
mod assets;
mod encode;
mod field;
mod foundation;
mod media;
mod mosaic;
mod render;

pub use app::command::{Command, ScheduledCommand, SourceKind};
pub use app::config::{MediaWaitConfig, SketchConfig};
pub use app::context::{ActiveSource, AppContext};
pub use assets::SourceFrame;
pub use assets::decode::{decode_image, load_image};
pub use assets::library::{
    AssetLibrary, DEFAULT_ASSET_NAMES, default_asset_names, normalize_rel_path,
};
pub use encode::ffmpeg::{
    EncodeConfig, FfmpegEncoder, ensure_parent_dir, even_size, is_ffmpeg_on_path,
};
pub use field::noise::CoherentNoise;
pub use foundation::core::{Canvas, Fps, FrameIndex, Point, Rgba8, SampleOffset, Size};
pub use foundation::error::{GlitchError, GlitchResult};
pub use media::capture::{CaptureConfig, LiveCapture, probe_capture};
pub use media::source::{MediaSource, StillSource};
pub use media::wait::{MediaWait, WaitPolicy, WaitStatus};
pub use mosaic::grid::{
    Grid, MAX_CELLS, MIN_CELLS, NOISE_FIELD_OFFSET, NoiseParams, clamp_cells, noise_offset,
    scan_range,
};
pub use mosaic::tile::Tile;
pub use render::pipeline::{
    FramePacing, FrameSink, LastFrameSink, Mp4Sink, PngSequenceSink, SessionOptions,
    SessionStats, render_session,
};
pub use render::surface::{FrameRGBA, PixelRect};
