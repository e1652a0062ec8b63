use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "glitchgrid", version)]
struct Cli {
    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render frames 0..=N and write frame N as a PNG.
    Frame(FrameArgs),
    /// Render a whole session as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SketchArgs {
    /// Sketch config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding still images (overrides the config).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Still image to select (overrides the config).
    #[arg(long)]
    image: Option<String>,

    /// Capture input passed to ffmpeg, e.g. /dev/video0 (overrides the config).
    #[arg(long)]
    camera: Option<String>,

    /// Capture demuxer, e.g. v4l2 or avfoundation.
    #[arg(long, requires = "camera")]
    camera_format: Option<String>,

    /// Noise seed (overrides the config).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    sketch: SketchArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputKind {
    Mp4,
    Png,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    sketch: SketchArgs,

    /// Output MP4 path, or directory for a PNG sequence.
    #[arg(long)]
    out: PathBuf,

    /// Output kind.
    #[arg(long, value_enum, default_value_t = OutputKind::Mp4)]
    format: OutputKind,

    /// Number of frames (overrides the config).
    #[arg(long)]
    frames: Option<u64>,

    /// Pace frames in real time. Implied when a camera is configured.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Refuse to overwrite an existing MP4.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &SketchArgs) -> anyhow::Result<glitchgrid::SketchConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let mut cfg = glitchgrid::SketchConfig::from_path(path)?;
            if cfg.assets_dir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                cfg.assets_dir = base.join(&cfg.assets_dir);
            }
            cfg
        }
        None => glitchgrid::SketchConfig::default(),
    };

    if let Some(dir) = &args.assets_dir {
        cfg.assets_dir = dir.clone();
    }
    if let Some(image) = &args.image {
        cfg.image = Some(image.clone());
    }
    if let Some(input) = &args.camera {
        let mut camera = cfg.camera.take().unwrap_or_default();
        camera.input = input.clone();
        if args.camera_format.is_some() {
            camera.format = args.camera_format.clone();
        }
        cfg.camera = Some(camera);
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    Ok(cfg)
}

fn build_context(cfg: &glitchgrid::SketchConfig) -> anyhow::Result<glitchgrid::AppContext> {
    cfg.validate()?;
    let images = glitchgrid::AssetLibrary::load(&cfg.assets_dir, &cfg.assets);
    if images.is_empty() && !cfg.has_camera() {
        anyhow::bail!(
            "no still images could be loaded from '{}' and no camera is configured",
            cfg.assets_dir.display()
        );
    }

    let camera: Option<Box<dyn glitchgrid::MediaSource>> = match &cfg.camera {
        Some(c) if c.is_configured() => Some(Box::new(
            glitchgrid::LiveCapture::start(c.clone()).context("start camera capture")?,
        )),
        _ => None,
    };

    Ok(glitchgrid::AppContext::new(cfg, images, camera))
}

fn session_options(
    cfg: &glitchgrid::SketchConfig,
    frames: u64,
    realtime: bool,
) -> anyhow::Result<glitchgrid::SessionOptions> {
    let pacing = if realtime || cfg.has_camera() {
        glitchgrid::FramePacing::Realtime
    } else {
        glitchgrid::FramePacing::Offline
    };
    Ok(glitchgrid::SessionOptions {
        frames,
        fps: cfg.fps()?,
        pacing,
        events: cfg.sorted_events(),
    })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.sketch)?;
    let mut ctx = build_context(&cfg)?;
    let opts = session_options(&cfg, args.frame.saturating_add(1), false)?;

    let mut sink = glitchgrid::LastFrameSink::default();
    glitchgrid::render_session(&mut ctx, &opts, &mut sink)?;
    let (_, frame) = sink
        .last
        .context("session produced no frame (bug)")?;

    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.sketch)?;
    let mut ctx = build_context(&cfg)?;
    let frames = args.frames.unwrap_or(cfg.frames);
    let opts = session_options(&cfg, frames, args.realtime)?;

    let stats = match args.format {
        OutputKind::Mp4 => {
            let mut sink = glitchgrid::Mp4Sink::new(
                &args.out,
                opts.fps,
                cfg.background,
                !args.no_overwrite,
            )?;
            glitchgrid::render_session(&mut ctx, &opts, &mut sink)?
        }
        OutputKind::Png => {
            let mut sink = glitchgrid::PngSequenceSink::new(&args.out)?;
            glitchgrid::render_session(&mut ctx, &opts, &mut sink)?
        }
    };

    eprintln!(
        "wrote {} ({} frames, {} rebuilds)",
        args.out.display(),
        stats.frames_rendered,
        stats.rebuilds
    );
    Ok(())
}
