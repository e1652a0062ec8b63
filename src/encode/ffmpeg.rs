use std::{
    collections::VecDeque,
    io::{BufRead as _, BufReader, Read, Write as _},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::{GlitchError, GlitchResult},
        math::mul_div255_u8,
    },
    render::surface::FrameRGBA,
};

/// Lines of ffmpeg stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 12;

/// Where and how a session is written as H.264 MP4.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeConfig {
    pub out_path: PathBuf,
    pub fps: u32,
    /// Matte behind any transparent pixels. Its alpha is ignored.
    pub background: Rgba8,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> GlitchResult<()> {
        if self.fps == 0 {
            return Err(GlitchError::validation("encode fps must be non-zero"));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(GlitchError::validation("encode output path must be set"));
        }
        if !self.overwrite && self.out_path.exists() {
            return Err(GlitchError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        Ok(())
    }
}

/// Largest even size not exceeding `canvas`, at least 2x2. yuv420p needs even dimensions.
pub fn even_size(canvas: Canvas) -> Canvas {
    Canvas::new((canvas.width & !1).max(2), (canvas.height & !1).max(2))
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

pub fn ensure_parent_dir(path: &Path) -> GlitchResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Read a child's stderr to the end on its own thread, logging each line at debug level.
///
/// The handle yields the last few lines, for error messages.
pub(crate) fn drain_stderr(
    stderr: impl Read + Send + 'static,
    label: &'static str,
) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            let line = line.trim_end().to_string();
            if line.is_empty() {
                continue;
            }
            tracing::debug!(process = label, "{line}");
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        Vec::from(tail).join("\n")
    })
}

fn encoder_args(cfg: &EncodeConfig, canvas: Canvas) -> Vec<String> {
    let mut args: Vec<String> = vec![
        String::from(if cfg.overwrite { "-y" } else { "-n" }),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", canvas.width, canvas.height),
        "-r".into(),
        cfg.fps.to_string(),
        "-i".into(),
        "pipe:0".into(),
    ];
    args.extend(
        [
            "-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart",
        ]
        .map(String::from),
    );
    args.push(cfg.out_path.to_string_lossy().into_owned());
    args
}

/// Composite premultiplied RGBA8 `src` over an opaque `matte` into `dst`.
fn matte_over(dst: &mut [u8], src: &[u8], matte: [u8; 3]) -> GlitchResult<()> {
    if dst.len() != src.len() || !src.len().is_multiple_of(4) {
        return Err(GlitchError::render("matte buffers must be equal-length rgba8"));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            let under = mul_div255_u8(u16::from(matte[c]), inv);
            d[c] = s[c].saturating_add(under);
        }
        d[3] = 255;
    }
    Ok(())
}

/// A running `ffmpeg` process turning sketch frames into an MP4.
///
/// The output size is the first frame's canvas rounded down to even. Frames of any other size
/// are nearest-resized to it, so a session may resize its canvas mid-stream.
pub struct FfmpegEncoder {
    out_path: PathBuf,
    canvas: Canvas,
    matte: [u8; 3],
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
    scratch: Vec<u8>,
    frames: u64,
}

impl FfmpegEncoder {
    pub fn spawn(cfg: &EncodeConfig, first: Canvas) -> GlitchResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(GlitchError::render(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let canvas = even_size(first);
        let mut child = Command::new("ffmpeg")
            .args(encoder_args(cfg, canvas))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GlitchError::render(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|s| drain_stderr(s, "ffmpeg-encode"));
        if stdin.is_none() {
            let _ = child.kill();
            return Err(GlitchError::render("ffmpeg stdin unavailable"));
        }

        tracing::debug!(
            out = %cfg.out_path.display(),
            width = canvas.width,
            height = canvas.height,
            fps = cfg.fps,
            resized_from = ?(first != canvas).then_some(first),
            "spawned ffmpeg encoder"
        );

        let [r, g, b, _] = cfg.background.0;
        Ok(Self {
            out_path: cfg.out_path.clone(),
            canvas,
            matte: [r, g, b],
            child,
            stdin,
            stderr,
            scratch: vec![0u8; canvas.width as usize * canvas.height as usize * 4],
            frames: 0,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn push(&mut self, frame: &FrameRGBA) -> GlitchResult<()> {
        let resized;
        let frame = if frame.canvas() == self.canvas {
            frame
        } else {
            resized = frame.resized_nearest(self.canvas.width, self.canvas.height)?;
            &resized
        };
        matte_over(&mut self.scratch, &frame.data, self.matte)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GlitchError::render("ffmpeg encoder is already finished"));
        };
        if let Err(e) = stdin.write_all(&self.scratch) {
            self.stdin = None;
            let _ = self.child.kill();
            let _ = self.child.wait();
            let stderr = self.stderr.take().and_then(|h| h.join().ok()).unwrap_or_default();
            return Err(GlitchError::render(format!(
                "ffmpeg stopped accepting frames after {}: {e}: {stderr}",
                self.frames
            )));
        }
        self.frames += 1;
        Ok(())
    }

    /// Close the stream and wait for ffmpeg. Returns the number of frames written.
    pub fn finish(mut self) -> GlitchResult<u64> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| GlitchError::render(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.stderr.take().and_then(|h| h.join().ok()).unwrap_or_default();
        if !status.success() {
            return Err(GlitchError::render(format!(
                "ffmpeg exited with {status}: {stderr}"
            )));
        }
        tracing::info!(out = %self.out_path.display(), frames = self.frames, "mp4 finished");
        Ok(self.frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
