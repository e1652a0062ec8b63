use std::{
    io::Read as _,
    process::{Child, Command, Stdio},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use crate::{
    assets::SourceFrame,
    encode::ffmpeg::drain_stderr,
    foundation::error::{GlitchError, GlitchResult},
    media::source::MediaSource,
};

/// Where and how to capture a live stream through the system `ffmpeg` binary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Device path, URL or file passed to `ffmpeg -i`.
    pub input: String,
    /// Optional demuxer (`v4l2`, `avfoundation`, `dshow`). Unset means a file or URL, which is
    /// read at its native frame rate.
    pub format: Option<String>,
    /// Integer upscale applied to captured frames.
    pub scale: u32,
    /// Mirror horizontally, selfie style.
    pub mirror: bool,
    /// Restart file inputs when they end.
    pub loop_input: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            format: None,
            scale: 2,
            mirror: true,
            loop_input: false,
        }
    }
}

impl CaptureConfig {
    pub fn is_configured(&self) -> bool {
        !self.input.trim().is_empty()
    }

    pub fn validate(&self) -> GlitchResult<()> {
        if !self.is_configured() {
            return Err(GlitchError::validation("capture input must be non-empty"));
        }
        if self.scale == 0 {
            return Err(GlitchError::validation("capture scale must be >= 1"));
        }
        Ok(())
    }

    /// Output size for a stream probed at `width x height`.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let s = self.scale.max(1);
        (width.saturating_mul(s), height.saturating_mul(s))
    }

    fn input_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(format) = &self.format {
            args.extend(["-f".to_string(), format.clone()]);
        } else {
            args.push("-re".to_string());
            if self.loop_input {
                args.extend(["-stream_loop".to_string(), "-1".to_string()]);
            }
        }
        args.extend(["-i".to_string(), self.input.clone()]);
        args
    }

    /// Video filter chain applied before frames reach the sketch, if any.
    pub fn filter_chain(&self) -> Option<String> {
        let mut filters = Vec::new();
        if self.mirror {
            filters.push("hflip".to_string());
        }
        if self.scale > 1 {
            filters.push(format!("scale=iw*{s}:ih*{s}:flags=neighbor", s = self.scale));
        }
        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }

    /// Full `ffmpeg` argument list producing raw RGBA frames on stdout.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "error".to_string()];
        args.extend(self.input_args());
        if let Some(vf) = self.filter_chain() {
            args.extend(["-vf".to_string(), vf]);
        }
        args.extend(
            ["-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]
                .iter()
                .map(|s| (*s).to_string()),
        );
        args
    }
}

/// Ask `ffprobe` for the first video stream's size.
pub fn probe_capture(cfg: &CaptureConfig) -> GlitchResult<(u32, u32)> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let mut cmd = Command::new("ffprobe");
    cmd.args(["-v", "error", "-print_format", "json", "-show_streams"]);
    if let Some(format) = &cfg.format {
        cmd.args(["-f", format]);
    }
    let out = cmd
        .arg(&cfg.input)
        .output()
        .map_err(|e| GlitchError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(GlitchError::media(format!(
            "ffprobe failed for '{}': {}",
            cfg.input,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| GlitchError::media(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| GlitchError::media("no video stream found"))?;
    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(GlitchError::media("missing video size from ffprobe")),
    }
}

#[derive(Default)]
struct Shared {
    latest: Mutex<Option<Arc<SourceFrame>>>,
    child: Mutex<Option<Child>>,
    stop: AtomicBool,
}

/// Live capture decoded by a background `ffmpeg` process.
///
/// Startup (probe, spawn, first frame) happens on a reader thread, so the source reports zero
/// dimensions until the first frame has arrived. Startup failures are logged and leave the
/// source permanently unready.
pub struct LiveCapture {
    label: String,
    shared: Arc<Shared>,
    reader: Option<JoinHandle<()>>,
}

impl LiveCapture {
    pub fn start(cfg: CaptureConfig) -> GlitchResult<Self> {
        cfg.validate()?;
        let shared = Arc::new(Shared::default());
        let label = format!("capture:{}", cfg.input);
        let thread_shared = Arc::clone(&shared);
        let reader = std::thread::Builder::new()
            .name("glitchgrid-capture".to_string())
            .spawn(move || {
                if let Err(err) = run_capture(&cfg, &thread_shared) {
                    tracing::warn!(input = cfg.input.as_str(), error = %err, "capture stopped");
                }
            })
            .map_err(|e| GlitchError::media(format!("failed to spawn capture thread: {e}")))?;
        Ok(Self {
            label,
            shared,
            reader: Some(reader),
        })
    }
}

fn run_capture(cfg: &CaptureConfig, shared: &Shared) -> GlitchResult<()> {
    let (pw, ph) = probe_capture(cfg)?;
    let (width, height) = cfg.output_size(pw, ph);
    tracing::info!(input = cfg.input.as_str(), width, height, "capture probed");

    let mut child = Command::new("ffmpeg")
        .args(cfg.ffmpeg_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| GlitchError::media(format!("failed to spawn ffmpeg for capture: {e}")))?;
    let stderr = child.stderr.take().map(|s| drain_stderr(s, "ffmpeg-capture"));
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| GlitchError::media("failed to open ffmpeg stdout (unexpected)"))?;
    store_child(shared, child);
    if shared.stop.load(Ordering::Acquire) {
        kill_child(shared);
        return Ok(());
    }

    let frame_len = width as usize * height as usize * 4;
    let mut buf = vec![0u8; frame_len];
    while !shared.stop.load(Ordering::Acquire) {
        if let Err(e) = stdout.read_exact(&mut buf) {
            kill_child(shared);
            let tail = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                tracing::debug!(
                    input = cfg.input.as_str(),
                    stderr = tail.as_str(),
                    "capture stream ended"
                );
                return Ok(());
            }
            return Err(GlitchError::media(format!("capture read failed: {e}: {tail}")));
        }
        let frame = SourceFrame::from_straight(width, height, buf.clone())?;
        if let Ok(mut latest) = shared.latest.lock() {
            *latest = Some(Arc::new(frame));
        }
    }
    Ok(())
}

fn store_child(shared: &Shared, child: Child) {
    if let Ok(mut slot) = shared.child.lock() {
        *slot = Some(child);
    }
}

/// Kill the capture process if one has been spawned. Returns whether there was one.
fn kill_child(shared: &Shared) -> bool {
    if let Ok(mut slot) = shared.child.lock()
        && let Some(mut child) = slot.take()
    {
        let _ = child.kill();
        let _ = child.wait();
        return true;
    }
    false
}

/// Join the reader once its stream is gone. A reader still probing the input may block for as
/// long as the probe does, so it is detached instead; it sees `stop` and exits on its own.
fn release_reader(reader: JoinHandle<()>, stream_killed: bool) {
    if stream_killed || reader.is_finished() {
        let _ = reader.join();
    } else {
        tracing::debug!("detaching capture reader that is still probing");
    }
}

impl MediaSource for LiveCapture {
    fn label(&self) -> &str {
        &self.label
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frame().map_or((0, 0), |f| (f.width, f.height))
    }

    fn frame(&self) -> Option<Arc<SourceFrame>> {
        self.shared.latest.lock().ok().and_then(|l| l.clone())
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        let killed = kill_child(&self.shared);
        if let Some(reader) = self.reader.take() {
            release_reader(reader, killed);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/capture.rs"]
mod tests;
