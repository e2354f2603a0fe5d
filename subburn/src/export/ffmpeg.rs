use crate::export::settings::ExportSettings;
use crate::export::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SubburnError, SubburnResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::frame::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Output container and the codecs used for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// MP4 with H.264 video and AAC audio.
    Mp4,
    /// WebM with VP9 video and Opus audio.
    Webm,
}

impl Container {
    /// Preference order when picking what the local encoder supports.
    pub const PREFERENCE: [Self; 2] = [Self::Mp4, Self::Webm];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// MIME type of the produced file.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }

    /// Video encoder ffmpeg must provide.
    pub fn video_encoder(self) -> &'static str {
        match self {
            Self::Mp4 => "libx264",
            Self::Webm => "libvpx-vp9",
        }
    }

    fn audio_encoder(self) -> &'static str {
        match self {
            Self::Mp4 => "aac",
            Self::Webm => "libopus",
        }
    }
}

/// Pads odd frame sizes up to the even dimensions yuv420p requires; a no-op for even sizes.
pub(crate) const EVEN_PAD_FILTER: &str = "pad=ceil(iw/2)*2:ceil(ih/2)*2";

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path; its extension should match `container`.
    pub out_path: PathBuf,
    /// Output container.
    pub container: Container,
    /// Background used to flatten any remaining alpha.
    pub bg_rgb: [u8; 3],
    /// Constant rate factor.
    pub crf: u8,
    /// x264 preset (ignored for VP9).
    pub preset: String,
    /// Audio bitrate.
    pub audio_bitrate: String,
    /// `ffmpeg` executable.
    pub ffmpeg: String,
}

impl FfmpegSinkOpts {
    /// Options for writing `container` to `out_path` with the quality knobs from `settings`.
    pub fn new(out_path: impl Into<PathBuf>, container: Container, settings: &ExportSettings) -> Self {
        Self {
            out_path: out_path.into(),
            container,
            bg_rgb: [0, 0, 0],
            crf: settings.crf,
            preset: settings.preset.clone(),
            audio_bitrate: settings.audio_bitrate.clone(),
            ffmpeg: settings.ffmpeg.clone(),
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw frames to its stdin.
///
/// When [`SinkConfig::audio_from`] is set, the first audio stream of that file (if it has one) is
/// re-encoded into the output alongside the captured video. The audio is padded with silence and
/// cut at the last captured frame, so the video stream alone decides the output length.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let container = self.opts.container;
        if let Some(audio) = cfg.audio_from.as_ref() {
            cmd.arg("-i").arg(audio).args([
                "-map",
                "0:v:0",
                "-map",
                "1:a:0?",
                "-c:a",
                container.audio_encoder(),
                "-b:a",
                &self.opts.audio_bitrate,
                "-af",
                "apad",
                "-shortest",
            ]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(["-vf", EVEN_PAD_FILTER, "-c:v", container.video_encoder()]);
        match container {
            Container::Mp4 => {
                cmd.args([
                    "-preset",
                    &self.opts.preset,
                    "-crf",
                    &self.opts.crf.to_string(),
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
            Container::Webm => {
                cmd.args([
                    "-crf",
                    &self.opts.crf.to_string(),
                    "-b:v",
                    "0",
                    "-deadline",
                    "realtime",
                    "-pix_fmt",
                    "yuv420p",
                ]);
            }
        }
        cmd.arg(&self.opts.out_path);
        cmd
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SubburnResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(SubburnError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SubburnError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path(&self.opts.ffmpeg) {
            return Err(SubburnError::evaluation(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            SubburnError::evaluation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SubburnError::evaluation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SubburnError::evaluation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SubburnResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SubburnError::evaluation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SubburnError::evaluation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SubburnError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SubburnError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgb);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SubburnError::evaluation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SubburnError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> SubburnResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SubburnError::evaluation("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            SubburnError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SubburnError::evaluation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SubburnError::evaluation(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SubburnError::evaluation(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // An export abandoned mid-stream must not leave an encoder running.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SubburnResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked.
pub fn is_ffmpeg_on_path(ffmpeg: &str) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether the local `ffmpeg` build provides `encoder`.
pub fn has_encoder(ffmpeg: &str, encoder: &str) -> bool {
    listing_contains(ffmpeg, "-encoders", encoder)
}

/// Whether the local `ffmpeg` build provides `filter` (e.g. `subtitles`, which needs libass).
pub fn has_filter(ffmpeg: &str, filter: &str) -> bool {
    listing_contains(ffmpeg, "-filters", filter)
}

fn listing_contains(ffmpeg: &str, flag: &str, name: &str) -> bool {
    let Ok(out) = Command::new(ffmpeg)
        .args(["-hide_banner", flag])
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    out.status.success()
        && String::from_utf8_lossy(&out.stdout)
            .lines()
            .any(|l| l.split_whitespace().nth(1) == Some(name))
}

/// First container in [`Container::PREFERENCE`] whose encoder is available.
pub fn pick_container(ffmpeg: &str) -> Option<Container> {
    Container::PREFERENCE
        .into_iter()
        .find(|c| has_encoder(ffmpeg, c.video_encoder()))
}

#[cfg(test)]
#[path = "../../tests/unit/export/ffmpeg.rs"]
mod tests;
