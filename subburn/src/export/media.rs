use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SubburnError, SubburnResult};
use crate::render::frame::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Basic metadata about a source video file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Path used for probing and decoding.
    pub source_path: PathBuf,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
    /// Whether ffprobe found at least one audio stream.
    pub has_audio: bool,
}

impl MediaInfo {
    /// Native frame size.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe source video metadata through `ffprobe`.
pub fn probe(ffprobe: &str, source_path: &Path) -> SubburnResult<MediaInfo> {
    let out = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SubburnError::evaluation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SubburnError::validation(format!(
            "ffprobe could not read '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe(source_path, &out.stdout)
}

pub(crate) fn parse_probe(source_path: &Path, json: &[u8]) -> SubburnResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| SubburnError::evaluation(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SubburnError::validation("source has no video stream"))?;
    let width = video
        .width
        .ok_or_else(|| SubburnError::evaluation("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| SubburnError::evaluation("missing video height from ffprobe"))?;
    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| SubburnError::validation("source duration is unknown or zero"))?;
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration,
        has_audio,
    })
}

/// Random-access source of decoded frames for capture.
pub trait FrameSource {
    /// Frame size.
    fn canvas(&self) -> Canvas;
    /// Source frame at sample `idx` (presentation time `t`), as premultiplied RGBA.
    ///
    /// Returns once the frame is fully decoded; callers can draw on it immediately.
    fn frame_at(&mut self, idx: FrameIndex, t: f64) -> SubburnResult<FrameRGBA>;
}

/// Decodes a video sequentially at a fixed sample rate through an `ffmpeg` pipe.
///
/// Requests for later frames read forward; a request for an earlier frame restarts the decoder
/// with a seek. Past the end of the stream the last decoded frame is repeated.
pub struct FrameReader {
    ffmpeg: String,
    info: MediaInfo,
    fps: Fps,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    next: u64,
    buf: Vec<u8>,
    last: Option<Vec<u8>>,
    eof: bool,
}

impl FrameReader {
    /// Create a reader; the decoder starts on the first request.
    pub fn new(ffmpeg: impl Into<String>, info: MediaInfo, fps: Fps) -> Self {
        let frame_len = (info.width as usize) * (info.height as usize) * 4;
        Self {
            ffmpeg: ffmpeg.into(),
            info,
            fps,
            child: None,
            stdout: None,
            next: 0,
            buf: vec![0; frame_len],
            last: None,
            eof: false,
        }
    }

    fn restart(&mut self, idx: u64) -> SubburnResult<()> {
        self.stop();
        let t = self.fps.frame_time_secs(FrameIndex(idx));
        tracing::debug!(frame = idx, t, "starting source decoder");
        let mut child = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss", &format!("{t:.6}")])
            .arg("-i")
            .arg(&self.info.source_path)
            .args([
                "-an",
                "-vf",
                &format!("fps={}/{}", self.fps.num, self.fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SubburnError::evaluation(format!("failed to spawn ffmpeg decoder: {e}")))?;
        self.stdout = child.stdout.take();
        self.child = Some(child);
        self.next = idx;
        self.eof = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn read_next(&mut self) -> SubburnResult<bool> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(false);
        };
        match stdout.read_exact(&mut self.buf) {
            Ok(()) => {
                self.next += 1;
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.eof = true;
                Ok(false)
            }
            Err(e) => Err(SubburnError::evaluation(format!("read decoded frame: {e}"))),
        }
    }
}

impl FrameSource for FrameReader {
    fn canvas(&self) -> Canvas {
        self.info.canvas()
    }

    fn frame_at(&mut self, idx: FrameIndex, _t: f64) -> SubburnResult<FrameRGBA> {
        if self.child.is_none() || idx.0 < self.next.saturating_sub(1) {
            self.restart(idx.0)?;
        }
        if idx.0 + 1 == self.next
            && let Some(last) = &self.last
        {
            return FrameRGBA::from_straight_rgba(self.info.width, self.info.height, last.clone());
        }
        while self.next <= idx.0 && !self.eof {
            if self.read_next()? {
                self.last = Some(self.buf.clone());
            }
        }
        let pixels = self.last.clone().ok_or_else(|| {
            SubburnError::evaluation(format!(
                "no video frames decoded from '{}'",
                self.info.source_path.display()
            ))
        })?;
        FrameRGBA::from_straight_rgba(self.info.width, self.info.height, pixels)
    }
}

impl Drop for FrameReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/media.rs"]
mod tests;
