use crate::export::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path, pick_container};
use crate::export::filter::output_path;
use crate::export::media::{FrameReader, FrameSource, probe};
use crate::export::settings::ExportSettings;
use crate::export::sink::{FrameSink, SinkConfig};
use crate::export::source::{JobWorkspace, materialize, persist};
use crate::export::{
    ExportArtifact, ExportControl, ExportError, ExportJob, ExportProgress, Exporter,
};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::SubburnError;
use crate::model::style::Style;
use crate::model::track::{SegmentCursor, Track};
use crate::render::compositor::Compositor;
use std::path::PathBuf;

/// Frames needed to cover `[0, duration)` at `fps`: `ceil(duration * fps)` of them.
pub fn capture_range(duration: f64, fps: Fps) -> FrameRange {
    FrameRange {
        start: FrameIndex(0),
        end: FrameIndex(fps.secs_to_frames_ceil(duration)),
    }
}

/// Sample indices and presentation times covering `[0, duration)` at `fps`, spaced exactly one
/// frame interval apart.
pub fn sample_times(duration: f64, fps: Fps) -> impl Iterator<Item = (FrameIndex, f64)> {
    capture_range(duration, fps)
        .iter()
        .map(move |idx| (idx, fps.frame_time_secs(idx)))
}

/// Parameters for [`capture_frames`].
#[derive(Clone, Debug)]
pub struct CaptureOpts {
    /// Sample rate.
    pub fps: Fps,
    /// Source duration in seconds.
    pub duration: f64,
    /// Report progress every this many frames (and after the last one).
    pub progress_interval: u64,
    /// File whose audio is muxed into the output.
    pub audio_from: Option<PathBuf>,
    /// Name used in progress reports.
    pub strategy: &'static str,
}

/// Decode, composite and encode every sample in presentation order.
///
/// Cancellation is checked before each frame. On error or cancellation the sink is left
/// unfinished; dropping it discards the partial output. Returns the number of frames written.
pub fn capture_frames(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    compositor: &mut Compositor,
    track: &Track,
    style: &Style,
    opts: &CaptureOpts,
    control: &ExportControl,
) -> Result<u64, ExportError> {
    let range = capture_range(opts.duration, opts.fps);
    if range.is_empty() {
        return Err(SubburnError::validation("source has no frames to capture").into());
    }
    let total = range.len_frames();
    let canvas = source.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: opts.fps,
        audio_from: opts.audio_from.clone(),
    })?;

    let interval = opts.progress_interval.max(1);
    let mut cursor = SegmentCursor::new();
    let mut done = 0u64;
    for (idx, t) in sample_times(opts.duration, opts.fps) {
        control.check_cancel()?;
        let mut frame = source.frame_at(idx, t)?;
        compositor.render_at(&mut frame, track, &mut cursor, style, t)?;
        sink.push_frame(idx, &frame)?;

        done += 1;
        if done % interval == 0 || done == total {
            control.report(ExportProgress {
                strategy: opts.strategy,
                frames_done: done,
                frames_total: total,
            });
        }
    }
    sink.end()?;
    Ok(done)
}

/// Re-renders the video frame by frame with the compositor and encodes the result.
///
/// Produces MP4 (H.264) when the local `ffmpeg` has libx264, otherwise WebM (VP9); the output
/// extension always matches what was encoded. Source audio is carried over when present.
#[derive(Clone, Debug)]
pub struct FrameCaptureExporter {
    settings: ExportSettings,
}

impl FrameCaptureExporter {
    /// Strategy name.
    pub const NAME: &'static str = "frame-capture";

    /// Exporter using the binaries, rate and quality knobs from `settings`.
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }
}

impl Exporter for FrameCaptureExporter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = Self::NAME))]
    fn attempt(
        &self,
        job: &ExportJob,
        control: &ExportControl,
    ) -> Result<ExportArtifact, ExportError> {
        let s = &self.settings;
        if !is_ffmpeg_on_path(&s.ffmpeg) {
            return Err(ExportError::NotAvailable(format!("'{}' not found", s.ffmpeg)));
        }
        let container = pick_container(&s.ffmpeg).ok_or_else(|| {
            ExportError::NotAvailable("ffmpeg has neither libx264 nor libvpx-vp9".to_owned())
        })?;

        let ws = JobWorkspace::create(s.temp_dir.as_deref())?;
        let input = materialize(&job.source, &ws, s)?;
        let info = probe(&s.ffprobe, &input)?;
        tracing::debug!(
            job = %ws.id(),
            w = info.width,
            h = info.height,
            duration = info.duration,
            ?container,
            "capturing frames"
        );

        let tmp = ws.file("output", container.extension());
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&tmp, container, s));
        let opts = CaptureOpts {
            fps: s.fps,
            duration: info.duration,
            progress_interval: s.progress_interval,
            audio_from: info.has_audio.then(|| input.clone()),
            strategy: Self::NAME,
        };
        let mut reader = FrameReader::new(s.ffmpeg.clone(), info, s.fps);
        let mut compositor = Compositor::new();
        capture_frames(
            &mut reader,
            &mut sink,
            &mut compositor,
            &job.track,
            &job.style,
            &opts,
            control,
        )?;
        drop(sink);

        let dest = output_path(&job.output, container);
        if dest != job.output {
            tracing::info!(
                requested = %job.output.display(),
                written = %dest.display(),
                "output renamed to match container"
            );
        }
        persist(&tmp, &dest)?;
        Ok(ExportArtifact {
            path: dest,
            container,
            strategy: Self::NAME,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/capture.rs"]
mod tests;
