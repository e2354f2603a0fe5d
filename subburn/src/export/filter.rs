use crate::export::ffmpeg::{
    Container, EVEN_PAD_FILTER, has_encoder, has_filter, is_ffmpeg_on_path,
};
use crate::export::media::probe;
use crate::export::settings::ExportSettings;
use crate::export::source::{JobWorkspace, materialize, persist};
use crate::export::{ExportArtifact, ExportControl, ExportError, ExportJob, Exporter};
use crate::format::ass::to_ass;
use crate::foundation::error::SubburnError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Burns an ASS rendition of the track into the video with a single `ffmpeg` pass through the
/// `subtitles` filter.
///
/// The output is always H.264/AAC MP4 with the index moved to the front for progressive download.
/// Once `ffmpeg` starts the job can no longer be cancelled.
#[derive(Clone, Debug)]
pub struct LocalFilterExporter {
    settings: ExportSettings,
}

impl LocalFilterExporter {
    /// Strategy name.
    pub const NAME: &'static str = "local-filter";

    /// Exporter using the binaries and quality knobs from `settings`.
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    fn availability(&self) -> Result<(), ExportError> {
        let ffmpeg = &self.settings.ffmpeg;
        if !is_ffmpeg_on_path(ffmpeg) {
            return Err(ExportError::NotAvailable(format!("'{ffmpeg}' not found")));
        }
        if !has_filter(ffmpeg, "subtitles") {
            return Err(ExportError::NotAvailable(
                "ffmpeg lacks the subtitles filter (libass)".to_owned(),
            ));
        }
        if !has_encoder(ffmpeg, Container::Mp4.video_encoder()) {
            return Err(ExportError::NotAvailable("ffmpeg lacks libx264".to_owned()));
        }
        Ok(())
    }

    pub(crate) fn command(&self, input: &Path, ass: &Path, out: &Path) -> Command {
        let s = &self.settings;
        let mut cmd = Command::new(&s.ffmpeg);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args(["-y", "-loglevel", "error", "-i"]).arg(input);
        cmd.args([
            "-vf",
            &format!(
                "subtitles=filename='{}',{EVEN_PAD_FILTER}",
                escape_filter_path(ass)
            ),
            "-map",
            "0:v:0",
            "-map",
            "0:a:0?",
            "-c:v",
            "libx264",
            "-preset",
            &s.preset,
            "-crf",
            &s.crf.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-b:a",
            &s.audio_bitrate,
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(out);
        cmd
    }
}

impl Exporter for LocalFilterExporter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = Self::NAME))]
    fn attempt(
        &self,
        job: &ExportJob,
        control: &ExportControl,
    ) -> Result<ExportArtifact, ExportError> {
        self.availability()?;

        let ws = JobWorkspace::create(self.settings.temp_dir.as_deref())?;
        let input = materialize(&job.source, &ws, &self.settings)?;
        let info = probe(&self.settings.ffprobe, &input)?;

        let ass_path = ws.file("subtitles", "ass");
        std::fs::write(&ass_path, to_ass(&job.track, &job.style, info.canvas()))?;
        let out = ws.file("output", Container::Mp4.extension());

        control.check_cancel()?;
        tracing::debug!(job = %ws.id(), w = info.width, h = info.height, "running subtitles filter");
        let output = self
            .command(&input, &ass_path, &out)
            .output()
            .map_err(|e| SubburnError::evaluation(format!("failed to spawn ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::evaluation(format!(
                "ffmpeg subtitles pass failed with status {}: {}",
                output.status,
                stderr.trim()
            ))
            .into());
        }

        let dest = output_path(&job.output, Container::Mp4);
        persist(&out, &dest)?;
        Ok(ExportArtifact {
            path: dest,
            container: Container::Mp4,
            strategy: Self::NAME,
        })
    }
}

/// `path` with its extension replaced by the container's.
pub(crate) fn output_path(requested: &Path, container: Container) -> PathBuf {
    requested.with_extension(container.extension())
}

/// Quote a path for use inside a filter-graph option value.
pub(crate) fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 8);
    for ch in normalized.chars() {
        match ch {
            ':' | '\'' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "../../tests/unit/export/filter.rs"]
mod tests;
