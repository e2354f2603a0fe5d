use crate::foundation::core::Fps;
use crate::foundation::error::{SubburnError, SubburnResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tunables for every export strategy.
///
/// Missing fields in a JSON config take their defaults, so a partial file only overrides what it
/// names.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    /// Sample rate for frame capture.
    pub fps: Fps,
    /// x264/VP9 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
    /// AAC bitrate for re-encoded audio.
    pub audio_bitrate: String,
    /// Report capture progress every this many frames.
    pub progress_interval: u64,
    /// Base URL of an HTTP export service; `None` skips the remote strategy.
    pub remote_url: Option<String>,
    /// Bearer credential sent to the export service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_token: Option<String>,
    /// Upper bound on a remote export call, in seconds.
    pub remote_timeout_secs: u64,
    /// Where job workspaces are created; `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// `ffmpeg` executable.
    pub ffmpeg: String,
    /// `ffprobe` executable.
    pub ffprobe: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            crf: 28,
            preset: "ultrafast".to_owned(),
            audio_bitrate: "192k".to_owned(),
            progress_interval: 10,
            remote_url: None,
            remote_token: None,
            remote_timeout_secs: 600,
            temp_dir: None,
            ffmpeg: "ffmpeg".to_owned(),
            ffprobe: "ffprobe".to_owned(),
        }
    }
}

impl ExportSettings {
    /// Load settings from a JSON file.
    pub fn from_path(path: &Path) -> SubburnResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SubburnError::validation(format!("read export config '{}': {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_slice(&bytes)
            .map_err(|e| SubburnError::serde(format!("parse export config: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no strategy could run with.
    pub fn validate(&self) -> SubburnResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.crf > 63 {
            return Err(SubburnError::validation("crf must be in 0..=63"));
        }
        if self.progress_interval == 0 {
            return Err(SubburnError::validation("progressInterval must be >= 1"));
        }
        if self.remote_timeout_secs == 0 {
            return Err(SubburnError::validation("remoteTimeoutSecs must be >= 1"));
        }
        if self.ffmpeg.trim().is_empty() || self.ffprobe.trim().is_empty() {
            return Err(SubburnError::validation("ffmpeg/ffprobe names must not be empty"));
        }
        Ok(())
    }

    /// Remote call timeout.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settings.rs"]
mod tests;
