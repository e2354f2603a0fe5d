//! Burned-in video export.
//!
//! An [`ExportPipeline`] holds an ordered list of [`Exporter`] strategies. Each one either
//! produces a finished file, reports [`ExportError::NotAvailable`] so the next one is tried
//! silently, or fails. Errors reach the caller only once every strategy is exhausted, except for
//! input and source errors, which no other strategy could fix.

/// Frame-capture strategy (decode, composite, re-encode).
pub mod capture;
/// `ffmpeg` encoder sink and capability probes.
pub mod ffmpeg;
/// Local `ffmpeg` subtitles-filter strategy.
pub mod filter;
/// Source probing and sequential frame decoding.
pub mod media;
/// HTTP export-service strategy.
pub mod remote;
/// Export tunables.
pub mod settings;
/// Frame sink contract.
pub mod sink;
/// Source media, job workspaces and downloads.
pub mod source;

use crate::export::ffmpeg::Container;
use crate::export::settings::ExportSettings;
use crate::export::source::SourceMedia;
use crate::foundation::error::{ErrorCategory, ResourceKind, SubburnError, SubburnResult};
use crate::model::document::Document;
use crate::model::style::Style;
use crate::model::track::Track;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// One export request.
#[derive(Clone, Debug)]
pub struct ExportJob {
    /// Video to burn subtitles into.
    pub source: SourceMedia,
    /// Segments to burn in.
    pub track: Track,
    /// Style applied to every segment.
    pub style: Style,
    /// Requested output path. Its extension may be rewritten to match the container produced.
    pub output: PathBuf,
}

impl ExportJob {
    /// Job for a persisted document.
    pub fn from_document(source: SourceMedia, doc: &Document, output: impl Into<PathBuf>) -> Self {
        Self {
            source,
            track: doc.segments.clone(),
            style: doc.style.clone(),
            output: output.into(),
        }
    }

    /// Reject jobs before any strategy does work.
    pub fn validate(&self) -> SubburnResult<()> {
        if self.track.segments().iter().all(|s| s.text.trim().is_empty()) {
            return Err(SubburnError::validation("no subtitles to export"));
        }
        self.style.validate()?;
        self.source.validate()
    }
}

/// A finished export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Where the file was written.
    pub path: PathBuf,
    /// Container actually encoded.
    pub container: Container,
    /// Name of the strategy that produced it.
    pub strategy: &'static str,
}

/// Outcome of a failed strategy attempt.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// The strategy cannot run here (missing backend, tool or configuration).
    #[error("export strategy not available: {0}")]
    NotAvailable(String),
    /// The caller cancelled the job.
    #[error("export cancelled")]
    Cancelled,
    /// The strategy ran and failed.
    #[error(transparent)]
    Failed(#[from] SubburnError),
}

impl ExportError {
    /// User-facing category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAvailable(_) => ErrorCategory::ExportUnsupported,
            Self::Cancelled => ErrorCategory::ExportFailedRetryable,
            Self::Failed(e) => e.category(),
        }
    }

    /// Whether trying the next strategy could not help.
    fn is_terminal(&self) -> bool {
        match self {
            Self::NotAvailable(_) => false,
            Self::Cancelled => true,
            Self::Failed(e) => matches!(
                e,
                SubburnError::Validation(_)
                    | SubburnError::Serde(_)
                    | SubburnError::Resource {
                        kind: ResourceKind::SourceUnavailable | ResourceKind::AccessDenied,
                        ..
                    }
            ),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Failed(e.into())
    }
}

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Strategies observe it between frames.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Coarse progress report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    /// Strategy reporting.
    pub strategy: &'static str,
    /// Frames finished so far.
    pub frames_done: u64,
    /// Frames in the whole job.
    pub frames_total: u64,
}

impl ExportProgress {
    /// Whole-number percentage in `0..=100`.
    pub fn percent(&self) -> u8 {
        if self.frames_total == 0 {
            return 100;
        }
        ((self.frames_done.min(self.frames_total) * 100) / self.frames_total) as u8
    }
}

/// Caller-side handles passed to every attempt.
#[derive(Clone, Debug, Default)]
pub struct ExportControl {
    /// Cancellation flag.
    pub cancel: CancelToken,
    progress: Option<mpsc::Sender<ExportProgress>>,
}

impl ExportControl {
    /// Control with no progress listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send progress reports to `tx`.
    pub fn with_progress(mut self, tx: mpsc::Sender<ExportProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Forward a progress report; a dropped receiver is ignored.
    pub fn report(&self, progress: ExportProgress) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(progress);
        }
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check_cancel(&self) -> Result<(), ExportError> {
        if self.cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }
}

/// One export strategy.
pub trait Exporter: Send + Sync {
    /// Short name for logs and artifacts.
    fn name(&self) -> &'static str;

    /// Try to produce the job's output.
    ///
    /// Implementations must return [`ExportError::NotAvailable`] (and leave nothing behind) when
    /// they cannot run at all, so the pipeline can move on.
    fn attempt(&self, job: &ExportJob, control: &ExportControl)
    -> Result<ExportArtifact, ExportError>;
}

/// Ordered strategies with silent fallback.
pub struct ExportPipeline {
    exporters: Vec<Box<dyn Exporter>>,
}

impl ExportPipeline {
    /// Pipeline over `exporters`, tried in order.
    pub fn new(exporters: Vec<Box<dyn Exporter>>) -> Self {
        Self { exporters }
    }

    /// Standard order: remote service (when configured), local filter, frame capture.
    pub fn from_settings(settings: &ExportSettings) -> Self {
        let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();
        if settings.remote_url.is_some() {
            exporters.push(Box::new(remote::RemoteExporter::new(settings.clone())));
        }
        exporters.push(Box::new(filter::LocalFilterExporter::new(settings.clone())));
        exporters.push(Box::new(capture::FrameCaptureExporter::new(settings.clone())));
        Self::new(exporters)
    }

    /// Strategy names in attempt order.
    pub fn strategies(&self) -> Vec<&'static str> {
        self.exporters.iter().map(|e| e.name()).collect()
    }

    /// Run the job through each strategy until one succeeds.
    #[tracing::instrument(skip_all, fields(source = %job.source.describe(), output = %job.output.display()))]
    pub fn run(
        &self,
        job: &ExportJob,
        control: &ExportControl,
    ) -> Result<ExportArtifact, ExportError> {
        job.validate()?;

        let mut last_failure: Option<ExportError> = None;
        for exporter in &self.exporters {
            control.check_cancel()?;
            match exporter.attempt(job, control) {
                Ok(artifact) => {
                    tracing::info!(
                        strategy = artifact.strategy,
                        path = %artifact.path.display(),
                        "export finished"
                    );
                    return Ok(artifact);
                }
                Err(ExportError::NotAvailable(reason)) => {
                    tracing::debug!(strategy = exporter.name(), %reason, "strategy not available");
                }
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => {
                    tracing::warn!(strategy = exporter.name(), error = %e, "strategy failed, trying next");
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| {
            ExportError::NotAvailable("no export strategy can run in this environment".to_owned())
        }))
    }

    /// Run on a dedicated worker thread so the caller stays responsive.
    pub fn spawn(
        self,
        job: ExportJob,
        control: ExportControl,
    ) -> SubburnResult<std::thread::JoinHandle<Result<ExportArtifact, ExportError>>> {
        std::thread::Builder::new()
            .name("subburn-export".to_owned())
            .spawn(move || self.run(&job, &control))
            .map_err(|e| SubburnError::evaluation(format!("spawn export worker: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/mod.rs"]
mod tests;
