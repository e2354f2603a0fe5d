use super::*;
use crate::model::segment::Segment;
use std::sync::Mutex;

struct Scripted {
    name: &'static str,
    outcome: fn(&ExportJob) -> Result<ExportArtifact, ExportError>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Exporter for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, job: &ExportJob, _: &ExportControl) -> Result<ExportArtifact, ExportError> {
        self.calls.lock().unwrap().push(self.name);
        (self.outcome)(job)
    }
}

fn not_configured(_: &ExportJob) -> Result<ExportArtifact, ExportError> {
    Err(ExportError::NotAvailable("not configured".to_owned()))
}

fn produces(job: &ExportJob) -> Result<ExportArtifact, ExportError> {
    Ok(ExportArtifact {
        path: job.output.clone(),
        container: Container::Webm,
        strategy: "capture",
    })
}

fn crashes(_: &ExportJob) -> Result<ExportArtifact, ExportError> {
    Err(SubburnError::evaluation("encoder died").into())
}

fn blocked(_: &ExportJob) -> Result<ExportArtifact, ExportError> {
    Err(SubburnError::resource(ResourceKind::AccessDenied, "403").into())
}

fn pipeline(
    steps: &[(&'static str, fn(&ExportJob) -> Result<ExportArtifact, ExportError>)],
) -> (ExportPipeline, Arc<Mutex<Vec<&'static str>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let exporters = steps
        .iter()
        .map(|&(name, outcome)| {
            Box::new(Scripted {
                name,
                outcome,
                calls: calls.clone(),
            }) as Box<dyn Exporter>
        })
        .collect();
    (ExportPipeline::new(exporters), calls)
}

fn job(dir: &tempfile::TempDir) -> ExportJob {
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"not really a video").unwrap();
    ExportJob {
        source: SourceMedia::File(video),
        track: Track::new(vec![Segment::new(0, 0.0, 1.0, "Hi")]).unwrap(),
        style: Style::default(),
        output: dir.path().join("out.mp4"),
    }
}

#[test]
fn unavailable_strategy_falls_through_silently() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("filter", not_configured), ("capture", produces)]);
    let artifact = p.run(&job(&dir), &ExportControl::new()).unwrap();
    assert_eq!(artifact.strategy, "capture");
    assert_eq!(*calls.lock().unwrap(), vec!["filter", "capture"]);
}

#[test]
fn failures_fall_through_and_the_last_one_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("filter", crashes), ("capture", not_configured)]);
    let err = p.run(&job(&dir), &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ExportFailedRetryable);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[test]
fn source_errors_abort_without_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("filter", blocked), ("capture", produces)]);
    let err = p.run(&job(&dir), &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::SourceUnavailable);
    assert_eq!(*calls.lock().unwrap(), vec!["filter"]);
}

#[test]
fn nothing_available_is_export_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let (p, _) = pipeline(&[("a", not_configured), ("b", not_configured)]);
    let err = p.run(&job(&dir), &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ExportUnsupported);
}

#[test]
fn invalid_jobs_are_rejected_before_any_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("capture", produces)]);
    let mut j = job(&dir);
    j.track = Track::default();
    let err = p.run(&j, &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnsupportedInput);

    let mut j = job(&dir);
    j.source = SourceMedia::File(dir.path().join("missing.mp4"));
    let err = p.run(&j, &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::SourceUnavailable);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn tracks_with_only_blank_text_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("capture", produces)]);
    let mut j = job(&dir);
    j.track = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "   "),
        Segment::new(1, 1.5, 2.0, ""),
    ])
    .unwrap();
    assert!(matches!(j.validate(), Err(SubburnError::Validation(_))));
    let err = p.run(&j, &ExportControl::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnsupportedInput);
    assert!(calls.lock().unwrap().is_empty());

    j.track = Track::new(vec![
        Segment::new(0, 0.0, 1.0, " "),
        Segment::new(1, 1.5, 2.0, "Hi"),
    ])
    .unwrap();
    j.validate().unwrap();
}

#[test]
fn cancelled_jobs_stop_before_the_next_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let (p, calls) = pipeline(&[("capture", produces)]);
    let control = ExportControl::new();
    control.cancel.cancel();
    assert!(matches!(
        p.run(&job(&dir), &control),
        Err(ExportError::Cancelled)
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn default_order_puts_remote_first_when_configured() {
    let mut settings = ExportSettings::default();
    assert_eq!(
        ExportPipeline::from_settings(&settings).strategies(),
        vec!["local-filter", "frame-capture"]
    );
    settings.remote_url = Some("http://localhost:3001".to_owned());
    assert_eq!(
        ExportPipeline::from_settings(&settings).strategies(),
        vec!["remote-filter", "local-filter", "frame-capture"]
    );
}

#[test]
fn spawned_pipeline_reports_back() {
    let dir = tempfile::tempdir().unwrap();
    let (p, _) = pipeline(&[("filter", not_configured), ("capture", produces)]);
    let handle = p.spawn(job(&dir), ExportControl::new()).unwrap();
    assert_eq!(handle.join().unwrap().unwrap().strategy, "capture");
}

#[test]
fn progress_percent_is_clamped() {
    let p = ExportProgress {
        strategy: "x",
        frames_done: 15,
        frames_total: 30,
    };
    assert_eq!(p.percent(), 50);
    let over = ExportProgress {
        frames_done: 40,
        ..p
    };
    assert_eq!(over.percent(), 100);
}
