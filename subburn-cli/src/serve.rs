//! HTTP export service: burns subtitles with the local `ffmpeg` subtitles filter.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use subburn::export::remote::{EXPORT_ROUTE, ServiceError};
use subburn::{ErrorCategory, ExportError, Exporter as _};

use crate::ServeArgs;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Listen address.
    pub bind: String,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Directory for job workspaces.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".to_owned(),
            max_upload_bytes: subburn::export::source::MAX_SOURCE_BYTES as usize + 1024 * 1024,
            temp_dir: None,
        }
    }
}

impl ServeConfig {
    /// Defaults overridden by `SUBBURN_BIND`, `SUBBURN_MAX_UPLOAD_BYTES` and `SUBBURN_TEMP_DIR`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind: std::env::var("SUBBURN_BIND").unwrap_or(d.bind),
            max_upload_bytes: std::env::var("SUBBURN_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(d.max_upload_bytes),
            temp_dir: std::env::var_os("SUBBURN_TEMP_DIR")
                .map(PathBuf::from)
                .or(d.temp_dir),
        }
    }
}

struct AppState {
    settings: subburn::ExportSettings,
}

pub(crate) fn run(args: ServeArgs, mut settings: subburn::ExportSettings) -> anyhow::Result<()> {
    let mut config = ServeConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(dir) = args.temp_dir {
        config.temp_dir = Some(dir);
    }
    if config.temp_dir.is_some() {
        settings.temp_dir = config.temp_dir.clone();
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(serve(config, settings))
}

async fn serve(config: ServeConfig, settings: subburn::ExportSettings) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address \"{}\"", config.bind))?;
    let app = router(Arc::new(AppState { settings }), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "export service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    tracing::info!("export service stopped");
    Ok(())
}

fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(EXPORT_ROUTE, post(export))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ServiceError,
}

impl ApiError {
    fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ServiceError {
                not_available: false,
                error: Some(msg.to_owned()),
            },
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        tracing::warn!(error = %e, "export request failed");
        let category = e.category();
        let status = match category {
            ErrorCategory::ExportUnsupported => StatusCode::NOT_IMPLEMENTED,
            ErrorCategory::UnsupportedInput => StatusCode::BAD_REQUEST,
            ErrorCategory::SourceUnavailable | ErrorCategory::ExportFailedRetryable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            body: ServiceError {
                not_available: category == ErrorCategory::ExportUnsupported,
                error: Some(category.user_message().to_owned()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Default)]
struct ExportForm {
    video: Option<(String, Option<String>, Vec<u8>)>,
    video_url: Option<String>,
    subtitles: Option<String>,
    style: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<ExportForm, ApiError> {
    let mut form = ExportForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "video" => {
                let file_name = field.file_name().unwrap_or("video.mp4").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(&format!("read video: {e}")))?;
                form.video = Some((file_name, content_type, bytes.to_vec()));
            }
            "videoUrl" | "subtitles" | "style" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(&format!("read {name}: {e}")))?;
                match name.as_str() {
                    "videoUrl" => form.video_url = Some(text),
                    "subtitles" => form.subtitles = Some(text),
                    _ => form.style = Some(text),
                }
            }
            other => tracing::debug!(field = other, "ignoring multipart field"),
        }
    }
    Ok(form)
}

fn job_from_form(form: ExportForm, output: PathBuf) -> Result<subburn::ExportJob, ApiError> {
    let source = match (form.video, form.video_url) {
        (Some((name, content_type, bytes)), _) => subburn::SourceMedia::Bytes {
            name,
            content_type,
            bytes,
        },
        (None, Some(url)) if !url.trim().is_empty() => subburn::SourceMedia::Url(url),
        _ => return Err(ApiError::bad_request("No video file or URL provided")),
    };
    let segments: Vec<subburn::Segment> = match form.subtitles.as_deref() {
        Some(s) => serde_json::from_str(s)
            .map_err(|e| ApiError::bad_request(&format!("invalid subtitles JSON: {e}")))?,
        None => Vec::new(),
    };
    if segments.is_empty() {
        return Err(ApiError::bad_request("No subtitles provided"));
    }
    let track = subburn::Track::from_unsorted(segments)
        .map_err(|e| ApiError::from(ExportError::from(e)))?;
    let style = match form.style.as_deref() {
        Some(s) if !s.trim().is_empty() => serde_json::from_str(s)
            .map_err(|e| ApiError::bad_request(&format!("invalid style JSON: {e}")))?,
        _ => subburn::Style::default(),
    };
    Ok(subburn::ExportJob {
        source,
        track,
        style,
        output,
    })
}

async fn export(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match export_inner(state, multipart).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    }
}

async fn export_inner(state: Arc<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    let form = read_form(multipart).await?;
    let job_id = uuid::Uuid::new_v4();

    let settings = state.settings.clone();
    let (bytes, container) = tokio::task::spawn_blocking(move || {
        // Output lives in its own directory so every exit path removes it.
        let out_dir = match &settings.temp_dir {
            Some(root) => tempfile::Builder::new().prefix("subburn-serve-").tempdir_in(root),
            None => tempfile::Builder::new().prefix("subburn-serve-").tempdir(),
        }
        .map_err(|e| ExportError::from(subburn::SubburnError::from(e)))?;
        let output = out_dir.path().join(format!("subtitled_{job_id}.mp4"));
        let job = job_from_form(form, output)?;
        job.validate().map_err(ExportError::from)?;

        let exporter = subburn::LocalFilterExporter::new(settings);
        let artifact = exporter.attempt(&job, &subburn::ExportControl::new())?;
        let bytes = std::fs::read(&artifact.path).map_err(ExportError::from)?;
        Ok::<_, ApiError>((bytes, artifact.container))
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "export task panicked");
        ApiError::from(ExportError::from(subburn::SubburnError::evaluation(
            "export task failed",
        )))
    })??;

    tracing::info!(job = %job_id, bytes = bytes.len(), "export served");
    let disposition = format!(
        "attachment; filename=\"subtitled_{job_id}.{}\"",
        container.extension()
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, container.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
