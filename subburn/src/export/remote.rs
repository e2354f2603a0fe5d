use crate::export::ffmpeg::Container;
use crate::export::filter::output_path;
use crate::export::settings::ExportSettings;
use crate::export::source::{JobWorkspace, SourceMedia, persist};
use crate::export::{ExportArtifact, ExportControl, ExportError, ExportJob, Exporter};
use crate::foundation::error::SubburnError;
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use std::io::Write as _;

/// Path of the export route below the configured base URL.
pub const EXPORT_ROUTE: &str = "/api/export";

/// Error body returned by an export service.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceError {
    /// Set when the service has no burn-in backend.
    pub not_available: bool,
    /// Diagnostic message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Hands the whole job to an HTTP export service in one multipart request.
///
/// The request carries `video` (file bytes) or `videoUrl`, plus `subtitles` and `style` as JSON.
/// When `settings.remote_token` is set it is sent as a bearer credential. HTTP 401/403/404/501, an
/// unreachable host, or a `{"notAvailable": true}` body mean the service cannot help and the next
/// strategy is tried.
#[derive(Clone, Debug)]
pub struct RemoteExporter {
    settings: ExportSettings,
}

impl RemoteExporter {
    /// Strategy name.
    pub const NAME: &'static str = "remote-filter";

    /// Exporter targeting `settings.remote_url`.
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Full URL of the export route, if a service is configured.
    pub fn endpoint(&self) -> Option<String> {
        let base = self.settings.remote_url.as_deref()?.trim();
        if base.is_empty() {
            return None;
        }
        Some(format!("{}{EXPORT_ROUTE}", base.trim_end_matches('/')))
    }

    fn form(&self, job: &ExportJob) -> Result<Form, ExportError> {
        let subtitles = serde_json::to_string(job.track.segments())
            .map_err(|e| SubburnError::serde(format!("encode subtitles: {e}")))?;
        let style = serde_json::to_string(&job.style)
            .map_err(|e| SubburnError::serde(format!("encode style: {e}")))?;
        let form = Form::new().text("subtitles", subtitles).text("style", style);

        let form = match &job.source {
            SourceMedia::Url(url) => form.text("videoUrl", url.clone()),
            SourceMedia::File(path) => form.part("video", Part::file(path)?),
            SourceMedia::Bytes {
                name,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(name.clone());
                if let Some(ct) = content_type {
                    part = part.mime_str(ct).map_err(|e| {
                        SubburnError::validation(format!("invalid content type \"{ct}\": {e}"))
                    })?;
                }
                form.part("video", part)
            }
        };
        Ok(form)
    }

    fn request(
        &self,
        client: &reqwest::blocking::Client,
        endpoint: &str,
        form: Form,
    ) -> reqwest::blocking::RequestBuilder {
        let req = client.post(endpoint).multipart(form);
        match self.settings.remote_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        }
    }
}

impl Exporter for RemoteExporter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[tracing::instrument(skip_all, fields(strategy = Self::NAME))]
    fn attempt(
        &self,
        job: &ExportJob,
        control: &ExportControl,
    ) -> Result<ExportArtifact, ExportError> {
        let Some(endpoint) = self.endpoint() else {
            return Err(ExportError::NotAvailable("no export service configured".to_owned()));
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.settings.remote_timeout())
            .build()
            .map_err(|e| SubburnError::evaluation(format!("build http client: {e}")))?;
        let form = self.form(job)?;

        control.check_cancel()?;
        tracing::debug!(%endpoint, "submitting export job");
        let mut resp = match self.request(&client, &endpoint, form).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() => {
                return Err(ExportError::NotAvailable(format!("{endpoint} unreachable: {e}")));
            }
            Err(e) => {
                return Err(SubburnError::evaluation(format!("export request failed: {e}")).into());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let container = container_of(
            resp.headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let Some(container) = container else {
            let body = resp.text().unwrap_or_default();
            return Err(classify_failure(status, &body));
        };

        let ws = JobWorkspace::create(self.settings.temp_dir.as_deref())?;
        let tmp = ws.file("output", container.extension());
        let mut file = std::fs::File::create(&tmp)?;
        let written = resp
            .copy_to(&mut file)
            .map_err(|e| SubburnError::evaluation(format!("read export response: {e}")))?;
        file.flush()?;
        if written == 0 {
            return Err(SubburnError::evaluation("export service returned an empty file").into());
        }

        let dest = output_path(&job.output, container);
        persist(&tmp, &dest)?;
        Ok(ExportArtifact {
            path: dest,
            container,
            strategy: Self::NAME,
        })
    }
}

/// Container for a response `Content-Type`; `None` when the body is not a video.
pub(crate) fn container_of(content_type: Option<&str>) -> Option<Container> {
    let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "video/mp4" => Some(Container::Mp4),
        "video/webm" => Some(Container::Webm),
        "application/octet-stream" => Some(Container::Mp4),
        _ => None,
    }
}

/// Map a non-video response onto the export taxonomy.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> ExportError {
    let parsed: ServiceError = serde_json::from_str(body).unwrap_or_default();
    if parsed.not_available
        || status == StatusCode::NOT_IMPLEMENTED
        || status == StatusCode::NOT_FOUND
    {
        return ExportError::NotAvailable(format!("export service answered {status}"));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ExportError::NotAvailable(format!("export service refused credentials ({status})"));
    }
    let detail = parsed.error.unwrap_or_else(|| body.trim().to_owned());
    if status.is_client_error() {
        SubburnError::validation(format!("export service rejected the job ({status}): {detail}"))
            .into()
    } else {
        SubburnError::evaluation(format!("export service failed ({status}): {detail}")).into()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/remote.rs"]
mod tests;
