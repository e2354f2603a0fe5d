use crate::export::settings::ExportSettings;
use crate::foundation::error::{ResourceKind, SubburnError, SubburnResult};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest source accepted for export.
pub const MAX_SOURCE_BYTES: u64 = 500 * 1024 * 1024;

/// Container extensions accepted as export sources.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi", "m4v"];

/// Where the source video comes from.
#[derive(Clone, Debug)]
pub enum SourceMedia {
    /// A file already on local disk.
    File(PathBuf),
    /// A remote URL fetched into the job workspace.
    Url(String),
    /// Uploaded bytes.
    Bytes {
        /// Original file name, used for the extension check.
        name: String,
        /// Declared content type, if the uploader sent one.
        content_type: Option<String>,
        /// Payload.
        bytes: Vec<u8>,
    },
}

impl SourceMedia {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
            Self::Bytes { name, bytes, .. } => format!("{name} ({} bytes)", bytes.len()),
        }
    }

    /// Cheap checks that need no I/O beyond a metadata read.
    pub fn validate(&self) -> SubburnResult<()> {
        match self {
            Self::File(p) => {
                let meta = std::fs::metadata(p).map_err(|e| {
                    SubburnError::resource(
                        ResourceKind::SourceUnavailable,
                        format!("source '{}': {e}", p.display()),
                    )
                })?;
                validate_upload(&p.to_string_lossy(), None, meta.len())
            }
            Self::Url(u) => {
                let url = reqwest::Url::parse(u)
                    .map_err(|e| SubburnError::validation(format!("invalid source url: {e}")))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(SubburnError::validation(format!(
                        "unsupported source url scheme \"{}\"",
                        url.scheme()
                    )));
                }
                Ok(())
            }
            Self::Bytes {
                name,
                content_type,
                bytes,
            } => validate_upload(name, content_type.as_deref(), bytes.len() as u64),
        }
    }
}

/// Reject empty, oversized, or non-video sources before any work starts.
pub fn validate_upload(name: &str, content_type: Option<&str>, len: u64) -> SubburnResult<()> {
    if len == 0 {
        return Err(SubburnError::validation("source video is empty"));
    }
    if len > MAX_SOURCE_BYTES {
        return Err(SubburnError::validation(format!(
            "source video is {len} bytes; the limit is {MAX_SOURCE_BYTES}"
        )));
    }
    let ext_ok = extension_of(name).is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()));
    let type_ok = content_type.is_some_and(is_video_content_type);
    if !ext_ok && !type_ok {
        return Err(SubburnError::validation(format!(
            "unsupported source type for \"{name}\""
        )));
    }
    Ok(())
}

fn is_video_content_type(ct: &str) -> bool {
    let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    matches!(
        essence.as_str(),
        "video/mp4" | "video/webm" | "video/quicktime" | "video/x-matroska" | "video/x-msvideo"
            | "video/x-m4v"
    )
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Per-job scratch directory.
///
/// Every intermediate file of one export (input copy, subtitle file, encoder output) lives here
/// under a name carrying the job id, and the whole directory is removed when the workspace is
/// dropped, on success and failure alike.
pub struct JobWorkspace {
    id: uuid::Uuid,
    dir: tempfile::TempDir,
}

impl JobWorkspace {
    /// Create a fresh workspace under `root` (or the system temp dir).
    pub fn create(root: Option<&Path>) -> SubburnResult<Self> {
        let id = uuid::Uuid::new_v4();
        let prefix = format!("subburn-{id}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(r) => {
                std::fs::create_dir_all(r)?;
                builder.tempdir_in(r)?
            }
            None => builder.tempdir()?,
        };
        tracing::debug!(job = %id, dir = %dir.path().display(), "created job workspace");
        Ok(Self { id, dir })
    }

    /// Job identifier.
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a job-owned file named `{stem}_{id}.{ext}`.
    pub fn file(&self, stem: &str, ext: &str) -> PathBuf {
        self.dir.path().join(format!("{stem}_{}.{ext}", self.id))
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        tracing::debug!(job = %self.id, "removing job workspace");
    }
}

/// Make `source` available as a local file, copying or downloading into `ws` when needed.
#[tracing::instrument(skip_all, fields(source = %source.describe()))]
pub fn materialize(
    source: &SourceMedia,
    ws: &JobWorkspace,
    settings: &ExportSettings,
) -> SubburnResult<PathBuf> {
    source.validate()?;
    match source {
        SourceMedia::File(p) => Ok(p.clone()),
        SourceMedia::Bytes { name, bytes, .. } => {
            let ext = extension_of(name).unwrap_or_else(|| "mp4".to_owned());
            let path = ws.file("input", &ext);
            std::fs::write(&path, bytes)?;
            Ok(path)
        }
        SourceMedia::Url(url) => {
            let ext = reqwest::Url::parse(url)
                .ok()
                .and_then(|u| extension_of(u.path()))
                .filter(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
                .unwrap_or_else(|| "mp4".to_owned());
            let path = ws.file("input", &ext);
            download(url, &path, settings.remote_timeout())?;
            Ok(path)
        }
    }
}

/// Fetch `url` into `dest`.
///
/// 401/403 map to [`ResourceKind::AccessDenied`]; any other transport or status failure maps to
/// [`ResourceKind::SourceUnavailable`].
pub fn download(url: &str, dest: &Path, timeout: Duration) -> SubburnResult<u64> {
    let unavailable = |msg: String| SubburnError::resource(ResourceKind::SourceUnavailable, msg);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SubburnError::evaluation(format!("build http client: {e}")))?;
    let mut resp = client
        .get(url)
        .send()
        .map_err(|e| unavailable(format!("fetch {url}: {e}")))?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SubburnError::resource(
            ResourceKind::AccessDenied,
            format!("fetch {url}: {status}"),
        ));
    }
    if !status.is_success() {
        return Err(unavailable(format!("fetch {url}: {status}")));
    }
    if resp.content_length().is_some_and(|n| n > MAX_SOURCE_BYTES) {
        return Err(SubburnError::validation(format!(
            "source at {url} exceeds {MAX_SOURCE_BYTES} bytes"
        )));
    }

    let mut file = std::fs::File::create(dest)?;
    let written = resp
        .copy_to(&mut file)
        .map_err(|e| unavailable(format!("read body of {url}: {e}")))?;
    file.flush()?;
    if written == 0 {
        return Err(SubburnError::validation("source video is empty"));
    }
    if written > MAX_SOURCE_BYTES {
        return Err(SubburnError::validation(format!(
            "source at {url} exceeds {MAX_SOURCE_BYTES} bytes"
        )));
    }
    tracing::debug!(url, bytes = written, "downloaded source");
    Ok(written)
}

/// Move a finished output out of its workspace to `dest`.
pub fn persist(from: &Path, dest: &Path) -> SubburnResult<()> {
    crate::export::ffmpeg::ensure_parent_dir(dest)?;
    if std::fs::rename(from, dest).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, dest)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/source.rs"]
mod tests;
