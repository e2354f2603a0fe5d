/// Convenience result type used across subburn.
pub type SubburnResult<T> = Result<T, SubburnError>;

/// What kind of external resource an operation failed to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Source media could not be read or fetched.
    SourceUnavailable,
    /// Source media exists but access was refused (for example a 403 from a remote host).
    AccessDenied,
    /// Creating, writing or reading a job-owned temporary file failed.
    TempIo,
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SubburnError {
    /// Invalid user-provided data (segment times, style fields, empty or unsupported sources).
    #[error("validation error: {0}")]
    Validation(String),

    /// An external resource needed by the operation was unreachable.
    #[error("resource error ({kind:?}): {msg}")]
    Resource {
        /// Resource failure class.
        kind: ResourceKind,
        /// Diagnostic detail, never shown to end users.
        msg: String,
    },

    /// Errors while rendering, encoding or running an external tool.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubburnError {
    /// Build a [`SubburnError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SubburnError::Resource`] value.
    pub fn resource(kind: ResourceKind, msg: impl Into<String>) -> Self {
        Self::Resource {
            kind,
            msg: msg.into(),
        }
    }

    /// Build a [`SubburnError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`SubburnError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Map this error into the fixed set of user-facing categories.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Serde(_) => ErrorCategory::UnsupportedInput,
            Self::Resource {
                kind: ResourceKind::SourceUnavailable | ResourceKind::AccessDenied,
                ..
            } => ErrorCategory::SourceUnavailable,
            Self::Resource {
                kind: ResourceKind::TempIo,
                ..
            }
            | Self::Evaluation(_)
            | Self::Other(_) => ErrorCategory::ExportFailedRetryable,
        }
    }
}

impl From<std::io::Error> for SubburnError {
    fn from(e: std::io::Error) -> Self {
        Self::resource(ResourceKind::TempIo, e.to_string())
    }
}

/// User-visible failure categories.
///
/// End users only ever see [`ErrorCategory::user_message`]; the underlying error is logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Malformed timing data, empty file, or unsupported media type.
    UnsupportedInput,
    /// The source media could not be fetched or was blocked.
    SourceUnavailable,
    /// The export failed but trying again may succeed.
    ExportFailedRetryable,
    /// No export strategy can run in this environment.
    ExportUnsupported,
}

impl ErrorCategory {
    /// Fixed message suitable for display to an end user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::UnsupportedInput => {
                "The video or subtitle data is not supported. Check the file and segment timings."
            }
            Self::SourceUnavailable => {
                "The source video could not be loaded. Try downloading the subtitle file instead."
            }
            Self::ExportFailedRetryable => "Export failed. Please try again.",
            Self::ExportUnsupported => {
                "Burned-in export is not available here. Download the subtitle file instead."
            }
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
