//! Subtitle interchange formats.
//!
//! SRT and WebVTT are produced and parsed from the same timestamp rule; ASS is generated for
//! filter-graph burn-in; plain text and JSON are export-only.

/// Advanced SubStation Alpha generation.
pub mod ass;
/// Plain-text and JSON transcript export.
pub mod plain;
/// SubRip (`HH:MM:SS,mmm`).
pub mod srt;
/// Shared timestamp formatting and parsing.
pub mod timestamp;
/// WebVTT (`HH:MM:SS.mmm`).
pub mod vtt;

use crate::foundation::error::{SubburnError, SubburnResult};

/// Output formats supported by [`render_format`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip.
    Srt,
    /// WebVTT.
    Vtt,
    /// Advanced SubStation Alpha.
    Ass,
    /// Blank-line separated text.
    Txt,
    /// `{segments:[{start,end,text}]}`.
    Json,
}

impl SubtitleFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }

    /// MIME type for downloads.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Srt => "application/x-subrip",
            Self::Vtt => "text/vtt",
            Self::Ass => "text/x-ssa",
            Self::Txt => "text/plain; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = SubburnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "ass" | "ssa" => Ok(Self::Ass),
            "txt" | "text" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(SubburnError::validation(format!(
                "unsupported subtitle format \"{other}\""
            ))),
        }
    }
}

/// Render a document's track in `format`.
///
/// `play_res` is only used by ASS, where it should match the source video resolution.
pub fn render_format(
    format: SubtitleFormat,
    doc: &crate::model::document::Document,
    play_res: crate::foundation::core::Canvas,
) -> SubburnResult<String> {
    let segments = doc.segments.segments();
    match format {
        SubtitleFormat::Srt => Ok(srt::to_srt(segments)),
        SubtitleFormat::Vtt => Ok(vtt::to_vtt(segments)),
        SubtitleFormat::Ass => Ok(ass::to_ass(&doc.segments, &doc.style, play_res)),
        SubtitleFormat::Txt => Ok(plain::to_text(segments)),
        SubtitleFormat::Json => plain::to_json(segments),
    }
}
