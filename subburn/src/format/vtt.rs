use crate::foundation::error::{SubburnError, SubburnResult};
use crate::format::srt::{parse_cues, write_cues};
use crate::model::segment::Segment;

/// Generate WebVTT text with numeric cue identifiers. Cue text is normalized as in
/// [`to_srt`](crate::format::srt::to_srt).
pub fn to_vtt(segments: &[Segment]) -> String {
    write_cues(segments, '.', String::from("WEBVTT\n\n"))
}

/// Parse WebVTT text. The `WEBVTT` header is required; `NOTE`/`STYLE` blocks are skipped.
pub fn parse_vtt(input: &str) -> SubburnResult<Vec<Segment>> {
    let first = input
        .trim_start_matches('\u{feff}')
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    if !first.trim_start().starts_with("WEBVTT") {
        return Err(SubburnError::validation("missing WEBVTT header"));
    }
    parse_cues(input)
}

#[cfg(test)]
#[path = "../../tests/unit/format/vtt.rs"]
mod tests;
