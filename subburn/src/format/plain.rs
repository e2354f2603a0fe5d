use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::segment::Segment;

/// Segment texts separated by blank lines; blank segments are skipped.
pub fn to_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(serde::Serialize)]
struct JsonSegment<'a> {
    start: f64,
    end: f64,
    text: &'a str,
}

#[derive(serde::Serialize)]
struct JsonExport<'a> {
    segments: Vec<JsonSegment<'a>>,
}

/// `{"segments":[{"start","end","text"}]}` as pretty JSON.
pub fn to_json(segments: &[Segment]) -> SubburnResult<String> {
    let export = JsonExport {
        segments: segments
            .iter()
            .map(|s| JsonSegment {
                start: s.start,
                end: s.end,
                text: &s.text,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&export)
        .map_err(|e| SubburnError::serde(format!("encode transcript JSON: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/format/plain.rs"]
mod tests;
