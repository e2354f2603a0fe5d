use crate::model::segment::{Segment, token_starts};
use crate::model::style::{DisplayMode, Style};
use std::ops::Range;

/// Time from segment start until progressive modes show the full text.
///
/// Fixed regardless of segment length.
pub const REVEAL_DURATION_SECS: f64 = 0.5;

/// How many of `total` units are visible `elapsed` seconds into a segment.
///
/// At least one unit is shown from the first instant; the count never decreases as `elapsed`
/// grows and reaches `total` at [`REVEAL_DURATION_SECS`].
pub fn revealed_units(total: usize, elapsed: f64) -> usize {
    if total == 0 {
        return 0;
    }
    let p = if elapsed.is_nan() {
        0.0
    } else {
        (elapsed / REVEAL_DURATION_SECS).clamp(0.0, 1.0)
    };
    ((p * total as f64).ceil() as usize).clamp(1, total)
}

/// Offsets (seconds from segment start) at which the visible unit count increments.
pub fn reveal_step_offsets(total: usize) -> Vec<f64> {
    (1..total)
        .map(|k| k as f64 * REVEAL_DURATION_SECS / total as f64)
        .collect()
}

impl DisplayMode {
    /// Whether the text is disclosed progressively.
    pub fn is_progressive(self) -> bool {
        matches!(self, Self::WordByWord | Self::CharacterByCharacter)
    }

    /// Number of reveal units in `text` for this mode (0 for static modes).
    pub fn unit_count(self, text: &str) -> usize {
        match self {
            Self::LineByLine | Self::MultipleLines => 0,
            Self::WordByWord => token_starts(text).len(),
            Self::CharacterByCharacter => text.chars().count(),
        }
    }

    /// Visible prefix of `text` at `elapsed` seconds into the segment.
    pub fn reveal(self, text: &str, elapsed: f64) -> &str {
        match self {
            Self::LineByLine | Self::MultipleLines => text,
            Self::WordByWord => {
                let starts = token_starts(text);
                let k = revealed_units(starts.len(), elapsed);
                match starts.get(k) {
                    Some(&cut) => text[..cut].trim_end(),
                    None => text,
                }
            }
            Self::CharacterByCharacter => {
                let total = text.chars().count();
                let k = revealed_units(total, elapsed);
                match text.char_indices().nth(k) {
                    Some((cut, _)) => &text[..cut],
                    None => text,
                }
            }
        }
    }
}

/// Text to draw for one frame plus the byte range of the emphasized word, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameText {
    /// Visible text.
    pub text: String,
    /// Byte range within `text` of the currently spoken word.
    pub highlight: Option<Range<usize>>,
}

/// Resolve what a segment shows `elapsed` seconds after it became active.
pub fn frame_text(seg: &Segment, style: &Style, elapsed: f64) -> FrameText {
    let text = style.display_mode.reveal(&seg.text, elapsed);
    let wants_highlight = style.display_mode == DisplayMode::WordByWord
        && (style.highlight_color.is_some() || style.highlight_scale.is_some());

    let highlight = if wants_highlight {
        seg.active_word_at(seg.start + elapsed.max(0.0))
            .and_then(|i| word_range(&seg.text, i))
            .filter(|r| r.end <= text.len())
    } else {
        None
    };

    FrameText {
        text: text.to_owned(),
        highlight,
    }
}

/// Byte range of token `i` without surrounding whitespace.
pub(crate) fn word_range(text: &str, i: usize) -> Option<Range<usize>> {
    let starts = token_starts(text);
    let s = *starts.get(i)?;
    let e = starts.get(i + 1).copied().unwrap_or(text.len());
    let tok = &text[s..e];
    let lead = tok.len() - tok.trim_start().len();
    let content = tok.trim();
    if content.is_empty() {
        return None;
    }
    Some(s + lead..s + lead + content.len())
}

#[cfg(test)]
#[path = "../../tests/unit/render/reveal.rs"]
mod tests;
