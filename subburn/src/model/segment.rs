use crate::foundation::error::{SubburnError, SubburnResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Opaque segment identifier, unique within a track.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u64);

/// Timed sub-span of a segment's text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Token text, including any whitespace that follows it.
    pub text: String,
}

/// A single time-coded subtitle unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier, unique within its track.
    pub id: SegmentId,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds, strictly after `start`.
    pub end: f64,
    /// Display text; `\n` forces a line break.
    pub text: String,
    /// Word-level timing from the transcriber, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

impl Segment {
    /// Build a segment without word timing.
    pub fn new(id: u64, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: SegmentId(id),
            start,
            end,
            text: text.into(),
            words: None,
        }
    }

    /// Segment length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside the closed interval `[start, end]`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Check timing invariants for this segment in isolation.
    pub fn validate(&self) -> SubburnResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SubburnError::validation(format!(
                "segment {} has non-finite times",
                self.id.0
            )));
        }
        if self.start < 0.0 {
            return Err(SubburnError::validation(format!(
                "segment {} starts before 0 ({})",
                self.id.0, self.start
            )));
        }
        if self.start >= self.end {
            return Err(SubburnError::validation(format!(
                "segment {} must have start < end (got {} >= {})",
                self.id.0, self.start, self.end
            )));
        }
        if let Some(words) = &self.words {
            let mut prev_end = self.start;
            for w in words {
                if !(w.start.is_finite() && w.end.is_finite())
                    || w.start > w.end
                    || w.start < prev_end - TIME_EPSILON
                    || w.end > self.end + TIME_EPSILON
                {
                    return Err(SubburnError::validation(format!(
                        "segment {} has word timing outside its range or out of order",
                        self.id.0
                    )));
                }
                prev_end = w.end;
            }
        }
        Ok(())
    }

    /// Word timing for this segment.
    ///
    /// Uses the transcriber's timing when present; otherwise divides the duration evenly across
    /// whitespace-delimited tokens in source order.
    pub fn word_timings(&self) -> Cow<'_, [WordTiming]> {
        match &self.words {
            Some(w) if !w.is_empty() => Cow::Borrowed(w.as_slice()),
            _ => Cow::Owned(synthesize_word_timings(&self.text, self.start, self.end)),
        }
    }

    /// Index of the word spoken at `t`, if any.
    pub fn active_word_at(&self, t: f64) -> Option<usize> {
        self.word_timings()
            .iter()
            .position(|w| w.start <= t && t <= w.end)
    }
}

/// Tolerance used when comparing word boundaries against segment boundaries.
pub(crate) const TIME_EPSILON: f64 = 1e-6;

/// Byte offsets where whitespace-delimited tokens begin.
///
/// The first token always starts at 0 so leading whitespace stays with it; every later token
/// begins at the first non-whitespace character after a whitespace run. Whitespace between
/// tokens therefore belongs to the preceding token.
pub(crate) fn token_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut seen_word = false;
    let mut prev_ws = false;
    for (i, c) in text.char_indices() {
        let ws = c.is_whitespace();
        if !ws {
            if !seen_word {
                starts.push(0);
                seen_word = true;
            } else if prev_ws {
                starts.push(i);
            }
        }
        prev_ws = ws;
    }
    starts
}

/// Split `text` into tokens that each carry their trailing whitespace.
pub(crate) fn tokens(text: &str) -> Vec<&str> {
    let starts = token_starts(text);
    starts
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let e = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[s..e]
        })
        .collect()
}

fn synthesize_word_timings(text: &str, start: f64, end: f64) -> Vec<WordTiming> {
    let toks = tokens(text);
    let n = toks.len();
    let step = (end - start) / n.max(1) as f64;
    toks.into_iter()
        .enumerate()
        .map(|(i, t)| WordTiming {
            start: start + step * i as f64,
            end: if i + 1 == n {
                end
            } else {
                start + step * (i + 1) as f64
            },
            text: t.to_owned(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/model/segment.rs"]
mod tests;
