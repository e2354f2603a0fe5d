//! Track editing operations.
//!
//! Every operation validates before mutating, so a rejected edit leaves the track untouched and
//! an accepted one keeps it sorted, non-overlapping and (once non-empty) non-empty.

use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::segment::{Segment, SegmentId, WordTiming, tokens};
use crate::model::track::{Track, validate_segments};

/// Length in seconds of a segment inserted where no neighbor constrains it.
pub const DEFAULT_INSERT_SECS: f64 = 2.0;

/// Where to divide a segment's text when splitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitAt {
    /// At the first explicit newline, else after the first half of the words (rounded up).
    #[default]
    Auto,
    /// At a byte offset into the text; must be a char boundary strictly inside it.
    ByteOffset(usize),
}

impl Track {
    /// Split the segment at `index` at its temporal midpoint.
    ///
    /// Returns the ids of the two halves; the left half keeps the original id.
    pub fn split(&mut self, index: usize, at: SplitAt) -> SubburnResult<(SegmentId, SegmentId)> {
        let seg = self.segment_or_err(index)?;
        let (left_text, right_text) = split_text(&seg.text, at)?;
        let mid = seg.start + seg.duration() / 2.0;
        let right_id = self.next_id();

        let (left_words, right_words) = match &seg.words {
            Some(words) => {
                let (l, r) = partition_words(words, mid);
                (Some(l), Some(r))
            }
            None => (None, None),
        };

        let left = Segment {
            id: seg.id,
            start: seg.start,
            end: mid,
            text: left_text,
            words: left_words,
        };
        let right = Segment {
            id: right_id,
            start: mid,
            end: seg.end,
            text: right_text,
            words: right_words,
        };

        let mut next = self.segments.clone();
        next.splice(index..=index, [left, right]);
        self.commit(next)?;
        tracing::debug!(index, right_id = right_id.0, "split segment");
        Ok((self.segments[index].id, right_id))
    }

    /// Insert an empty segment before position `index` (`index == len` appends).
    ///
    /// The new segment fills the gap between its neighbors; with one neighbor it takes a
    /// [`DEFAULT_INSERT_SECS`] window adjacent to it, and in an empty track it covers
    /// `[0, DEFAULT_INSERT_SECS]`. Fails when the neighbors leave no room.
    pub fn insert(&mut self, index: usize) -> SubburnResult<SegmentId> {
        if index > self.segments.len() {
            return Err(SubburnError::validation(format!(
                "insert index {index} out of range (len {})",
                self.segments.len()
            )));
        }
        let prev = index.checked_sub(1).and_then(|i| self.segments.get(i));
        let next = self.segments.get(index);

        let (start, end) = match (prev, next) {
            (Some(p), Some(n)) => (p.end, n.start),
            (Some(p), None) => (p.end, p.end + DEFAULT_INSERT_SECS),
            (None, Some(n)) => ((n.start - DEFAULT_INSERT_SECS).max(0.0), n.start),
            (None, None) => (0.0, DEFAULT_INSERT_SECS),
        };
        if end <= start {
            return Err(SubburnError::validation(
                "no room to insert a segment between its neighbors",
            ));
        }

        let id = self.next_id();
        let mut segs = self.segments.clone();
        segs.insert(
            index,
            Segment {
                id,
                start,
                end,
                text: String::new(),
                words: None,
            },
        );
        self.commit(segs)?;
        tracing::debug!(index, id = id.0, start, end, "inserted segment");
        Ok(id)
    }

    /// Remove the segment at `index`.
    ///
    /// Refuses to remove the last remaining segment.
    pub fn delete(&mut self, index: usize) -> SubburnResult<Segment> {
        self.segment_or_err(index)?;
        if self.segments.len() <= 1 {
            return Err(SubburnError::validation(
                "cannot delete the only remaining segment",
            ));
        }
        Ok(self.segments.remove(index))
    }

    /// Merge the segment at `index` with its successor.
    pub fn merge_with_next(&mut self, index: usize) -> SubburnResult<SegmentId> {
        let a = self.segment_or_err(index)?;
        let b = self.segment_or_err(index + 1)?;

        let text = match (a.text.is_empty(), b.text.is_empty()) {
            (true, _) => b.text.clone(),
            (_, true) => a.text.clone(),
            _ => format!("{} {}", a.text.trim_end(), b.text.trim_start()),
        };
        let words = match (&a.words, &b.words) {
            (Some(wa), Some(wb)) => Some(wa.iter().chain(wb.iter()).cloned().collect()),
            _ => None,
        };
        let merged = Segment {
            id: a.id,
            start: a.start,
            end: b.end,
            text,
            words,
        };

        let mut segs = self.segments.clone();
        segs.splice(index..=index + 1, [merged]);
        self.commit(segs)?;
        Ok(self.segments[index].id)
    }

    /// Replace the text of the segment at `index`, dropping word timing that no longer applies.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> SubburnResult<()> {
        self.segment_or_err(index)?;
        let seg = &mut self.segments[index];
        seg.text = text.into();
        seg.words = None;
        Ok(())
    }

    /// Move the segment at `index` to `[start, end]`, rejecting overlap with its neighbors.
    pub fn set_times(&mut self, index: usize, start: f64, end: f64) -> SubburnResult<()> {
        self.segment_or_err(index)?;
        let mut segs = self.segments.clone();
        let seg = &mut segs[index];
        seg.start = start;
        seg.end = end;
        seg.words = None;
        self.commit(segs)
    }

    fn segment_or_err(&self, index: usize) -> SubburnResult<&Segment> {
        self.segments.get(index).ok_or_else(|| {
            SubburnError::validation(format!(
                "segment index {index} out of range (len {})",
                self.segments.len()
            ))
        })
    }

    fn commit(&mut self, segments: Vec<Segment>) -> SubburnResult<()> {
        validate_segments(&segments)?;
        self.segments = segments;
        Ok(())
    }
}

fn split_text(text: &str, at: SplitAt) -> SubburnResult<(String, String)> {
    match at {
        SplitAt::ByteOffset(off) => {
            if off == 0 || off >= text.len() || !text.is_char_boundary(off) {
                return Err(SubburnError::validation(format!(
                    "split offset {off} is not a char boundary inside the text"
                )));
            }
            Ok((
                text[..off].trim_end().to_owned(),
                text[off..].trim_start().to_owned(),
            ))
        }
        SplitAt::Auto => {
            if let Some((first, rest)) = text.split_once('\n') {
                return Ok((first.trim_end().to_owned(), rest.trim_start().to_owned()));
            }
            let toks = tokens(text);
            let k = toks.len().div_ceil(2);
            let left: String = toks[..k].concat();
            let right: String = toks[k..].concat();
            Ok((left.trim_end().to_owned(), right.trim().to_owned()))
        }
    }
}

fn partition_words(words: &[WordTiming], mid: f64) -> (Vec<WordTiming>, Vec<WordTiming>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for w in words {
        if (w.start + w.end) / 2.0 < mid {
            left.push(WordTiming {
                end: w.end.min(mid),
                ..w.clone()
            });
        } else {
            right.push(WordTiming {
                start: w.start.max(mid),
                ..w.clone()
            });
        }
    }
    (left, right)
}

#[cfg(test)]
#[path = "../../tests/unit/model/edit.rs"]
mod tests;
