use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::segment::{Segment, SegmentId};
use std::collections::HashSet;

/// Time-ordered, non-overlapping sequence of segments.
///
/// Segments may touch (`a.end == b.start`). When they do, lookup at the shared instant resolves
/// to the earlier segment.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Track {
    pub(crate) segments: Vec<Segment>,
}

impl Track {
    /// Validate and wrap a segment list.
    pub fn new(segments: Vec<Segment>) -> SubburnResult<Self> {
        validate_segments(&segments)?;
        Ok(Self { segments })
    }

    /// Build a track from segments in any order, sorting by start time first.
    pub fn from_unsorted(mut segments: Vec<Segment>) -> SubburnResult<Self> {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self::new(segments)
    }

    /// Borrow all segments in time order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return `true` when the track has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Position of the segment with `id`.
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// End time of the last segment, or 0 for an empty track.
    pub fn end_time(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    /// A fresh id not used by any segment.
    pub fn next_id(&self) -> SegmentId {
        SegmentId(
            self.segments
                .iter()
                .map(|s| s.id.0 + 1)
                .max()
                .unwrap_or(0),
        )
    }

    /// Active segment at presentation time `t`.
    ///
    /// Binary search over start times; correct for arbitrary seek order.
    pub fn active_at(&self, t: f64) -> Option<(usize, &Segment)> {
        if t.is_nan() {
            return None;
        }
        let upper = self.segments.partition_point(|s| s.start <= t);
        let idx = upper.checked_sub(1)?;
        self.resolve_candidate(idx, t)
    }

    fn resolve_candidate(&self, idx: usize, t: f64) -> Option<(usize, &Segment)> {
        let seg = self.segments.get(idx)?;
        if !seg.contains(t) {
            return None;
        }
        // A touching predecessor also contains `t`; it wins.
        if let Some(prev_idx) = idx.checked_sub(1)
            && self.segments[prev_idx].contains(t)
        {
            return Some((prev_idx, &self.segments[prev_idx]));
        }
        Some((idx, seg))
    }
}

impl TryFrom<Vec<Segment>> for Track {
    type Error = SubburnError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<Track> for Vec<Segment> {
    fn from(track: Track) -> Self {
        track.segments
    }
}

/// Active-segment lookup with a fast path for monotonically advancing time.
///
/// Remembers the last matched index and checks it and its successor first. Anything else (a
/// backward seek, a jump, a gap) falls back to [`Track::active_at`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentCursor {
    last: Option<usize>,
}

impl SegmentCursor {
    /// A cursor with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last match, forcing a full search on the next lookup.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Resolve the active segment at `t`.
    pub fn lookup<'a>(&mut self, track: &'a Track, t: f64) -> Option<(usize, &'a Segment)> {
        if let Some(last) = self.last {
            for idx in [last, last + 1] {
                if track.get(idx).is_some_and(|s| s.contains(t)) {
                    let hit = track.resolve_candidate(idx, t);
                    self.last = hit.map(|(i, _)| i);
                    return hit;
                }
            }
        }
        let hit = track.active_at(t);
        if let Some((i, _)) = hit {
            self.last = Some(i);
        }
        hit
    }
}

pub(crate) fn validate_segments(segments: &[Segment]) -> SubburnResult<()> {
    let mut ids = HashSet::with_capacity(segments.len());
    for seg in segments {
        seg.validate()?;
        if !ids.insert(seg.id) {
            return Err(SubburnError::validation(format!(
                "duplicate segment id {}",
                seg.id.0
            )));
        }
    }
    for pair in segments.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start < a.start {
            return Err(SubburnError::validation(format!(
                "segments must be sorted by start time (segment {} starts before segment {})",
                b.id.0, a.id.0
            )));
        }
        if b.start < a.end {
            return Err(SubburnError::validation(format!(
                "segments {} and {} overlap ({} > {})",
                a.id.0, b.id.0, a.end, b.start
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/track.rs"]
mod tests;
