use crate::foundation::core::Canvas;
use crate::foundation::error::SubburnResult;
use crate::model::segment::SegmentId;
use crate::model::style::Style;
use crate::model::track::{SegmentCursor, Track};
use crate::render::compositor::{Compositor, RenderOutcome};
use crate::render::frame::FrameRGBA;

/// Presentation-time source for the preview, typically the media player.
pub trait MediaClock {
    /// Current presentation time in seconds, read from the source itself.
    fn current_time(&self) -> f64;
    /// Whether the source is advancing.
    fn is_playing(&self) -> bool;
}

/// Result of a tick that rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Presentation time that was rendered.
    pub time: f64,
    /// Active segment at `time`.
    pub segment: Option<SegmentId>,
    /// What the compositor did.
    pub outcome: RenderOutcome,
}

/// Drives the compositor for a live preview.
///
/// While scheduled (playing), every [`tick`](Self::tick) renders. While paused, ticks are
/// no-ops unless [`invalidate`](Self::invalidate) requested a one-shot render, which is what a
/// scrub, a text edit or a style change should do.
pub struct PreviewDriver<C: MediaClock> {
    clock: C,
    compositor: Compositor,
    cursor: SegmentCursor,
    track: Track,
    style: Style,
    surface: FrameRGBA,
    scheduled: bool,
    clock_started: bool,
    dirty: bool,
}

impl<C: MediaClock> PreviewDriver<C> {
    /// Create a paused driver with a pending initial render.
    pub fn new(clock: C, canvas: Canvas, track: Track, style: Style) -> Self {
        Self {
            clock,
            compositor: Compositor::new(),
            cursor: SegmentCursor::new(),
            track,
            style,
            surface: FrameRGBA::transparent(canvas.width, canvas.height),
            scheduled: false,
            clock_started: false,
            dirty: true,
        }
    }

    /// Use a specific compositor (e.g. one with extra fonts registered).
    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Start per-frame rendering. Calling it while already playing does nothing.
    ///
    /// The clock may start after this call; scheduling only stops on its own once the clock has
    /// been seen playing and then reports it stopped.
    pub fn play(&mut self) {
        if !self.scheduled {
            tracing::debug!("preview scheduling started");
            self.clock_started = false;
        }
        self.scheduled = true;
    }

    /// Stop per-frame rendering. Calling it while paused does nothing.
    pub fn pause(&mut self) {
        if self.scheduled {
            tracing::debug!("preview scheduling stopped");
        }
        self.scheduled = false;
    }

    /// Whether ticks currently render every frame.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Whether the next tick will render.
    pub fn needs_tick(&self) -> bool {
        self.scheduled || self.dirty
    }

    /// Request a single render on the next tick, even while paused.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Replace the segments being previewed.
    pub fn set_track(&mut self, track: Track) {
        self.track = track;
        self.cursor.reset();
        self.invalidate();
    }

    /// Replace the style being previewed.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
        self.invalidate();
    }

    /// Resize the preview surface (e.g. after the media's dimensions become known).
    pub fn resize(&mut self, canvas: Canvas) {
        if self.surface.canvas() != canvas {
            self.surface = FrameRGBA::transparent(canvas.width, canvas.height);
        }
        self.invalidate();
    }

    /// Segments being previewed.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Style being previewed.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Media clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable media clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Last rendered overlay (premultiplied RGBA).
    pub fn surface(&self) -> &FrameRGBA {
        &self.surface
    }

    /// Render if playing or invalidated; returns `None` when nothing was due.
    ///
    /// Time is read from the clock on every call so a seek is never shown late. When a clock that
    /// was playing reports it stopped, scheduling stops after this render.
    pub fn tick(&mut self) -> SubburnResult<Option<TickReport>> {
        if !self.needs_tick() {
            return Ok(None);
        }
        let t = self.clock.current_time();
        self.dirty = false;
        if self.scheduled {
            if self.clock.is_playing() {
                self.clock_started = true;
            } else if self.clock_started {
                self.pause();
            }
        }

        self.surface.clear();
        let hit = self.cursor.lookup(&self.track, t);
        let segment = hit.map(|(_, s)| s.id);
        let outcome = match hit {
            Some((_, seg)) => {
                self.compositor
                    .render(&mut self.surface, Some(seg), &self.style, t - seg.start)?
            }
            None => RenderOutcome::NoSegment,
        };
        Ok(Some(TickReport {
            time: t,
            segment,
            outcome,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/driver.rs"]
mod tests;
