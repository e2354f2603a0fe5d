use super::*;
use crate::model::segment::Segment;
use std::cell::Cell;

struct FakeClock {
    t: Cell<f64>,
    playing: Cell<bool>,
    reads: Cell<u32>,
}

impl FakeClock {
    fn new(t: f64) -> Self {
        Self {
            t: Cell::new(t),
            playing: Cell::new(false),
            reads: Cell::new(0),
        }
    }
}

impl MediaClock for FakeClock {
    fn current_time(&self) -> f64 {
        self.reads.set(self.reads.get() + 1);
        self.t.get()
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

fn driver(t: f64) -> PreviewDriver<FakeClock> {
    let track = Track::new(vec![
        Segment::new(0, 0.0, 2.0, "Hello"),
        Segment::new(1, 2.0, 4.0, "World"),
    ])
    .unwrap();
    PreviewDriver::new(FakeClock::new(t), Canvas::new(64, 36), track, Style::default())
}

#[test]
fn paused_driver_renders_once_per_invalidate() {
    let mut d = driver(1.5);
    let first = d.tick().unwrap().unwrap();
    assert_eq!(first.segment, Some(SegmentId(0)));
    assert!(d.tick().unwrap().is_none());
    assert_eq!(d.clock().reads.get(), 1);

    d.clock().t.set(2.5);
    assert!(d.tick().unwrap().is_none());
    d.invalidate();
    let scrubbed = d.tick().unwrap().unwrap();
    assert_eq!(scrubbed.segment, Some(SegmentId(1)));
    assert_eq!(scrubbed.time, 2.5);
}

#[test]
fn playing_driver_reads_clock_every_tick() {
    let mut d = driver(0.5);
    d.clock().playing.set(true);
    d.play();
    d.play();
    assert!(d.is_scheduled());
    for t in [0.6, 3.0, 1.0, 9.0] {
        d.clock().t.set(t);
        let r = d.tick().unwrap().unwrap();
        assert_eq!(r.time, t);
    }
    let r = d.tick().unwrap().unwrap();
    assert_eq!(r.segment, None);
    assert_eq!(r.outcome, RenderOutcome::NoSegment);
    assert!(d.surface().data.iter().all(|&b| b == 0));

    d.pause();
    d.pause();
    assert!(!d.is_scheduled());
    assert!(d.tick().unwrap().is_none());
}

#[test]
fn scheduling_stops_when_media_stops() {
    let mut d = driver(1.0);
    d.clock().playing.set(true);
    d.play();
    assert!(d.tick().unwrap().is_some());
    assert!(d.is_scheduled());

    d.clock().playing.set(false);
    assert!(d.tick().unwrap().is_some());
    assert!(!d.is_scheduled());
    assert!(d.tick().unwrap().is_none());
}

#[test]
fn play_before_the_clock_starts_keeps_scheduling() {
    let mut d = driver(1.0);
    d.play();
    assert!(d.tick().unwrap().is_some());
    assert!(d.is_scheduled());

    d.clock().playing.set(true);
    d.clock().t.set(2.5);
    let r = d.tick().unwrap().unwrap();
    assert_eq!(r.segment, Some(SegmentId(1)));
    assert!(d.is_scheduled());

    d.clock().playing.set(false);
    d.tick().unwrap();
    assert!(!d.is_scheduled());

    // A second play waits for the clock again.
    d.play();
    d.tick().unwrap();
    assert!(d.is_scheduled());
}

#[test]
fn edits_trigger_a_render() {
    let mut d = driver(1.0);
    d.tick().unwrap();
    d.set_style(Style {
        font_size: 40.0,
        ..Style::default()
    });
    assert!(d.needs_tick());
    d.tick().unwrap();

    d.set_track(Track::new(vec![Segment::new(7, 0.5, 1.5, "Edited")]).unwrap());
    let r = d.tick().unwrap().unwrap();
    assert_eq!(r.segment, Some(SegmentId(7)));

    d.resize(Canvas::new(0, 0));
    let r = d.tick().unwrap().unwrap();
    assert_eq!(r.outcome, RenderOutcome::EmptySurface);
}
