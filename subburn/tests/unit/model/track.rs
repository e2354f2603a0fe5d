use super::*;

fn track(spans: &[(f64, f64)]) -> Track {
    Track::new(
        spans
            .iter()
            .enumerate()
            .map(|(i, &(s, e))| Segment::new(i as u64, s, e, format!("seg{i}")))
            .collect(),
    )
    .unwrap()
}

fn brute_force(track: &Track, t: f64) -> Option<usize> {
    track.segments().iter().position(|s| s.contains(t))
}

#[test]
fn hello_world_lookup() {
    let tr = Track::new(vec![
        Segment::new(0, 0.0, 2.0, "Hello"),
        Segment::new(1, 2.0, 4.0, "World"),
    ])
    .unwrap();
    assert_eq!(tr.active_at(1.5).map(|(_, s)| s.text.as_str()), Some("Hello"));
    assert_eq!(tr.active_at(2.5).map(|(_, s)| s.text.as_str()), Some("World"));
    assert!(tr.active_at(5.0).is_none());
    // Shared boundary resolves to the earlier segment.
    assert_eq!(tr.active_at(2.0).map(|(i, _)| i), Some(0));
}

#[test]
fn lookup_matches_brute_force_for_monotonic_and_seek_orders() {
    let tr = track(&[(0.5, 1.0), (1.0, 2.5), (3.0, 3.2), (4.0, 7.0), (7.5, 9.0)]);

    let monotonic: Vec<f64> = (0..=1000).map(|i| i as f64 * 0.01).collect();
    let mut seeks = Vec::new();
    let mut x: u64 = 0x2545_F491_4F6C_DD1D;
    for _ in 0..1000 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        seeks.push((x % 1000) as f64 * 0.01);
    }

    for times in [&monotonic, &seeks] {
        let mut cursor = SegmentCursor::new();
        for &t in times.iter() {
            let expected = brute_force(&tr, t);
            assert_eq!(tr.active_at(t).map(|(i, _)| i), expected, "active_at t={t}");
            assert_eq!(
                cursor.lookup(&tr, t).map(|(i, _)| i),
                expected,
                "cursor t={t}"
            );
        }
    }
}

#[test]
fn cursor_falls_back_after_backward_seek() {
    let tr = track(&[(0.0, 1.0), (2.0, 3.0), (4.0, 5.0)]);
    let mut cursor = SegmentCursor::new();
    assert_eq!(cursor.lookup(&tr, 4.5).map(|(i, _)| i), Some(2));
    assert_eq!(cursor.lookup(&tr, 0.5).map(|(i, _)| i), Some(0));
    assert_eq!(cursor.lookup(&tr, 1.5).map(|(i, _)| i), None);
    assert_eq!(cursor.lookup(&tr, 2.0).map(|(i, _)| i), Some(1));
}

#[test]
fn nan_time_matches_nothing() {
    let tr = track(&[(0.0, 1.0)]);
    assert!(tr.active_at(f64::NAN).is_none());
}

#[test]
fn rejects_overlap_unsorted_and_duplicate_ids() {
    assert!(
        Track::new(vec![
            Segment::new(0, 0.0, 2.0, "a"),
            Segment::new(1, 1.5, 3.0, "b"),
        ])
        .is_err()
    );
    assert!(
        Track::new(vec![
            Segment::new(0, 2.0, 3.0, "a"),
            Segment::new(1, 0.0, 1.0, "b"),
        ])
        .is_err()
    );
    assert!(
        Track::new(vec![
            Segment::new(0, 0.0, 1.0, "a"),
            Segment::new(0, 1.0, 2.0, "b"),
        ])
        .is_err()
    );
    let tr = Track::from_unsorted(vec![
        Segment::new(0, 2.0, 3.0, "a"),
        Segment::new(1, 0.0, 1.0, "b"),
    ])
    .unwrap();
    assert_eq!(tr.get(0).unwrap().text, "b");
    assert_eq!(tr.next_id(), SegmentId(2));
}

#[test]
fn serde_validates_on_load() {
    let ok: Track =
        serde_json::from_str(r#"[{"id":0,"start":0,"end":1,"text":"a"}]"#).unwrap();
    assert_eq!(ok.len(), 1);
    let bad = serde_json::from_str::<Track>(
        r#"[{"id":0,"start":0,"end":2,"text":"a"},{"id":1,"start":1,"end":3,"text":"b"}]"#,
    );
    assert!(bad.is_err());
}
