use super::*;

fn assert_invariants(track: &Track) {
    validate_segments(track.segments()).unwrap();
}

#[test]
fn split_on_newline_at_temporal_midpoint() {
    let mut tr = Track::new(vec![Segment::new(0, 0.0, 4.0, "Line one\nLine two")]).unwrap();
    let (l, r) = tr.split(0, SplitAt::Auto).unwrap();
    assert_eq!(l, SegmentId(0));
    assert_eq!(r, SegmentId(1));
    let segs = tr.segments();
    assert_eq!(segs.len(), 2);
    assert_eq!((segs[0].start, segs[0].end, segs[0].text.as_str()), (0.0, 2.0, "Line one"));
    assert_eq!((segs[1].start, segs[1].end, segs[1].text.as_str()), (2.0, 4.0, "Line two"));
}

#[test]
fn split_without_newline_uses_word_midpoint_rounded_up() {
    let mut tr = Track::new(vec![Segment::new(0, 1.0, 2.0, "a b c d e")]).unwrap();
    tr.split(0, SplitAt::Auto).unwrap();
    assert_eq!(tr.segments()[0].text, "a b c");
    assert_eq!(tr.segments()[1].text, "d e");
    assert_eq!(tr.segments()[0].end, 1.5);
}

#[test]
fn split_at_byte_offset_and_reject_bad_offsets() {
    let mut tr = Track::new(vec![Segment::new(0, 0.0, 2.0, "héllo world")]).unwrap();
    assert!(tr.split(0, SplitAt::ByteOffset(2)).is_err());
    assert!(tr.split(0, SplitAt::ByteOffset(0)).is_err());
    assert_eq!(tr.len(), 1);
    tr.split(0, SplitAt::ByteOffset(6)).unwrap();
    assert_eq!(tr.segments()[0].text, "héllo");
    assert_eq!(tr.segments()[1].text, "world");
}

#[test]
fn split_partitions_word_timing() {
    let mut seg = Segment::new(0, 0.0, 4.0, "a b");
    seg.words = Some(vec![
        WordTiming {
            start: 0.0,
            end: 1.0,
            text: "a ".to_owned(),
        },
        WordTiming {
            start: 1.5,
            end: 4.0,
            text: "b".to_owned(),
        },
    ]);
    let mut tr = Track::new(vec![seg]).unwrap();
    tr.split(0, SplitAt::Auto).unwrap();
    assert_eq!(tr.segments()[0].words.as_ref().unwrap().len(), 1);
    let right = tr.segments()[1].words.as_ref().unwrap();
    assert_eq!(right[0].start, 2.0);
    assert_invariants(&tr);
}

#[test]
fn delete_refuses_last_segment() {
    let mut tr = Track::new(vec![Segment::new(0, 0.0, 1.0, "only")]).unwrap();
    let before = tr.clone();
    assert!(tr.delete(0).is_err());
    assert_eq!(tr, before);
}

#[test]
fn delete_removes_one_of_many() {
    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "a"),
        Segment::new(1, 1.0, 2.0, "b"),
    ])
    .unwrap();
    let removed = tr.delete(0).unwrap();
    assert_eq!(removed.text, "a");
    assert_eq!(tr.len(), 1);
    assert!(tr.delete(5).is_err());
}

#[test]
fn insert_fills_gaps_and_defaults() {
    let mut tr = Track::default();
    tr.insert(0).unwrap();
    assert_eq!((tr.segments()[0].start, tr.segments()[0].end), (0.0, 2.0));

    tr.insert(1).unwrap();
    assert_eq!((tr.segments()[1].start, tr.segments()[1].end), (2.0, 4.0));

    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "a"),
        Segment::new(1, 3.0, 4.0, "b"),
    ])
    .unwrap();
    let id = tr.insert(1).unwrap();
    let seg = &tr.segments()[1];
    assert_eq!(seg.id, id);
    assert_eq!((seg.start, seg.end), (1.0, 3.0));
    assert!(seg.text.is_empty());

    let mut tr = Track::new(vec![Segment::new(0, 5.0, 6.0, "a")]).unwrap();
    tr.insert(0).unwrap();
    assert_eq!((tr.segments()[0].start, tr.segments()[0].end), (3.0, 5.0));
}

#[test]
fn insert_without_room_is_rejected() {
    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "a"),
        Segment::new(1, 1.0, 2.0, "b"),
    ])
    .unwrap();
    let before = tr.clone();
    assert!(tr.insert(1).is_err());
    assert!(tr.insert(0).is_err());
    assert!(tr.insert(9).is_err());
    assert_eq!(tr, before);
}

#[test]
fn merge_joins_text_and_time() {
    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "Hello"),
        Segment::new(1, 1.5, 2.0, "world"),
    ])
    .unwrap();
    tr.merge_with_next(0).unwrap();
    assert_eq!(tr.len(), 1);
    let s = &tr.segments()[0];
    assert_eq!((s.start, s.end, s.text.as_str()), (0.0, 2.0, "Hello world"));
    assert!(tr.merge_with_next(0).is_err());
}

#[test]
fn set_times_rejects_overlap() {
    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 1.0, "a"),
        Segment::new(1, 2.0, 3.0, "b"),
    ])
    .unwrap();
    assert!(tr.set_times(0, 0.0, 2.5).is_err());
    tr.set_times(0, 0.5, 2.0).unwrap();
    tr.set_text(1, "changed").unwrap();
    assert_eq!(tr.segments()[1].text, "changed");
}

#[test]
fn random_edit_sequences_preserve_invariants() {
    let mut tr = Track::new(vec![
        Segment::new(0, 0.0, 2.0, "one two three"),
        Segment::new(1, 3.0, 6.0, "four\nfive"),
        Segment::new(2, 8.0, 9.0, "six"),
    ])
    .unwrap();

    let mut x: u64 = 0x9E37_79B9_7F4A_7C15;
    for _ in 0..400 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        let len = tr.len();
        let idx = (x >> 8) as usize % (len + 1);
        let _ = match x % 4 {
            0 => tr.split(idx.min(len - 1), SplitAt::Auto).map(|_| ()),
            1 => tr.insert(idx).map(|_| ()),
            2 => tr.delete(idx.min(len - 1)).map(|_| ()),
            _ => tr.merge_with_next(idx.min(len - 1)).map(|_| ()),
        };
        assert!(!tr.is_empty());
        assert_invariants(&tr);
    }
}
