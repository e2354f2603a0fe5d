use super::*;

fn sample() -> Vec<Segment> {
    vec![
        Segment::new(0, 65.5, 67.25, "Hi"),
        Segment::new(1, 67.25, 70.0, "Two\nlines"),
    ]
}

#[test]
fn generates_numbered_blocks() {
    let out = to_srt(&sample());
    assert_eq!(
        out,
        "1\n00:01:05,500 --> 00:01:07,250\nHi\n\n2\n00:01:07,250 --> 00:01:10,000\nTwo\nlines\n\n"
    );
}

#[test]
fn skips_empty_segments_and_keeps_numbering_contiguous() {
    let segs = vec![
        Segment::new(0, 0.0, 1.0, "a"),
        Segment::new(1, 1.0, 2.0, "   "),
        Segment::new(2, 2.0, 3.0, "c"),
    ];
    let out = to_srt(&segs);
    assert!(out.contains("\n\n2\n00:00:02,000"));
    assert!(!out.contains("\n3\n"));
}

#[test]
fn round_trips_millisecond_times() {
    let mut segs = Vec::new();
    let mut x: u64 = 0xD1B5_4A32_D192_ED03;
    let mut t_ms = 0u64;
    for i in 0..200 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        let start = t_ms + x % 5000;
        let end = start + 1 + (x >> 20) % 9000;
        segs.push(Segment::new(
            i,
            start as f64 / 1000.0,
            end as f64 / 1000.0,
            format!("line {i}"),
        ));
        t_ms = end;
    }
    assert!(t_ms <= 35_999_999);
    assert_eq!(parse_srt(&to_srt(&segs)).unwrap(), segs);
}

#[test]
fn cue_text_is_normalized_on_write() {
    let segs = vec![Segment::new(0, 0.0, 1.0, "first  \n\n  second\t")];
    let back = parse_srt(&to_srt(&segs)).unwrap();
    assert_eq!(back[0].text, "first\n  second");
}

#[test]
fn parses_crlf_bom_and_missing_indices() {
    let input = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,500\r\nHello\r\n\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";
    let segs = parse_srt(input).unwrap();
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].start, 1.0);
    assert_eq!(segs[0].end, 2.5);
    assert_eq!(segs[1].text, "World");
    assert_eq!(segs[1].id.0, 1);
}

#[test]
fn rejects_bad_timing() {
    assert!(parse_srt("1\n00:00:05,000 --> 00:00:01,000\nbackwards\n").is_err());
    assert!(parse_srt("1\n00:00:xx,000 --> 00:00:01,000\nbroken\n").is_err());
}
