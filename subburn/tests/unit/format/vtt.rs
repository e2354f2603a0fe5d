use super::*;

#[test]
fn generates_header_and_period_separator() {
    let out = to_vtt(&[Segment::new(0, 65.5, 67.25, "Hi")]);
    assert_eq!(out, "WEBVTT\n\n1\n00:01:05.500 --> 00:01:07.250\nHi\n\n");
}

#[test]
fn round_trips_through_parser() {
    let segs = vec![
        Segment::new(0, 0.0, 1.5, "first"),
        Segment::new(1, 2.001, 35999.999, "last\nline"),
    ];
    assert_eq!(parse_vtt(&to_vtt(&segs)).unwrap(), segs);
}

#[test]
fn requires_header_and_skips_notes_and_settings() {
    assert!(parse_vtt("00:00.000 --> 00:01.000\nx\n").is_err());
    let input = "WEBVTT - title\n\nNOTE a comment\n\nintro\n00:01.000 --> 00:02.000 align:start position:10%\nHello\n";
    let segs = parse_vtt(input).unwrap();
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].start, 1.0);
    assert_eq!(segs[0].text, "Hello");
}
