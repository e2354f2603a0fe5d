use super::*;

const PROBE: &str = r#"{
  "streams": [
    {"index": 0, "codec_type": "video", "width": 1280, "height": 720, "duration": "9.90"},
    {"index": 1, "codec_type": "audio"}
  ],
  "format": {"duration": "10.010000"}
}"#;

#[test]
fn probe_json_yields_size_duration_and_audio() {
    let info = parse_probe(Path::new("clip.mp4"), PROBE.as_bytes()).unwrap();
    assert_eq!(info.canvas(), Canvas::new(1280, 720));
    assert!((info.duration - 10.01).abs() < 1e-9);
    assert!(info.has_audio);
}

#[test]
fn stream_duration_is_used_when_format_lacks_one() {
    let json = r#"{"streams":[{"codec_type":"video","width":2,"height":2,"duration":"1.5"}]}"#;
    let info = parse_probe(Path::new("a.webm"), json.as_bytes()).unwrap();
    assert_eq!(info.duration, 1.5);
    assert!(!info.has_audio);
}

#[test]
fn audio_only_or_zero_length_sources_are_rejected() {
    let audio_only = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"3"}}"#;
    assert!(matches!(
        parse_probe(Path::new("a.mp4"), audio_only.as_bytes()),
        Err(SubburnError::Validation(_))
    ));
    let zero = r#"{"streams":[{"codec_type":"video","width":2,"height":2}],"format":{"duration":"0"}}"#;
    assert!(parse_probe(Path::new("a.mp4"), zero.as_bytes()).is_err());
    assert!(parse_probe(Path::new("a.mp4"), b"garbage").is_err());
}
