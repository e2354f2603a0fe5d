use super::*;

#[test]
fn tokens_keep_trailing_whitespace_with_preceding_word() {
    assert_eq!(tokens("The quick  brown"), vec!["The ", "quick  ", "brown"]);
    assert_eq!(tokens("  lead trail "), vec!["  lead ", "trail "]);
    assert_eq!(tokens("one\ntwo"), vec!["one\n", "two"]);
    assert!(tokens("   ").is_empty());
    assert!(tokens("").is_empty());
}

#[test]
fn synthesized_timing_divides_duration_evenly() {
    let seg = Segment::new(0, 1.0, 4.0, "a b c");
    let words = seg.word_timings();
    assert_eq!(words.len(), 3);
    assert_eq!(words[0].start, 1.0);
    assert_eq!(words[0].end, 2.0);
    assert_eq!(words[1].text, "b ");
    assert_eq!(words[2].end, 4.0);
    let joined: String = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(joined, "a b c");
}

#[test]
fn explicit_word_timing_wins() {
    let mut seg = Segment::new(0, 0.0, 2.0, "hi there");
    seg.words = Some(vec![
        WordTiming {
            start: 0.0,
            end: 0.2,
            text: "hi ".to_owned(),
        },
        WordTiming {
            start: 0.2,
            end: 2.0,
            text: "there".to_owned(),
        },
    ]);
    seg.validate().unwrap();
    assert_eq!(seg.active_word_at(1.0), Some(1));
    assert_eq!(seg.word_timings()[0].end, 0.2);
}

#[test]
fn validate_rejects_bad_times() {
    assert!(Segment::new(0, 2.0, 2.0, "x").validate().is_err());
    assert!(Segment::new(0, -1.0, 2.0, "x").validate().is_err());
    assert!(Segment::new(0, 0.0, f64::INFINITY, "x").validate().is_err());

    let mut seg = Segment::new(0, 0.0, 1.0, "x");
    seg.words = Some(vec![WordTiming {
        start: 0.5,
        end: 1.5,
        text: "x".to_owned(),
    }]);
    assert!(seg.validate().is_err());
}

#[test]
fn serde_omits_absent_words() {
    let seg = Segment::new(7, 0.5, 1.5, "hey");
    let json = serde_json::to_string(&seg).unwrap();
    assert_eq!(json, r#"{"id":7,"start":0.5,"end":1.5,"text":"hey"}"#);
}
