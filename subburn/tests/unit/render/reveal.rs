use super::*;
use crate::model::color::Color;

const SENTENCE: &str = "The quick brown fox jumps";

#[test]
fn word_reveal_starts_with_first_word_and_completes_at_half_second() {
    let early = DisplayMode::WordByWord.reveal(SENTENCE, 0.1);
    assert!(early.starts_with("The"));
    assert!(early.len() < SENTENCE.len());
    assert!(SENTENCE.starts_with(early));
    let next = SENTENCE[early.len()..].chars().next();
    assert_eq!(next, Some(' '));

    assert_eq!(DisplayMode::WordByWord.reveal(SENTENCE, 0.5), SENTENCE);
    assert_eq!(DisplayMode::WordByWord.reveal(SENTENCE, 2.9), SENTENCE);
}

#[test]
fn reveal_is_monotone_and_bounded() {
    for mode in [DisplayMode::WordByWord, DisplayMode::CharacterByCharacter] {
        let mut prev = 0;
        for i in 0..=120 {
            let e = i as f64 * 0.005;
            let shown = mode.reveal(SENTENCE, e);
            assert!(SENTENCE.starts_with(shown), "{mode:?} at {e}");
            assert!(shown.len() >= prev, "{mode:?} shrank at {e}");
            assert!(!shown.is_empty());
            if e >= REVEAL_DURATION_SECS {
                assert_eq!(shown, SENTENCE);
            }
            prev = shown.len();
        }
    }
}

#[test]
fn static_modes_show_everything_immediately() {
    assert_eq!(DisplayMode::LineByLine.reveal(SENTENCE, 0.0), SENTENCE);
    assert_eq!(DisplayMode::MultipleLines.reveal(SENTENCE, 0.0), SENTENCE);
    assert!(!DisplayMode::LineByLine.is_progressive());
}

#[test]
fn character_reveal_respects_utf8_boundaries() {
    let text = "héé";
    assert_eq!(DisplayMode::CharacterByCharacter.reveal(text, 0.0), "h");
    assert_eq!(DisplayMode::CharacterByCharacter.reveal(text, 0.3), "hé");
    assert_eq!(DisplayMode::CharacterByCharacter.reveal(text, 0.5), text);
}

#[test]
fn counts_and_step_offsets_agree() {
    assert_eq!(revealed_units(0, 1.0), 0);
    assert_eq!(revealed_units(4, -1.0), 1);
    assert_eq!(revealed_units(4, f64::NAN), 1);
    let steps = reveal_step_offsets(4);
    assert_eq!(steps, vec![0.125, 0.25, 0.375]);
    for (k, off) in steps.iter().enumerate() {
        assert_eq!(revealed_units(4, off + 1e-6), k + 2);
    }
}

#[test]
fn highlight_tracks_spoken_word_within_revealed_prefix() {
    let seg = Segment::new(0, 10.0, 14.0, "one two three four");
    let style = Style {
        display_mode: DisplayMode::WordByWord,
        highlight_color: Some(Color::rgb(255, 215, 0)),
        ..Style::default()
    };
    let ft = frame_text(&seg, &style, 1.5);
    assert_eq!(ft.text, seg.text);
    let r = ft.highlight.unwrap();
    assert_eq!(&ft.text[r], "two");

    let plain = Style {
        display_mode: DisplayMode::WordByWord,
        ..Style::default()
    };
    assert!(frame_text(&seg, &plain, 1.5).highlight.is_none());
}

#[test]
fn word_range_strips_whitespace() {
    assert_eq!(word_range("  a  bb ", 0), Some(2..3));
    assert_eq!(word_range("  a  bb ", 1), Some(5..7));
    assert_eq!(word_range("a", 3), None);
}
