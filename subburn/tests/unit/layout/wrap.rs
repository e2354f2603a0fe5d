use super::*;

/// Monospace stand-in: every char is 10 px wide.
fn mono() -> impl FnMut(&str) -> f64 {
    |s: &str| s.chars().count() as f64 * 10.0
}

#[test]
fn greedy_fill_until_overflow() {
    let lines = wrap("aaa bbb ccc ddd", 70.0, 10, &mut mono());
    assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
}

#[test]
fn long_word_gets_its_own_line() {
    let lines = wrap("a supercalifragilistic b", 50.0, 10, &mut mono());
    assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
}

#[test]
fn truncates_at_max_lines() {
    let lines = wrap("aa bb cc dd ee", 20.0, 2, &mut mono());
    assert_eq!(lines, vec!["aa", "bb"]);
    let lines = wrap("aa bb", 20.0, 0, &mut mono());
    assert_eq!(lines, vec!["aa"]);
}

#[test]
fn honors_explicit_newlines() {
    let lines = wrap("one\ntwo three", 1000.0, 5, &mut mono());
    assert_eq!(lines, vec!["one", "two three"]);
}

#[test]
fn blank_input_yields_no_lines_and_text_yields_at_least_one() {
    assert!(wrap("   ", 100.0, 2, &mut mono()).is_empty());
    assert_eq!(wrap("x", 0.0, 2, &mut mono()), vec!["x"]);
}

#[test]
fn wrapping_wrapped_output_is_a_fixed_point() {
    let texts = [
        "The quick brown fox jumps over the lazy dog",
        "short",
        "a bb ccc dddd eeeee ffffff ggggggg hhhhhhhh",
        "averyveryverylongword and then some more words here",
    ];
    for text in texts {
        for width in [30.0, 55.0, 80.0, 200.0] {
            for max_lines in [1, 2, 3, 8] {
                let once = wrap(text, width, max_lines, &mut mono());
                let by_newline = wrap(&once.join("\n"), width, max_lines, &mut mono());
                let by_space = wrap(&once.join(" "), width, max_lines, &mut mono());
                assert_eq!(once, by_newline, "{text} @ {width}/{max_lines}");
                assert_eq!(once, by_space, "{text} @ {width}/{max_lines}");
            }
        }
    }
}

#[test]
fn hard_lines_drops_blank_lines() {
    assert_eq!(hard_lines("a\n\n b \n"), vec!["a", "b"]);
}
