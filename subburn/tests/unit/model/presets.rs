use super::*;

#[test]
fn registry_contains_all_presets_and_they_validate() {
    let ids: Vec<&str> = presets().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec!["classic-dark", "dynamic-karaoke", "hormozi-word", "modern-bold"]
    );
    for p in presets() {
        p.style.validate().unwrap();
    }
}

#[test]
fn apply_returns_an_independent_copy() {
    let p = preset("classic-dark").unwrap();
    let mut style = p.apply();
    style.font_size = 99.0;
    assert_eq!(preset("classic-dark").unwrap().style.font_size, 24.0);
    assert_eq!(style.display_mode, DisplayMode::LineByLine);
}

#[test]
fn word_presets_switch_display_mode() {
    let style = preset("hormozi-word").unwrap().apply();
    assert_eq!(style.display_mode, DisplayMode::WordByWord);
    assert_eq!(style.highlight_scale, Some(1.2));
    let style = preset("dynamic-karaoke").unwrap().apply();
    assert_eq!(style.display_mode, DisplayMode::WordByWord);
    assert!(preset("missing").is_none());
}
