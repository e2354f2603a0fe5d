use super::*;
use crate::model::style::FontWeight;

#[test]
fn font_spec_scales_with_surface() {
    let style = Style {
        font_size: 24.0,
        letter_spacing: 2.0,
        font_weight: FontWeight(600),
        ..Style::default()
    };
    let spec = FontSpec::from_style(&style, 2.0);
    assert_eq!(spec.size_px, 48.0);
    assert_eq!(spec.letter_spacing_px, 4.0);
    assert_eq!(spec.weight, 600.0);
    assert_eq!(spec.stack, "\"Inter\", sans-serif");
}

#[test]
fn measurement_is_monotone_in_text_length() {
    let mut engine = TextLayoutEngine::new();
    let spec = FontSpec::from_style(&Style::default(), 1.0);
    assert_eq!(engine.measure("", &spec), 0.0);
    let short = engine.measure("Hi", &spec);
    let long = engine.measure("Hi there, friend", &spec);
    // With no system fonts installed both widths are zero.
    assert!(long >= short);
}

#[test]
fn missing_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    assert!(engine.register_font_bytes(b"not a font".to_vec()).is_err());
    assert!(
        engine
            .register_font_file(Path::new("/definitely/not/here.ttf"))
            .is_err()
    );
}

fn find_font(dir: &Path, depth: u32) -> Option<std::path::PathBuf> {
    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() && depth > 0 {
            if let Some(found) = find_font(&path, depth - 1) {
                return Some(found);
            }
        } else if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
        {
            return Some(path);
        }
    }
    None
}

#[test]
fn registering_a_font_file_reports_its_families() {
    let Some(font) = find_font(Path::new("/usr/share/fonts"), 4) else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let names = engine.register_font_file(&font).unwrap();
    assert!(!names.is_empty(), "{}", font.display());
    assert!(names.iter().all(|n| !n.trim().is_empty()));
}
