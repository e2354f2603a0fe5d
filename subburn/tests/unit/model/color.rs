use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
    assert_eq!(Color::parse("#FFD700").unwrap(), Color::rgb(255, 215, 0));
    assert_eq!(
        Color::parse("#00000080").unwrap(),
        Color::rgba(0, 0, 0, 0x80)
    );
    assert!(Color::parse("#12345").is_err());
    assert!(Color::parse("#zzzzzz").is_err());
}

#[test]
fn parses_functional_and_named() {
    assert_eq!(
        Color::parse("rgba(255, 0, 0, 0.5)").unwrap(),
        Color::rgba(255, 0, 0, 128)
    );
    assert_eq!(Color::parse("rgb(1,2,3)").unwrap(), Color::rgb(1, 2, 3));
    assert_eq!(Color::parse("transparent").unwrap().a, 0);
    assert_eq!(Color::parse("White").unwrap(), Color::WHITE);
    assert!(Color::parse("chartreuse-ish").is_err());
}

#[test]
fn serde_accepts_strings_and_objects() {
    let c: Color = serde_json::from_str("\"#102030\"").unwrap();
    assert_eq!(c, Color::rgb(0x10, 0x20, 0x30));
    let c: Color = serde_json::from_str(r#"{"r":1,"g":2,"b":3,"a":0.0}"#).unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 0));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#01020300\"");
}

#[test]
fn opacity_scales_alpha() {
    assert_eq!(Color::BLACK.with_opacity(0.5).a, 128);
    assert_eq!(Color::BLACK.with_opacity(2.0).a, 255);
}
