use super::*;

#[test]
fn from_straight_rgba_premultiplies_and_checks_length() {
    let f = FrameRGBA::from_straight_rgba(2, 1, vec![200, 100, 50, 255, 200, 100, 50, 128]).unwrap();
    assert_eq!(&f.data[..4], &[200, 100, 50, 255]);
    assert_eq!(&f.data[4..], &[100, 50, 25, 128]);
    assert!(f.premultiplied);

    assert!(FrameRGBA::from_straight_rgba(2, 2, vec![0; 4]).is_err());
}

#[test]
fn composite_over_blends_overlay() {
    let mut f = FrameRGBA::from_straight_rgba(1, 1, vec![0, 0, 255, 255]).unwrap();
    f.composite_over(&[128, 0, 0, 128]).unwrap();
    assert_eq!(f.data, vec![128, 0, 127, 255]);
    assert!(f.composite_over(&[0; 8]).is_err());
}

#[test]
fn flatten_and_unpremultiply() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![100, 50, 25, 128],
        premultiplied: true,
    };
    assert_eq!(f.flattened([0, 0, 0]), vec![100, 50, 25, 255]);
    assert_eq!(f.to_straight_rgba(), vec![199, 100, 50, 128]);

    let empty = FrameRGBA::transparent(3, 2);
    assert_eq!(empty.data.len(), 24);
    assert!(empty.canvas().width == 3 && empty.canvas().height == 2);
}
