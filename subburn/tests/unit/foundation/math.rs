use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 200), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn over_transparent_src_keeps_dst() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_opaque_src_replaces_dst() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[1, 2, 3, 255]);
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[0, 0, 0, 0], [10, 20, 30]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}
