use super::*;

#[test]
fn over_transparent_src_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_half_src_keeps_half_of_dst() {
    // Premultiplied red at alpha 128 over opaque blue.
    assert_eq!(over([0, 0, 255, 255], [128, 0, 0, 128]), [128, 0, 127, 255]);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    assert_eq!(premultiply([9, 9, 9, 0]), [0, 0, 0, 0]);
    assert_eq!(unpremultiply([0, 0, 0, 0]), [0, 0, 0, 0]);
}

#[test]
fn opaque_pixels_survive_premultiply_round_trip() {
    let px = [12, 200, 77, 255];
    assert_eq!(unpremultiply(premultiply(px)), px);
}

#[test]
fn half_alpha_paint_over_transparent_keeps_color() {
    let out = blend_straight([0, 0, 0, 0], [255, 0, 0, 128]);
    assert_eq!(out, [255, 0, 0, 128]);
}

#[test]
fn half_alpha_paint_over_opaque_mixes() {
    let out = blend_straight([0, 0, 255, 255], [255, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert!((i32::from(out[0]) - 128).abs() <= 1);
    assert!((i32::from(out[2]) - 127).abs() <= 1);
}

#[test]
fn alpha_byte_truncates() {
    assert_eq!(alpha_byte(1.0), 255);
    assert_eq!(alpha_byte(0.5), 127);
    assert_eq!(alpha_byte(-1.0), 0);
}
