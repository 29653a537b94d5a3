//! 8-bit RGBA pixel math for raster brushes.
//!
//! Layer rasters are stored straight (non-premultiplied) because that is what
//! PNG carries; blending happens in premultiplied space and is converted back.

pub type Rgba8 = [u8; 4];
pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over: `src + dst * (1 - src.a)` per channel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = u16::from(255 - sa);
            std::array::from_fn(|i| src[i].saturating_add(mul_div255(u16::from(dst[i]), inv)))
        }
    }
}

pub fn premultiply(px: Rgba8) -> PremulRgba8 {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

pub fn unpremultiply(px: PremulRgba8) -> Rgba8 {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let ch = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [ch(px[0]), ch(px[1]), ch(px[2]), px[3]]
}

/// Blend a straight-alpha `src` over a straight-alpha `dst`.
pub fn blend_straight(dst: Rgba8, src: Rgba8) -> Rgba8 {
    unpremultiply(over(premultiply(dst), premultiply(src)))
}

/// Alpha byte for a unit-interval alpha, truncating like a canvas `floor(a * 255)`.
pub fn alpha_byte(alpha: f64) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).floor() as u8
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
