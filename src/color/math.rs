use crate::foundation::error::{GlyphstackError, GlyphstackResult};

/// Sentinel background color meaning "no background".
pub const TRANSPARENT: &str = "transparent";

/// Default glyph color of an unstyled cell.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Channel sum below which a color counts as near-black for tinting.
const NEAR_BLACK_SUM: u32 = 30;

/// Straight (non-premultiplied) 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build from channels.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn channel_sum(self) -> u32 {
        u32::from(self.r) + u32::from(self.g) + u32::from(self.b)
    }

    /// Encode as `#rrggbb`.
    pub fn to_hex(self) -> String {
        to_hex(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }
}

/// Parse a `#rrggbb` (or bare `rrggbb`) color.
pub fn parse_hex(color: &str) -> GlyphstackResult<Rgb> {
    let s = color.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GlyphstackError::invalid_color(format!(
            "expected a 6-digit hex color, got \"{color}\""
        )));
    }

    let byte = |i: usize| {
        u8::from_str_radix(&s[i..i + 2], 16)
            .map_err(|_| GlyphstackError::invalid_color(format!("invalid hex byte in \"{color}\"")))
    };

    Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
}

/// Encode channels as `#rrggbb`; each channel is clamped to `[0, 255]` and rounded.
pub fn to_hex(r: f64, g: f64, b: f64) -> String {
    fn channel(x: f64) -> u8 {
        x.clamp(0.0, 255.0).round() as u8
    }

    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Tint `original` with `tint` using a multiply blend.
///
/// Near-black originals (channel sum < 30) take the tint color verbatim, since
/// multiplying black always yields black. Unparseable input returns `original`
/// unchanged; this function never fails.
pub fn apply_tint(original: &str, tint: &str) -> String {
    let base = match parse_hex(original) {
        Ok(c) => c,
        Err(err) => {
            tracing::trace!(%err, "tint skipped");
            return original.to_owned();
        }
    };

    if base.channel_sum() < NEAR_BLACK_SUM {
        return tint.to_owned();
    }

    let Ok(t) = parse_hex(tint) else {
        return original.to_owned();
    };

    let mul = |a: u8, b: u8| f64::from(a) * f64::from(b) / 255.0;
    to_hex(mul(base.r, t.r), mul(base.g, t.g), mul(base.b, t.b))
}

/// ITU-R BT.601 luma of an sRGB triple, in `[0, 255]`.
pub fn perceptual_brightness(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// True for colors that parse as pure white.
pub fn is_white(color: &str) -> bool {
    parse_hex(color).is_ok_and(|c| c == Rgb::new(255, 255, 255))
}

/// Parse a CSS color declaration value into `(#rrggbb, alpha)`.
///
/// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`. Named colors
/// and other functional notations return `None`.
pub fn parse_css_color(value: &str) -> Option<(String, f64)> {
    let v = value.trim();

    if let Some(hex) = v.strip_prefix('#') {
        return match hex.len() {
            3 if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                parse_hex(&expanded).ok().map(|c| (c.to_hex(), 1.0))
            }
            6 => parse_hex(hex).ok().map(|c| (c.to_hex(), 1.0)),
            _ => None,
        };
    }

    let lower = v.to_ascii_lowercase();
    let (args, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<f64> = args
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match (parts.as_slice(), has_alpha) {
        ([r, g, b], false) => Some((to_hex(*r, *g, *b), 1.0)),
        ([r, g, b, a], true) => Some((to_hex(*r, *g, *b), a.clamp(0.0, 1.0))),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/math.rs"]
mod tests;
