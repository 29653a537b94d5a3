use base64::Engine as _;
use image::{DynamicImage, ImageEncoder as _, RgbaImage};

use crate::foundation::error::{GlyphstackError, GlyphstackResult};

const PNG_PREFIX: &str = "data:image/png;base64,";

/// True for `data:image/...` URLs, the only raster form layers embed.
pub fn is_image_data_url(url: &str) -> bool {
    url.starts_with("data:image/")
}

/// Build a `data:<mime>;base64,` URL around raw bytes.
pub fn encode_bytes(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Payload bytes of a base64 data URL.
pub fn decode_bytes(url: &str) -> GlyphstackResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| GlyphstackError::image_decode("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| GlyphstackError::image_decode("data URL has no payload"))?;
    if !header.ends_with(";base64") {
        return Err(GlyphstackError::image_decode(format!(
            "unsupported data URL encoding \"{header}\""
        )));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| GlyphstackError::image_decode(format!("invalid base64 payload: {e}")))
}

/// Decode an image data URL into straight-alpha RGBA.
pub fn decode_rgba(url: &str) -> GlyphstackResult<RgbaImage> {
    decode_image(url).map(|img| img.to_rgba8())
}

/// Decode an image data URL.
pub fn decode_image(url: &str) -> GlyphstackResult<DynamicImage> {
    if !is_image_data_url(url) {
        return Err(GlyphstackError::image_decode(
            "expected a data:image/ URL",
        ));
    }
    let bytes = decode_bytes(url)?;
    image::load_from_memory(&bytes).map_err(|e| GlyphstackError::image_decode(e.to_string()))
}

/// Encode RGBA pixels as a PNG data URL.
pub fn encode_png(image: &RgbaImage) -> GlyphstackResult<String> {
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| GlyphstackError::image_decode(format!("png encoding failed: {e}")))?;

    let mut url = String::with_capacity(PNG_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(&png, &mut url);
    Ok(url)
}

/// MIME type for an image file extension; `None` for unsupported types.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/data_url.rs"]
mod tests;
