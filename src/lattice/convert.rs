use anyhow::Context as _;
use image::{DynamicImage, GenericImageView as _, imageops::FilterType};
use rayon::prelude::*;

use crate::{
    color::math::{TRANSPARENT, perceptual_brightness, to_hex},
    foundation::error::{GlyphstackError, GlyphstackResult},
    lattice::model::{CharacterCell, Lattice},
};

/// Default lattice width in characters.
pub const DEFAULT_RESOLUTION: u32 = 100;

/// Height/width correction for monospace glyphs, which are about twice as tall as wide.
pub const DEFAULT_FONT_ASPECT: f64 = 0.55;

/// Pixels with normalized alpha below this become empty cells.
const ALPHA_CUTOFF: f64 = 0.1;

/// Glyph ramp ordered from light to dark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    /// Build a ramp; at least two glyphs are required.
    pub fn new(chars: impl Into<String>) -> GlyphstackResult<Self> {
        let chars: Vec<char> = chars.into().chars().collect();
        if chars.len() < 2 {
            return Err(GlyphstackError::validation(
                "glyph ramp must contain at least two characters",
            ));
        }
        Ok(Self { chars })
    }

    /// The five-level block ramp `' ', '░', '▒', '▓', '█'`.
    pub fn blocks() -> Self {
        Self {
            chars: vec![' ', '░', '▒', '▓', '█'],
        }
    }

    /// Glyphs, light to dark.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Glyph for a brightness in `[0, 255]`; darker input selects denser glyphs.
    pub fn glyph_for(&self, brightness: f64) -> char {
        let levels = self.chars.len() - 1;
        let step = ((brightness / 255.0).clamp(0.0, 1.0) * levels as f64).floor() as usize;
        self.chars[levels - step.min(levels)]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::blocks()
    }
}

/// Tunables for image to lattice conversion.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Target lattice width in characters.
    pub resolution: u32,
    /// Glyph height/width compensation applied to the row count.
    pub font_aspect: f64,
    /// Brightness ramp.
    pub ramp: GlyphRamp,
    /// Resampling filter; any fixed filter keeps output deterministic.
    pub filter: FilterType,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            font_aspect: DEFAULT_FONT_ASPECT,
            ramp: GlyphRamp::blocks(),
            filter: FilterType::Triangle,
        }
    }
}

impl ConvertOptions {
    /// Default options at the given resolution.
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }
}

/// Lattice dimensions derived from a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    /// Columns (the resolution).
    pub columns: u32,
    /// Rows, aspect-corrected.
    pub rows: u32,
}

/// Derive the lattice size for a `width`×`height` source.
///
/// `rows = floor(height / width * resolution * font_aspect)`, at least 1.
pub fn grid_geometry(
    width: u32,
    height: u32,
    resolution: u32,
    font_aspect: f64,
) -> GlyphstackResult<GridGeometry> {
    if width == 0 || height == 0 {
        return Err(GlyphstackError::validation(
            "source image must have non-zero dimensions",
        ));
    }
    if resolution == 0 {
        return Err(GlyphstackError::validation("resolution must be > 0"));
    }

    let ratio = f64::from(height) / f64::from(width);
    let rows = (ratio * f64::from(resolution) * font_aspect).floor();
    let rows = (rows as u32).max(1);

    Ok(GridGeometry {
        columns: resolution,
        rows,
    })
}

/// Raster to character-lattice converter.
#[derive(Clone, Debug, Default)]
pub struct LatticeConverter {
    options: ConvertOptions,
}

impl LatticeConverter {
    /// Converter with explicit options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Converter with default options at `resolution`.
    pub fn with_resolution(resolution: u32) -> Self {
        Self::new(ConvertOptions::with_resolution(resolution))
    }

    /// Options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Decode encoded image bytes and convert them.
    pub fn convert_bytes(&self, bytes: &[u8]) -> GlyphstackResult<Lattice> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| GlyphstackError::image_decode(e.to_string()))?;
        self.convert(&image)
    }

    /// Convert a decoded image. Same input and options always yield the same lattice.
    #[tracing::instrument(skip(self, image), fields(resolution = self.options.resolution))]
    pub fn convert(&self, image: &DynamicImage) -> GlyphstackResult<Lattice> {
        let (width, height) = image.dimensions();
        let geometry = grid_geometry(
            width,
            height,
            self.options.resolution,
            self.options.font_aspect,
        )?;

        let resized = image
            .resize_exact(geometry.columns, geometry.rows, self.options.filter)
            .to_rgba8();

        let columns = geometry.columns as usize;
        let raw = resized.as_raw();
        let ramp = &self.options.ramp;

        let cells: Vec<Vec<CharacterCell>> = raw
            .par_chunks_exact(columns * 4)
            .map(|row| {
                row.chunks_exact(4)
                    .map(|px| pixel_cell(ramp, px[0], px[1], px[2], px[3]))
                    .collect()
            })
            .collect();

        let lattice = Lattice::from_rows(cells)
            .context("resampled rows must all have the same width")?;
        tracing::debug!(
            width = lattice.width,
            height = lattice.height,
            "converted image to lattice"
        );
        Ok(lattice)
    }
}

fn pixel_cell(ramp: &GlyphRamp, r: u8, g: u8, b: u8, a: u8) -> CharacterCell {
    let alpha = f64::from(a) / 255.0;
    if alpha < ALPHA_CUTOFF {
        return CharacterCell::empty();
    }

    CharacterCell {
        ch: ramp.glyph_for(perceptual_brightness(r, g, b)),
        text_color: to_hex(f64::from(r), f64::from(g), f64::from(b)),
        bg_color: TRANSPARENT.to_owned(),
        alpha,
        class_name: None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lattice/convert.rs"]
mod tests;
