//! Single brush applications on lattices and rasters.
//!
//! Lattice stamps cover a `(2r - 1)²` square of cells around the center.
//! Raster stamps cover a true circle of radius `r` pixels. Both skip
//! positions outside the target instead of clamping.

use image::RgbaImage;

use crate::{
    brush::settings::{BrushSettings, Tool},
    color::math::{parse_hex, to_hex},
    foundation::core::{Point, Rect},
    lattice::model::{CellUpdate, Lattice},
    raster::composite::{alpha_byte, blend_straight},
};

/// Map a pointer inside `bounds` (the rendered element) to a cell of a
/// `width`×`height` lattice. `None` when outside.
pub fn cell_at(pointer: Point, bounds: Rect, width: usize, height: usize) -> Option<(usize, usize)> {
    grid_at(pointer, bounds, width, height)
}

/// Map a pointer inside `bounds` to a pixel of a `width`×`height` raster.
pub fn pixel_at(pointer: Point, bounds: Rect, width: u32, height: u32) -> Option<(u32, u32)> {
    grid_at(pointer, bounds, width as usize, height as usize).map(|(x, y)| (x as u32, y as u32))
}

fn grid_at(pointer: Point, bounds: Rect, width: usize, height: usize) -> Option<(usize, usize)> {
    if width == 0 || height == 0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }

    let cell_w = bounds.width() / width as f64;
    let cell_h = bounds.height() / height as f64;
    let gx = ((pointer.x - bounds.x0) / cell_w).floor();
    let gy = ((pointer.y - bounds.y0) / cell_h).floor();

    if gx < 0.0 || gy < 0.0 || gx >= width as f64 || gy >= height as f64 {
        return None;
    }
    Some((gx as usize, gy as usize))
}

/// The cell patch a stroke tool writes, or `None` for non-stroke tools.
pub fn lattice_update(tool: Tool, brush: &BrushSettings) -> Option<CellUpdate> {
    match tool {
        Tool::Erase => Some(CellUpdate::erase()),
        Tool::PaintColor => Some(CellUpdate::colors(
            &brush.current_text_color,
            &brush.current_bg_color,
            brush.current_alpha,
        )),
        Tool::PaintAlpha => Some(CellUpdate::alpha(brush.current_alpha)),
        _ => None,
    }
}

/// Apply `update` to the square neighborhood of `(cx, cy)`. Returns the
/// number of cells touched.
pub fn stamp_lattice(
    lattice: &mut Lattice,
    cx: i64,
    cy: i64,
    radius: u32,
    update: &CellUpdate,
) -> usize {
    let reach = i64::from(radius.max(1)) - 1;
    let mut touched = 0;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (x, y) = (cx + dx, cy + dy);
            if !lattice.contains(x, y) {
                continue;
            }
            if let Some(cell) = lattice.get_mut(x as usize, y as usize) {
                update.apply(cell);
                touched += 1;
            }
        }
    }
    touched
}

/// Copy a cell's colors and alpha into the brush. False when out of bounds.
pub fn pick_cell(lattice: &Lattice, x: usize, y: usize, brush: &mut BrushSettings) -> bool {
    let Some(cell) = lattice.get(x, y) else {
        return false;
    };
    brush.current_text_color.clone_from(&cell.text_color);
    brush.current_bg_color.clone_from(&cell.bg_color);
    brush.set_alpha(cell.alpha);
    true
}

/// Apply a stroke tool to every pixel whose center lies within `radius` of
/// `center`. Returns the number of pixels touched.
///
/// `PaintColor` blends the brush text color at the brush alpha; an
/// unparseable brush color paints nothing.
pub fn stamp_raster(
    image: &mut RgbaImage,
    center: Point,
    radius: f64,
    tool: Tool,
    brush: &BrushSettings,
) -> usize {
    let paint = match tool {
        Tool::Erase => PixelOp::Clear,
        Tool::PaintColor => match parse_hex(&brush.current_text_color) {
            Ok(c) => PixelOp::Blend([
                c.r,
                c.g,
                c.b,
                (brush.current_alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ]),
            Err(err) => {
                tracing::trace!(%err, "raster paint skipped");
                return 0;
            }
        },
        Tool::PaintAlpha => PixelOp::SetAlpha(alpha_byte(brush.current_alpha)),
        _ => return 0,
    };

    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || radius <= 0.0 {
        return 0;
    }

    let x_lo = (center.x - radius).floor().max(0.0) as u32;
    let y_lo = (center.y - radius).floor().max(0.0) as u32;
    let x_hi = ((center.x + radius).ceil().max(0.0) as u32).min(w - 1);
    let y_hi = ((center.y + radius).ceil().max(0.0) as u32).min(h - 1);
    let r2 = radius * radius;
    let mut touched = 0;

    for py in y_lo..=y_hi {
        for px in x_lo..=x_hi {
            let dx = f64::from(px) + 0.5 - center.x;
            let dy = f64::from(py) + 0.5 - center.y;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let pixel = image.get_pixel_mut(px, py);
            paint.apply(&mut pixel.0);
            touched += 1;
        }
    }
    touched
}

#[derive(Clone, Copy, Debug)]
enum PixelOp {
    Clear,
    Blend([u8; 4]),
    SetAlpha(u8),
}

impl PixelOp {
    fn apply(self, px: &mut [u8; 4]) {
        match self {
            PixelOp::Clear => *px = [0, 0, 0, 0],
            PixelOp::Blend(src) => *px = blend_straight(*px, src),
            PixelOp::SetAlpha(a) => {
                if px[3] > 0 {
                    px[3] = a;
                }
            }
        }
    }
}

/// Copy a pixel's color and alpha into the brush. False when out of bounds.
pub fn pick_pixel(image: &RgbaImage, x: u32, y: u32, brush: &mut BrushSettings) -> bool {
    let Some(px) = image.get_pixel_checked(x, y) else {
        return false;
    };
    let [r, g, b, a] = px.0;
    brush.current_text_color = to_hex(f64::from(r), f64::from(g), f64::from(b));
    brush.set_alpha(f64::from(a) / 255.0);
    true
}

#[cfg(test)]
#[path = "../../tests/unit/brush/stamp.rs"]
mod tests;
