use std::io::Cursor;

use image::{Rgba, RgbaImage};

use super::*;

fn solid(width: u32, height: u32, px: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(px)))
}

fn nearest(resolution: u32) -> LatticeConverter {
    LatticeConverter::new(ConvertOptions {
        resolution,
        filter: FilterType::Nearest,
        ..ConvertOptions::default()
    })
}

#[test]
fn geometry_compensates_for_glyph_aspect() {
    let g = grid_geometry(200, 100, 100, DEFAULT_FONT_ASPECT).unwrap();
    assert_eq!(g, GridGeometry { columns: 100, rows: 27 });

    let square = grid_geometry(64, 64, 100, DEFAULT_FONT_ASPECT).unwrap();
    assert_eq!(square.rows, 55);
}

#[test]
fn geometry_rejects_degenerate_input_and_keeps_one_row() {
    assert!(grid_geometry(0, 10, 100, DEFAULT_FONT_ASPECT).is_err());
    assert!(grid_geometry(10, 10, 0, DEFAULT_FONT_ASPECT).is_err());
    let wide = grid_geometry(10_000, 1, 100, DEFAULT_FONT_ASPECT).unwrap();
    assert_eq!(wide.rows, 1);
}

#[test]
fn ramp_maps_dark_to_dense() {
    let ramp = GlyphRamp::blocks();
    assert_eq!(ramp.glyph_for(0.0), '█');
    assert_eq!(ramp.glyph_for(255.0), ' ');
    assert_eq!(ramp.glyph_for(64.0), '▓');
    assert_eq!(ramp.glyph_for(128.0), '▒');
    assert_eq!(ramp.glyph_for(200.0), '░');
    assert!(GlyphRamp::new("x").is_err());
}

#[test]
fn opaque_black_becomes_full_block() {
    let lattice = nearest(4).convert(&solid(8, 8, [0, 0, 0, 255])).unwrap();
    assert_eq!((lattice.width, lattice.height), (4, 2));
    for cell in lattice.cells.iter().flatten() {
        assert_eq!(cell.ch, '█');
        assert_eq!(cell.text_color, "#000000");
        assert_eq!(cell.bg_color, "transparent");
        assert_eq!(cell.alpha, 1.0);
    }
}

#[test]
fn opaque_white_becomes_visible_space() {
    let lattice = nearest(4).convert(&solid(8, 8, [255, 255, 255, 255])).unwrap();
    let cell = &lattice.cells[0][0];
    assert_eq!(cell.ch, ' ');
    assert_eq!(cell.text_color, "#ffffff");
    assert_eq!(cell.alpha, 1.0);
}

#[test]
fn transparent_pixels_become_empty_cells() {
    let lattice = nearest(4).convert(&solid(8, 8, [200, 10, 10, 20])).unwrap();
    assert!(
        lattice
            .cells
            .iter()
            .flatten()
            .all(|c| *c == CharacterCell::empty())
    );
}

#[test]
fn conversion_is_idempotent() {
    let mut img = RgbaImage::new(37, 23);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgba([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8, 255]);
    }
    let img = DynamicImage::ImageRgba8(img);

    let converter = LatticeConverter::with_resolution(20);
    let a = converter.convert(&img).unwrap();
    let b = converter.convert(&img).unwrap();
    assert_eq!(a, b);
    assert!(a.is_consistent());
    assert_eq!(a.width, 20);
}

#[test]
fn convert_bytes_reports_decode_failures() {
    let err = LatticeConverter::default()
        .convert_bytes(b"definitely not a png")
        .unwrap_err();
    assert!(matches!(err, GlyphstackError::ImageDecode(_)));

    let mut buf = Vec::new();
    solid(4, 4, [0, 0, 0, 255])
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let lattice = LatticeConverter::with_resolution(2).convert_bytes(&buf).unwrap();
    assert_eq!((lattice.width, lattice.height), (2, 1));
}
