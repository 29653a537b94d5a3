//! Character lattices.
//!
//! A lattice is a rectangular grid of styled glyph cells. It can be built from a
//! raster ([`convert`]) or from text ([`codec`]), and serialized back to text.

/// Styled-text and plain-text serialization.
pub mod codec;
/// Raster to lattice conversion.
pub mod convert;
/// Cells, lattices and partial cell updates.
pub mod model;
