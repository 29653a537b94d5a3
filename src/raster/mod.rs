//! Raster helpers shared by image layers and brushes.

/// Straight and premultiplied RGBA8 blending.
pub mod composite;
/// `data:` URL encoding and decoding.
pub mod data_url;
