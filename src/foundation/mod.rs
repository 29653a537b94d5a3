//! Shared geometry re-exports, identifiers and the crate error type.

/// Geometry aliases, layer ids and anchors.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
