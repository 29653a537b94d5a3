//! Hex color parsing, tinting and brightness.

pub mod math;
