//! Standalone HTML export of a layer stack.

/// Document assembly and per-layer markup.
pub mod html;
/// Anchor placement math shared by every layer kind.
pub mod position;
