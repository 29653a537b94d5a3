//! Layer model and the draft/commit layer store.

/// Serializable layer types.
pub mod model;
/// Canonical layer list, active draft and save gate.
pub mod store;
