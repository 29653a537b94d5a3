//! Project persistence and editor settings.
//!
//! [`state::ProjectState`] is the JSON document exchanged with storage;
//! [`state::Project`] owns a layer store and the page settings that travel with it.

pub mod settings;
pub mod state;
