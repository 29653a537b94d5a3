//! Glyphstack composes layered ASCII art.
//!
//! A project is a stack of layers: character lattices converted from images
//! or typed as text, raw images, and embedded HTML. Layers are edited through
//! a single draft that is committed back into the stack, and the stack exports
//! to one self-contained HTML page with optional cursor parallax.
//!
//! - Convert a raster with [`LatticeConverter`]
//! - Edit layers through [`LayerStore`] and [`BrushSession`]
//! - Persist with [`ProjectState`] and export with [`generate_export`]
#![forbid(unsafe_code)]

pub mod brush;
pub mod color;
pub mod export;
pub mod foundation;
pub mod lattice;
pub mod layers;
pub mod project;
pub mod raster;

pub use crate::foundation::core::{Anchor, LayerId, Point, Rect, Vec2};
pub use crate::foundation::error::{GlyphstackError, GlyphstackResult};

pub use crate::brush::session::{BrushSession, PointerEvent, ScaleHandle};
pub use crate::brush::settings::{BrushSettings, Tool, ToolConfig};
pub use crate::export::html::{CanvasResolution, ExportConfig, generate_export};
pub use crate::lattice::codec::{parse as parse_lattice, to_plain_text, to_styled_text};
pub use crate::lattice::convert::{ConvertOptions, GlyphRamp, LatticeConverter};
pub use crate::lattice::model::{CellUpdate, CharacterCell, Lattice};
pub use crate::layers::model::{
    AsciiLayer, HtmlExtent, HtmlLayer, ImageLayer, Layer, LayerCommon, LayerKind, Overflow,
};
pub use crate::layers::store::{
    ActivateOutcome, DeleteOutcome, DraftState, LayerStore, SavePreference,
};
pub use crate::project::settings::EditorSettings;
pub use crate::project::state::{HydrateOutcome, Project, ProjectState};
