use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    export::html::{CanvasResolution, DEFAULT_CUSTOM_CSS, ExportConfig, generate_export},
    foundation::error::{GlyphstackError, GlyphstackResult},
    layers::{model::Layer, store::LayerStore},
};

/// Format version written by [`Project::serialize`].
pub const PROJECT_VERSION: &str = "1.0.0";

/// Default project name.
pub const UNTITLED: &str = "Untitled Project";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Persisted form of a project.
///
/// This is the whole contract with storage backends: whatever writes it must
/// hand the same value back to [`Project::hydrate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub version: String,
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub canvas_resolution: CanvasResolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_background_color: Option<String>,
    #[serde(rename = "customCSS", default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallax_enabled: Option<bool>,
    pub metadata: ProjectMetadata,
}

impl ProjectState {
    /// Parse and validate a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GlyphstackResult<Self> {
        let state: ProjectState = serde_json::from_reader(r)
            .map_err(|e| GlyphstackError::malformed_project(format!("parse project JSON: {e}")))?;
        state.validate()?;
        Ok(state)
    }

    pub fn from_json(s: &str) -> GlyphstackResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse and validate a project file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GlyphstackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GlyphstackError::malformed_project(format!("open project '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Structural checks serde cannot express: a version and unique layer ids.
    pub fn validate(&self) -> GlyphstackResult<()> {
        if self.version.trim().is_empty() {
            return Err(GlyphstackError::malformed_project("missing version"));
        }
        let mut seen = HashSet::with_capacity(self.layers.len());
        for layer in &self.layers {
            if !seen.insert(layer.id()) {
                return Err(GlyphstackError::malformed_project(format!(
                    "duplicate layer id {}",
                    layer.id()
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> GlyphstackResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GlyphstackError::serde(e.to_string()))
    }

    /// Write pretty JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> GlyphstackResult<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| {
            GlyphstackError::Other(anyhow::anyhow!("write project '{}': {e}", path.display()))
        })
    }
}

/// Result of [`Project::hydrate_checked`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrateOutcome {
    Loaded,
    /// The active draft has unsaved edits; nothing was loaded.
    ConfirmationRequired,
}

/// A layer store plus the page-level settings that travel with it.
#[derive(Clone, Debug)]
pub struct Project {
    pub store: LayerStore,
    pub name: Option<String>,
    pub resolution: CanvasResolution,
    pub background_color: Option<String>,
    pub custom_css: Option<String>,
    pub parallax_enabled: bool,
    created_at: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(LayerStore::new())
    }
}

impl Project {
    pub fn new(store: LayerStore) -> Self {
        Self {
            store,
            name: Some(UNTITLED.to_owned()),
            resolution: CanvasResolution::default(),
            background_color: None,
            custom_css: Some(DEFAULT_CUSTOM_CSS.to_owned()),
            parallax_enabled: false,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Snapshot of the canonical stack. Uncommitted draft edits are not included.
    pub fn serialize(&self) -> ProjectState {
        ProjectState {
            version: PROJECT_VERSION.to_owned(),
            layers: self.store.layers().to_vec(),
            canvas_resolution: self.resolution,
            canvas_background_color: self.background_color.clone(),
            custom_css: self.custom_css.clone(),
            parallax_enabled: Some(self.parallax_enabled),
            metadata: ProjectMetadata {
                created_at: self.created_at,
                modified_at: Utc::now(),
                name: self.name.clone(),
            },
        }
    }

    /// Replace the whole project with `state`.
    ///
    /// The layer counter restarts at `max(id) + 1` and no layer is active
    /// afterwards. On error nothing changes.
    #[tracing::instrument(skip_all, fields(layers = state.layers.len()))]
    pub fn hydrate(&mut self, state: ProjectState) -> GlyphstackResult<()> {
        state.validate()?;
        self.store.load_layers(state.layers)?;

        self.resolution = state.canvas_resolution;
        self.background_color = state.canvas_background_color;
        if state.custom_css.is_some() {
            self.custom_css = state.custom_css;
        }
        self.parallax_enabled = state.parallax_enabled.unwrap_or(false);
        self.name = state.metadata.name;
        self.created_at = state.metadata.created_at;
        tracing::debug!(next_id = self.store.next_id(), "project hydrated");
        Ok(())
    }

    /// [`hydrate`](Self::hydrate) that refuses to drop unsaved draft edits unless `confirmed`.
    pub fn hydrate_checked(
        &mut self,
        state: ProjectState,
        confirmed: bool,
    ) -> GlyphstackResult<HydrateOutcome> {
        if self.store.is_dirty() && !confirmed {
            return Ok(HydrateOutcome::ConfirmationRequired);
        }
        self.hydrate(state)?;
        Ok(HydrateOutcome::Loaded)
    }

    pub fn export_config(&self, include_generator_link: bool) -> ExportConfig {
        ExportConfig {
            resolution: self.resolution,
            background_color: self
                .background_color
                .clone()
                .unwrap_or_else(|| ExportConfig::default().background_color),
            parallax_enabled: self.parallax_enabled,
            include_generator_link,
            custom_css: self.custom_css.clone(),
        }
    }

    /// Commit any pending draft edits, then export the canonical stack.
    pub fn export_html(&mut self, include_generator_link: bool) -> GlyphstackResult<String> {
        if self.store.is_dirty() {
            self.store.commit();
        }
        generate_export(self.store.layers(), &self.export_config(include_generator_link))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/state.rs"]
mod tests;
