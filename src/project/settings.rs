use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{GlyphstackError, GlyphstackResult},
    layers::store::SavePreference,
};

/// Persistent editor preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// What to do with unsaved draft edits when switching layers.
    pub auto_save_on_layer_change: SavePreference,
    /// Add the generator badge to exported pages.
    pub include_generator_link: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            auto_save_on_layer_change: SavePreference::Ask,
            include_generator_link: true,
        }
    }
}

impl EditorSettings {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> GlyphstackResult<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GlyphstackError::Other(anyhow::anyhow!(
                    "read settings '{}': {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&text).map_err(|e| {
            GlyphstackError::validation(format!("parse settings '{}': {e}", path.display()))
        })
    }

    /// Write as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> GlyphstackResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                GlyphstackError::Other(anyhow::anyhow!("create '{}': {e}", parent.display()))
            })?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| GlyphstackError::serde(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            GlyphstackError::Other(anyhow::anyhow!("write settings '{}': {e}", path.display()))
        })
    }

    /// Reset one field to its default by its JSON name. False for unknown names.
    pub fn reset(&mut self, key: &str) -> bool {
        let defaults = Self::default();
        match key {
            "autoSaveOnLayerChange" => self.auto_save_on_layer_change = defaults.auto_save_on_layer_change,
            "includeGeneratorLink" => self.include_generator_link = defaults.include_generator_link,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/settings.rs"]
mod tests;
