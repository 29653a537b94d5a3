use serde::{Deserialize, Serialize};

use crate::{
    color::math::{DEFAULT_TEXT_COLOR, TRANSPARENT},
    foundation::error::{GlyphstackError, GlyphstackResult},
    layers::model::LayerKind,
};

/// Largest brush radius on ASCII layers, in cells.
pub const MAX_ASCII_RADIUS: u32 = 10;

/// Largest brush radius on image layers, in pixels.
pub const MAX_IMAGE_RADIUS: u32 = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Select,
    Move,
    Scale,
    Erase,
    PaintColor,
    PaintAlpha,
    ColorPicker,
}

impl Tool {
    /// Tools that stamp on pointer-down and on every held pointer-move.
    pub fn is_stroke(self) -> bool {
        matches!(self, Tool::Erase | Tool::PaintColor | Tool::PaintAlpha)
    }
}

/// Radius upper bound for a layer kind.
pub fn max_radius(kind: LayerKind) -> u32 {
    match kind {
        LayerKind::Image => MAX_IMAGE_RADIUS,
        LayerKind::Ascii | LayerKind::Html => MAX_ASCII_RADIUS,
    }
}

/// Current brush shape and paint values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushSettings {
    pub radius: u32,
    pub current_text_color: String,
    pub current_bg_color: String,
    pub current_alpha: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: 1,
            current_text_color: DEFAULT_TEXT_COLOR.to_owned(),
            current_bg_color: TRANSPARENT.to_owned(),
            current_alpha: 1.0,
        }
    }
}

impl BrushSettings {
    /// Set the radius, clamped to `[1, max_radius(kind)]`.
    pub fn set_radius(&mut self, radius: u32, kind: LayerKind) {
        self.radius = radius.clamp(1, max_radius(kind));
    }

    /// Set the alpha, clamped to `[0, 1]`.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.current_alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    }

    pub fn set_text_color(&mut self, color: impl Into<String>) {
        self.current_text_color = color.into();
    }

    pub fn set_bg_color(&mut self, color: impl Into<String>) {
        self.current_bg_color = color.into();
    }
}

/// Payload from an external tool palette.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub active_tool: Tool,
    pub radius: u32,
    pub current_text_color: String,
    pub current_bg_color: String,
    pub current_alpha: f64,
}

impl ToolConfig {
    /// Check ranges for a target layer kind and build brush settings from it.
    pub fn validate(&self, kind: LayerKind) -> GlyphstackResult<(Tool, BrushSettings)> {
        let max = max_radius(kind);
        if !(1..=max).contains(&self.radius) {
            return Err(GlyphstackError::validation(format!(
                "brush radius must be in [1, {max}], got {}",
                self.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.current_alpha) {
            return Err(GlyphstackError::validation(format!(
                "brush alpha must be in [0, 1], got {}",
                self.current_alpha
            )));
        }

        Ok((
            self.active_tool,
            BrushSettings {
                radius: self.radius,
                current_text_color: self.current_text_color.clone(),
                current_bg_color: self.current_bg_color.clone(),
                current_alpha: self.current_alpha,
                ..BrushSettings::default()
            },
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/settings.rs"]
mod tests;
