use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::{Anchor, LayerId},
    lattice::model::Lattice,
};

/// Default ASCII layer resolution in characters.
pub const DEFAULT_LAYER_RESOLUTION: u32 = 100;

/// Default lattice font size in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Placeholder document for fresh HTML layers.
pub const DEFAULT_HTML_CONTENT: &str =
    r#"<div style="color: white; font-size: 24px; padding: 20px;">HTML Content</div>"#;

/// Fields shared by every layer kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCommon {
    pub id: LayerId,
    pub name: String,
    pub position: Anchor,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    pub font_size: f64,
    pub z_index: i32,
    pub visibility: bool,
    pub parallax_strength: f64,
    /// Lets pointer events reach the layer in exported documents.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_pointer_events: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl LayerCommon {
    /// Defaults for a freshly created layer.
    pub fn new(id: LayerId, name: impl Into<String>, z_index: i32, parallax_strength: f64) -> Self {
        Self {
            id,
            name: name.into(),
            position: Anchor::Center,
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            font_size: DEFAULT_FONT_SIZE,
            z_index,
            visibility: true,
            parallax_strength,
            enable_pointer_events: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsciiLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub lattice: Lattice,
    pub resolution: u32,
    /// Source raster kept for re-conversion at another resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Original raster as a data URL; empty until an image is loaded.
    pub image_data: String,
    /// Brush-edited raster; takes precedence over `image_data` once present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_pixels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
}

impl ImageLayer {
    /// The raster renderers and brushes read: edited pixels if any, else the original.
    pub fn effective_raster(&self) -> &str {
        match self.edited_pixels.as_deref() {
            Some(edited) if !edited.is_empty() => edited,
            _ => &self.image_data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub html_content: String,
    pub width: HtmlExtent,
    pub height: HtmlExtent,
    pub overflow: Overflow,
}

/// Size of an embedded HTML layer: pixels, or the full canvas extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum HtmlExtent {
    #[default]
    Auto,
    Px(f64),
}

impl HtmlExtent {
    /// CSS length for this extent.
    pub fn css(self) -> String {
        match self {
            HtmlExtent::Auto => "100%".to_owned(),
            HtmlExtent::Px(px) => format!("{px}px"),
        }
    }
}

impl Serialize for HtmlExtent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            HtmlExtent::Auto => serializer.serialize_str("auto"),
            HtmlExtent::Px(px) => serializer.serialize_f64(*px),
        }
    }
}

impl<'de> Deserialize<'de> for HtmlExtent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(px) => Ok(HtmlExtent::Px(px)),
            Repr::Str(s) if s == "auto" => Ok(HtmlExtent::Auto),
            Repr::Str(s) => s
                .trim()
                .trim_end_matches("px")
                .parse::<f64>()
                .map(HtmlExtent::Px)
                .map_err(|_| serde::de::Error::custom(format!("invalid html extent \"{s}\""))),
        }
    }
}

/// Scroll behavior of an embedded HTML layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    Visible,
    Scroll,
    ScrollX,
    #[default]
    ScrollY,
}

impl Overflow {
    /// `(overflow-x, overflow-y)` CSS values.
    pub fn css_axes(self) -> (&'static str, &'static str) {
        match self {
            Overflow::Visible => ("visible", "visible"),
            Overflow::Scroll => ("auto", "auto"),
            Overflow::ScrollX => ("auto", "visible"),
            Overflow::ScrollY => ("visible", "auto"),
        }
    }
}

/// Discriminator of [`Layer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Ascii,
    Image,
    Html,
}

impl LayerKind {
    /// Display prefix used in generated layer names.
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Ascii => "ASCII",
            LayerKind::Image => "Image",
            LayerKind::Html => "HTML",
        }
    }
}

/// One entry of the layer stack, tagged by `"type"` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Ascii(AsciiLayer),
    Image(ImageLayer),
    Html(HtmlLayer),
}

impl Layer {
    pub fn common(&self) -> &LayerCommon {
        match self {
            Layer::Ascii(l) => &l.common,
            Layer::Image(l) => &l.common,
            Layer::Html(l) => &l.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut LayerCommon {
        match self {
            Layer::Ascii(l) => &mut l.common,
            Layer::Image(l) => &mut l.common,
            Layer::Html(l) => &mut l.common,
        }
    }

    pub fn id(&self) -> LayerId {
        self.common().id
    }

    pub fn z_index(&self) -> i32 {
        self.common().z_index
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Ascii(_) => LayerKind::Ascii,
            Layer::Image(_) => LayerKind::Image,
            Layer::Html(_) => LayerKind::Html,
        }
    }

    /// True when the layer has something to draw, regardless of visibility.
    pub fn has_content(&self) -> bool {
        match self {
            Layer::Ascii(l) => !l.lattice.is_empty(),
            Layer::Image(l) => !l.effective_raster().is_empty(),
            Layer::Html(l) => !l.html_content.is_empty(),
        }
    }

    /// Tint color for kinds that support one.
    pub fn tint_color(&self) -> Option<&str> {
        match self {
            Layer::Ascii(l) => l.tint_color.as_deref(),
            Layer::Image(l) => l.tint_color.as_deref(),
            Layer::Html(_) => None,
        }
    }

    pub fn as_ascii_mut(&mut self) -> Option<&mut AsciiLayer> {
        match self {
            Layer::Ascii(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match self {
            Layer::Image(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_html_mut(&mut self) -> Option<&mut HtmlLayer> {
        match self {
            Layer::Html(l) => Some(l),
            _ => None,
        }
    }

    /// A fresh ASCII layer with an empty lattice.
    pub fn new_ascii(common: LayerCommon, resolution: u32) -> Self {
        Layer::Ascii(AsciiLayer {
            common,
            lattice: Lattice::empty(),
            resolution,
            original_image: None,
            tint_color: None,
        })
    }

    /// A fresh image layer with no raster yet.
    pub fn new_image(common: LayerCommon) -> Self {
        Layer::Image(ImageLayer {
            common,
            image_data: String::new(),
            edited_pixels: None,
            tint_color: None,
        })
    }

    /// A fresh HTML layer holding the placeholder document.
    pub fn new_html(common: LayerCommon) -> Self {
        Layer::Html(HtmlLayer {
            common,
            html_content: DEFAULT_HTML_CONTENT.to_owned(),
            width: HtmlExtent::Auto,
            height: HtmlExtent::Auto,
            overflow: Overflow::ScrollY,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
