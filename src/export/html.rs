use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{
    color::math::{TRANSPARENT, apply_tint, is_white},
    export::position::{anchor_css, transform_css, transform_origin},
    foundation::error::{GlyphstackError, GlyphstackResult},
    lattice::{
        codec::{escape_attr, write_styled_cell},
        model::Lattice,
    },
    layers::model::{AsciiLayer, HtmlLayer, ImageLayer, Layer, LayerCommon},
    raster::data_url::is_image_data_url,
};

/// Link target of the optional "made with" badge.
pub const GENERATOR_URL: &str = "https://aitechnopagan.github.io/sailormoonrpg/";

/// Class definitions embedded when a project carries no custom CSS.
pub const DEFAULT_CUSTOM_CSS: &str = "\
.twinkle {
    display: inline;
    animation: twinkle 2s ease-in-out infinite;
}

@keyframes twinkle {
    0%, 100% { opacity: 1; }
    50% { opacity: 0.3; }
}";

/// Canvas sizing mode of the exported page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasResolution {
    /// Fill the viewport.
    #[default]
    Responsive,
    Square,
    Landscape,
    Portrait,
    /// Fixed pixel size.
    Custom { width: u32, height: u32 },
}

impl CanvasResolution {
    /// `(container, body)` declarations for this mode.
    pub fn styles(self) -> (String, &'static str) {
        const CENTERED_BODY: &str = "display: flex; align-items: center; justify-content: center; background-color: #f0f0f0;";
        match self {
            CanvasResolution::Responsive => (
                "width: 100%; height: 100%;".to_owned(),
                "width: 100vw; height: 100vh; overflow: hidden;",
            ),
            CanvasResolution::Square => (
                "max-width: 800px; max-height: 800px; width: 100vmin; height: 100vmin; border: 1px solid #000000;"
                    .to_owned(),
                CENTERED_BODY,
            ),
            CanvasResolution::Landscape => (
                "max-width: 1200px; max-height: 675px; width: 90vw; height: calc(90vw * 9 / 16); border: 2px solid #000000;"
                    .to_owned(),
                CENTERED_BODY,
            ),
            CanvasResolution::Portrait => (
                "max-width: 675px; max-height: 1200px; width: calc(90vh * 9 / 16); height: 90vh; border: 2px solid #000000;"
                    .to_owned(),
                CENTERED_BODY,
            ),
            CanvasResolution::Custom { width, height } => (
                format!("width: {width}px; height: {height}px; border: 1px solid #000000;"),
                CENTERED_BODY,
            ),
        }
    }
}

/// Page-level export options.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    pub resolution: CanvasResolution,
    /// Canvas background, any CSS color.
    pub background_color: String,
    /// Emit the cursor-driven parallax script.
    pub parallax_enabled: bool,
    pub include_generator_link: bool,
    /// Class definitions for cell `className`s; `None` embeds [`DEFAULT_CUSTOM_CSS`].
    pub custom_css: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolution: CanvasResolution::Responsive,
            background_color: "#ffffff".to_owned(),
            parallax_enabled: false,
            include_generator_link: true,
            custom_css: None,
        }
    }
}

/// Render `layers` into a standalone HTML document.
///
/// Layers are filtered to visible ones with content and painted in ascending
/// zIndex order. A layer that cannot be rendered is skipped with a warning.
/// Fails with [`GlyphstackError::EmptyExport`] when nothing remains.
#[tracing::instrument(skip_all, fields(layers = layers.len(), parallax = config.parallax_enabled))]
pub fn generate_export(layers: &[Layer], config: &ExportConfig) -> GlyphstackResult<String> {
    let mut visible: Vec<&Layer> = layers
        .iter()
        .filter(|l| l.common().visibility && l.has_content())
        .collect();
    visible.sort_by_key(|l| l.z_index());

    let mut body = String::new();
    let mut rendered = 0usize;
    for layer in visible {
        match render_layer(layer, config.parallax_enabled) {
            Ok(markup) => {
                body.push_str(&markup);
                rendered += 1;
            }
            Err(err) => {
                tracing::warn!(id = layer.id(), %err, "layer skipped in export");
            }
        }
    }

    if rendered == 0 {
        return Err(GlyphstackError::EmptyExport);
    }
    tracing::debug!(rendered, "export assembled");
    Ok(document(&body, config))
}

fn render_layer(layer: &Layer, parallax: bool) -> GlyphstackResult<String> {
    match layer {
        Layer::Ascii(a) => render_ascii(a, parallax),
        Layer::Image(i) => render_image(i, parallax),
        Layer::Html(h) => Ok(render_html(h, parallax)),
    }
}

fn render_ascii(layer: &AsciiLayer, parallax: bool) -> GlyphstackResult<String> {
    if !layer.lattice.is_consistent() {
        return Err(GlyphstackError::validation("lattice rows have uneven widths"));
    }

    let c = &layer.common;
    let mut out = open_layer(
        "ascii-layer",
        c,
        parallax,
        &format!("font-size: {}px;", c.font_size),
    );
    out.push('\n');
    write_lattice(&mut out, &layer.lattice, layer.tint_color.as_deref());
    out.push_str("        </div>\n");
    Ok(out)
}

/// Cells as markup, tinted when `tint` is set. Erased cells become bare spaces.
fn write_lattice(out: &mut String, lattice: &Lattice, tint: Option<&str>) {
    for row in &lattice.cells {
        for cell in row {
            if cell.ch == ' ' && cell.alpha == 0.0 && cell.bg_color == TRANSPARENT {
                out.push(' ');
                continue;
            }
            match tint {
                Some(t) if !cell.is_blank() => {
                    let mut tinted = cell.clone();
                    tinted.text_color = apply_tint(&cell.text_color, t);
                    write_styled_cell(out, &tinted);
                }
                _ => write_styled_cell(out, cell),
            }
        }
        out.push('\n');
    }
}

fn render_image(layer: &ImageLayer, parallax: bool) -> GlyphstackResult<String> {
    let src = layer.effective_raster();
    if !is_image_data_url(src) {
        return Err(GlyphstackError::image_decode("image layer source is not an image data URL"));
    }

    let c = &layer.common;
    let pointer = if c.enable_pointer_events { "auto" } else { "none" };
    let mut out = open_layer("image-layer", c, parallax, &format!("pointer-events: {pointer};"));
    let _ = writeln!(out, "\n            <img src=\"{}\" alt=\"\">", escape_attr(src));
    if let Some(tint) = layer.tint_color.as_deref()
        && !is_white(tint)
    {
        let _ = writeln!(
            out,
            "            <div class=\"tint-overlay\" style=\"background-color: {}; mix-blend-mode: multiply;\"></div>",
            escape_attr(tint)
        );
    }
    out.push_str("        </div>\n");
    Ok(out)
}

fn render_html(layer: &HtmlLayer, parallax: bool) -> String {
    let c = &layer.common;
    let (ox, oy) = layer.overflow.css_axes();
    let extra = format!(
        "width: {}; height: {}; overflow-x: {ox}; overflow-y: {oy}; pointer-events: auto;",
        layer.width.css(),
        layer.height.css()
    );
    let mut out = open_layer("html-layer", c, parallax, &extra);
    let _ = writeln!(
        out,
        "\n            <iframe srcdoc=\"{}\" sandbox=\"allow-scripts\" title=\"{}\"></iframe>",
        escape_attr(&layer.html_content),
        escape_attr(&c.name)
    );
    out.push_str("        </div>\n");
    out
}

/// Opening tag of a layer wrapper, with placement and parallax data attributes.
///
/// Static pages get their final transform inline; parallax pages get it from
/// the script on every frame.
fn open_layer(class: &str, c: &LayerCommon, parallax: bool, extra_style: &str) -> String {
    let mut style = format!(
        "z-index: {}; {} transform-origin: {};",
        c.z_index,
        anchor_css(c.position),
        transform_origin(c.position)
    );
    if !parallax {
        let _ = write!(
            style,
            " transform: {};",
            transform_css(c.position, c.offset_x, c.offset_y, c.scale)
        );
    }
    if !extra_style.is_empty() {
        style.push(' ');
        style.push_str(extra_style);
    }

    format!(
        "        <div class=\"layer {class} position-{}\" data-layer-id=\"{}\" data-name=\"{}\" \
         data-parallax=\"{}\" data-offset-x=\"{}\" data-offset-y=\"{}\" data-scale=\"{}\" \
         data-center-x=\"{}\" data-center-y=\"{}\" style=\"{}\">",
        c.position.as_str(),
        c.id,
        escape_attr(&c.name),
        c.parallax_strength,
        c.offset_x,
        c.offset_y,
        c.scale,
        c.position.centers_x(),
        c.position.centers_y(),
        escape_attr(&style),
    )
}

const BASE_CSS: &str = "\
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        .layer {
            position: absolute;
            transition: transform 0.05s ease-out;
        }

        .ascii-layer {
            line-height: 1;
            white-space: pre;
            font-family: 'Courier New', monospace;
        }

        .image-layer {
            display: flex;
            align-items: center;
            justify-content: center;
        }

        .image-layer img {
            max-width: 100%;
            max-height: 100%;
            display: block;
        }

        .tint-overlay {
            position: absolute;
            inset: 0;
            pointer-events: none;
        }

        .html-layer iframe {
            width: 100%;
            height: 100%;
            border: 0;
            background: transparent;
        }
";

const GENERATOR_CSS: &str = "
        .generator-link {
            position: fixed;
            bottom: 20px;
            left: 50%;
            transform: translateX(-50%);
            font-family: 'Courier New', monospace;
            font-size: 11px;
            color: #666;
            text-decoration: none;
            padding: 8px 16px;
            border-radius: 20px;
            background: rgba(255, 255, 255, 0.9);
            border: 1px solid rgba(0, 0, 0, 0.1);
            z-index: 9999;
        }

        .generator-link:hover {
            color: #4a9eff;
            border-color: #4a9eff;
        }
";

const PARALLAX_SCRIPT: &str = r#"    <script>
        (function () {
            const container = document.querySelector('.canvas-container');
            const layers = Array.from(document.querySelectorAll('.layer')).map((el) => ({
                el,
                strength: parseFloat(el.dataset.parallax) || 0,
                offsetX: parseFloat(el.dataset.offsetX) || 0,
                offsetY: parseFloat(el.dataset.offsetY) || 0,
                scale: parseFloat(el.dataset.scale) || 1,
                centerX: el.dataset.centerX === 'true',
                centerY: el.dataset.centerY === 'true',
            }));
            let mouseX = 0.5;
            let mouseY = 0.5;

            document.addEventListener('mousemove', (e) => {
                const rect = container.getBoundingClientRect();
                mouseX = (e.clientX - rect.left) / rect.width;
                mouseY = (e.clientY - rect.top) / rect.height;
            });

            const axis = (centered, px) => (centered ? `calc(-50% + ${px}px)` : `${px}px`);

            function frame() {
                for (const l of layers) {
                    const tx = l.offsetX + (mouseX - 0.5) * l.strength * 100;
                    const ty = l.offsetY + (mouseY - 0.5) * l.strength * 100;
                    l.el.style.transform = `translate(${axis(l.centerX, tx)}, ${axis(l.centerY, ty)}) scale(${l.scale})`;
                }
                requestAnimationFrame(frame);
            }
            frame();
        })();
    </script>
"#;

fn document(layers_html: &str, config: &ExportConfig) -> String {
    let (container_css, body_css) = config.resolution.styles();
    let custom_css = config.custom_css.as_deref().unwrap_or(DEFAULT_CUSTOM_CSS);

    let mut out = String::with_capacity(layers_html.len() + 4096);
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>ASCII Art</title>\n    <style>\n",
    );
    out.push_str(BASE_CSS);
    let _ = write!(
        out,
        "\n        body {{\n            font-family: 'Courier New', monospace; {body_css}\n        }}\n\n        \
         .canvas-container {{\n            position: relative;\n            overflow: hidden;\n            \
         background-color: {}; {container_css}\n        }}\n",
        config.background_color
    );
    if config.include_generator_link {
        out.push_str(GENERATOR_CSS);
    }
    let _ = writeln!(out, "\n{}\n    </style>\n</head>\n<body>", escape_style_text(custom_css));

    out.push_str("    <div class=\"canvas-container\">\n");
    out.push_str(layers_html);
    out.push_str("    </div>\n");
    if config.include_generator_link {
        let _ = writeln!(
            out,
            "    <a href=\"{GENERATOR_URL}\" class=\"generator-link\" target=\"_blank\" rel=\"noopener\">Made with ASCII Art Generator</a>"
        );
    }
    if config.parallax_enabled {
        out.push_str(PARALLAX_SCRIPT);
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// Break up every `</` in user CSS; the HTML parser ends a style block at
/// `</style` in any letter case.
fn escape_style_text(css: &str) -> String {
    css.replace("</", "<\\/")
}

#[cfg(test)]
#[path = "../../tests/unit/export/html.rs"]
mod tests;
