//! Anchor, offset and scale to CSS.
//!
//! Every layer kind is placed the same way: the anchor picks the CSS edge
//! offsets and the transform origin, then `translate(..) scale(..)` applies
//! the pixel offset. Axes that center on the anchor are re-centered with
//! `calc(-50% + ..)` before the offset is added.

use crate::foundation::core::Anchor;

/// CSS `transform-origin` for an anchor.
pub fn transform_origin(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Center => "center",
        Anchor::TopLeft => "top left",
        Anchor::TopRight => "top right",
        Anchor::BottomLeft => "bottom left",
        Anchor::BottomRight => "bottom right",
        Anchor::TopCenter => "top center",
        Anchor::BottomCenter => "bottom center",
        Anchor::CenterLeft => "center left",
        Anchor::CenterRight => "center right",
    }
}

/// Edge offset declarations that pin an absolutely positioned element to `anchor`.
pub fn anchor_css(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Center => "top: 50%; left: 50%;",
        Anchor::TopLeft => "top: 0; left: 0;",
        Anchor::TopRight => "top: 0; right: 0;",
        Anchor::BottomLeft => "bottom: 0; left: 0;",
        Anchor::BottomRight => "bottom: 0; right: 0;",
        Anchor::TopCenter => "top: 0; left: 50%;",
        Anchor::BottomCenter => "bottom: 0; left: 50%;",
        Anchor::CenterLeft => "top: 50%; left: 0;",
        Anchor::CenterRight => "top: 50%; right: 0;",
    }
}

/// CSS `transform` value for a translate of `(tx, ty)` pixels and a uniform scale.
pub fn transform_css(anchor: Anchor, tx: f64, ty: f64, scale: f64) -> String {
    format!(
        "translate({}, {}) scale({scale})",
        axis(anchor.centers_x(), tx),
        axis(anchor.centers_y(), ty)
    )
}

fn axis(centered: bool, offset: f64) -> String {
    if centered {
        format!("calc(-50% + {offset}px)")
    } else {
        format!("{offset}px")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/position.rs"]
mod tests;
