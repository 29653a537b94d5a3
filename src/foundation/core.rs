pub use kurbo::{Point, Rect, Vec2};

/// Stable numeric layer identifier, assigned monotonically by the store.
pub type LayerId = u64;

/// Named reference point used to place a layer on the canvas before its
/// pixel offset and scale are applied.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Canvas center.
    #[default]
    Center,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Middle of the top edge.
    TopCenter,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Middle of the left edge.
    CenterLeft,
    /// Middle of the right edge.
    CenterRight,
}

impl Anchor {
    /// Every anchor, in declaration order.
    pub const ALL: [Anchor; 9] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::TopCenter,
        Anchor::BottomCenter,
        Anchor::CenterLeft,
        Anchor::CenterRight,
    ];

    /// Kebab-case name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Center => "center",
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::TopCenter => "top-center",
            Anchor::BottomCenter => "bottom-center",
            Anchor::CenterLeft => "center-left",
            Anchor::CenterRight => "center-right",
        }
    }

    /// True when the element must be shifted by -50% horizontally to sit on the anchor.
    pub fn centers_x(self) -> bool {
        matches!(
            self,
            Anchor::Center | Anchor::TopCenter | Anchor::BottomCenter
        )
    }

    /// True when the element must be shifted by -50% vertically to sit on the anchor.
    pub fn centers_y(self) -> bool {
        matches!(
            self,
            Anchor::Center | Anchor::CenterLeft | Anchor::CenterRight
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
