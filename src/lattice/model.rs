use crate::color::math::{DEFAULT_TEXT_COLOR, TRANSPARENT};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One styled grid position of a lattice.
pub struct CharacterCell {
    /// Single glyph (may be a space).
    #[serde(rename = "char", deserialize_with = "glyph_or_space")]
    pub ch: char,
    /// Glyph color, normally `#rrggbb`.
    pub text_color: String,
    /// Background color or the `"transparent"` sentinel.
    pub bg_color: String,
    /// Opacity in `[0, 1]`; `0` together with a space is the erased state.
    pub alpha: f64,
    /// Optional CSS class, opaque to the converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl CharacterCell {
    /// The canonical erased cell: space, black, transparent, alpha 0.
    pub fn empty() -> Self {
        Self {
            ch: ' ',
            text_color: DEFAULT_TEXT_COLOR.to_owned(),
            bg_color: TRANSPARENT.to_owned(),
            alpha: 0.0,
            class_name: None,
        }
    }

    /// An unstyled, fully opaque cell holding `ch`.
    pub fn plain(ch: char) -> Self {
        Self {
            alpha: 1.0,
            ch,
            ..Self::empty()
        }
    }

    /// True when the cell carries no visible glyph (space or zero alpha).
    pub fn is_blank(&self) -> bool {
        self.ch == ' ' || self.alpha == 0.0
    }

    /// True when every style attribute is at its default, so the cell can be
    /// written as a bare glyph.
    pub fn has_default_style(&self) -> bool {
        self.text_color == DEFAULT_TEXT_COLOR
            && self.bg_color == TRANSPARENT
            && self.alpha == 1.0
            && self.class_name.is_none()
    }
}

/// Partial cell update; `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellUpdate {
    pub ch: Option<char>,
    pub text_color: Option<String>,
    pub bg_color: Option<String>,
    pub alpha: Option<f64>,
    pub class_name: Option<Option<String>>,
}

impl CellUpdate {
    /// Reset to [`CharacterCell::empty`]; class names are kept.
    pub fn erase() -> Self {
        let empty = CharacterCell::empty();
        Self {
            ch: Some(empty.ch),
            text_color: Some(empty.text_color),
            bg_color: Some(empty.bg_color),
            alpha: Some(empty.alpha),
            class_name: None,
        }
    }

    /// Replace both colors and the alpha.
    pub fn colors(text_color: &str, bg_color: &str, alpha: f64) -> Self {
        Self {
            text_color: Some(text_color.to_owned()),
            bg_color: Some(bg_color.to_owned()),
            alpha: Some(alpha),
            ..Self::default()
        }
    }

    /// Replace only the alpha.
    pub fn alpha(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::default()
        }
    }

    pub fn apply(&self, cell: &mut CharacterCell) {
        if let Some(ch) = self.ch {
            cell.ch = ch;
        }
        if let Some(c) = &self.text_color {
            cell.text_color.clone_from(c);
        }
        if let Some(c) = &self.bg_color {
            cell.bg_color.clone_from(c);
        }
        if let Some(a) = self.alpha {
            cell.alpha = a;
        }
        if let Some(class) = &self.class_name {
            cell.class_name.clone_from(class);
        }
    }
}

fn glyph_or_space<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
    Ok(s.chars().next().unwrap_or(' '))
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Row-major grid of styled character cells.
///
/// Every row holds exactly `width` cells and there are exactly `height` rows.
/// Lattices are replaced wholesale on resolution changes, never resized.
pub struct Lattice {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Rows of cells, top to bottom.
    pub cells: Vec<Vec<CharacterCell>>,
}

impl Lattice {
    /// The 0×0 lattice.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from rows, checking that the grid is rectangular.
    pub fn from_rows(cells: Vec<Vec<CharacterCell>>) -> Option<Self> {
        let height = cells.len();
        let width = cells.first().map_or(0, Vec::len);
        if cells.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// A `width`×`height` lattice filled with `cell`.
    pub fn filled(width: usize, height: usize, cell: CharacterCell) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![cell; width]; height],
        }
    }

    /// True when the lattice has no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.cells.is_empty()
    }

    /// True when `(x, y)` addresses a cell.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at `(x, y)`, if in bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&CharacterCell> {
        self.cells.get(y).and_then(|row| row.get(x))
    }

    /// Mutable cell at `(x, y)`, if in bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut CharacterCell> {
        self.cells.get_mut(y).and_then(|row| row.get_mut(x))
    }

    /// Check the rectangular-grid invariant against `width`/`height`.
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.height && self.cells.iter().all(|row| row.len() == self.width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lattice/model.rs"]
mod tests;
