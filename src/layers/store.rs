use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::{Anchor, LayerId},
        error::{GlyphstackError, GlyphstackResult},
    },
    lattice::{
        codec,
        convert::{ConvertOptions, LatticeConverter},
        model::CellUpdate,
    },
    layers::model::{HtmlExtent, Layer, LayerCommon, LayerKind, Overflow},
    raster::data_url,
};

/// Stored answer to "save unsaved edits before switching layers?".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavePreference {
    #[default]
    Ask,
    AlwaysSave,
    NeverSave,
}

/// What to do with the current draft before a transition away from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    Proceed,
    SaveThenProceed,
    DiscardThenProceed,
    Ask,
}

/// Decide a transition from the draft's dirtiness and the stored preference.
pub fn gate(dirty: bool, preference: SavePreference) -> GateAction {
    match (dirty, preference) {
        (false, _) => GateAction::Proceed,
        (true, SavePreference::AlwaysSave) => GateAction::SaveThenProceed,
        (true, SavePreference::NeverSave) => GateAction::DiscardThenProceed,
        (true, SavePreference::Ask) => GateAction::Ask,
    }
}

/// Working copy of the active layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DraftState {
    #[default]
    Inactive,
    ActiveClean(Layer),
    ActiveDirty(Layer),
}

impl DraftState {
    pub fn layer(&self) -> Option<&Layer> {
        match self {
            DraftState::Inactive => None,
            DraftState::ActiveClean(l) | DraftState::ActiveDirty(l) => Some(l),
        }
    }

    fn layer_mut(&mut self) -> Option<&mut Layer> {
        match self {
            DraftState::Inactive => None,
            DraftState::ActiveClean(l) | DraftState::ActiveDirty(l) => Some(l),
        }
    }

    pub fn active_id(&self) -> Option<LayerId> {
        self.layer().map(Layer::id)
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, DraftState::ActiveDirty(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivateOutcome {
    Activated,
    /// The draft is dirty and the preference is `Ask`; resolve with
    /// [`LayerStore::resolve_pending`] or [`LayerStore::cancel_pending`].
    NeedsDecision {
        from: LayerId,
        to: LayerId,
    },
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Layer removed; `active` is the newly active layer, if any.
    Deleted { active: Option<LayerId> },
    /// The layer is the dirty active draft; call again with `confirmed = true`.
    ConfirmationRequired,
    NotFound,
}

/// Canonical layer stack plus at most one editable draft.
///
/// Only `commit`, `delete`, `move_up`/`move_down`/`reorder`, `toggle_visibility`
/// and `load_layers` write the canonical list. Every editor writes the draft.
#[derive(Clone, Debug)]
pub struct LayerStore {
    layers: Vec<Layer>,
    draft: DraftState,
    next_id: LayerId,
    pending: Option<LayerId>,
    save_preference: SavePreference,
    convert_options: ConvertOptions,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            draft: DraftState::Inactive,
            next_id: 1,
            pending: None,
            save_preference: SavePreference::Ask,
            convert_options: ConvertOptions::default(),
        }
    }

    pub fn with_save_preference(mut self, preference: SavePreference) -> Self {
        self.save_preference = preference;
        self
    }

    /// Options used when image bytes are converted into a lattice.
    pub fn with_convert_options(mut self, options: ConvertOptions) -> Self {
        self.convert_options = options;
        self
    }

    pub fn save_preference(&self) -> SavePreference {
        self.save_preference
    }

    pub fn set_save_preference(&mut self, preference: SavePreference) {
        self.save_preference = preference;
    }

    /// Canonical layers in stack order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn draft_state(&self) -> &DraftState {
        &self.draft
    }

    pub fn draft(&self) -> Option<&Layer> {
        self.draft.layer()
    }

    pub fn active_id(&self) -> Option<LayerId> {
        self.draft.active_id()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_dirty()
    }

    /// Target of a suspended switch awaiting a save decision.
    pub fn pending(&self) -> Option<LayerId> {
        self.pending
    }

    pub fn next_id(&self) -> LayerId {
        self.next_id
    }

    /// The data renderers must use: the draft for the active id, else the canonical entry.
    pub fn effective(&self, id: LayerId) -> Option<&Layer> {
        match self.draft.layer() {
            Some(draft) if draft.id() == id => Some(draft),
            _ => self.canonical(id),
        }
    }

    fn canonical(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    // ----- activation -----

    /// Make `id` the active layer, gating on unsaved edits of the current draft.
    pub fn activate(&mut self, id: LayerId) -> ActivateOutcome {
        if self.canonical(id).is_none() {
            return ActivateOutcome::NotFound;
        }

        if let Some(from) = self.active_id() {
            if from == id {
                self.pending = None;
                return ActivateOutcome::Activated;
            }
            match gate(self.draft.is_dirty(), self.save_preference) {
                GateAction::Proceed | GateAction::DiscardThenProceed => {}
                GateAction::SaveThenProceed => {
                    self.commit();
                }
                GateAction::Ask => {
                    tracing::debug!(from, to = id, "layer switch awaits save decision");
                    self.pending = Some(id);
                    return ActivateOutcome::NeedsDecision { from, to: id };
                }
            }
        }

        self.load_draft(id);
        self.pending = None;
        ActivateOutcome::Activated
    }

    /// Finish a suspended switch, saving or dropping the current draft first.
    /// `None` when no switch is pending.
    pub fn resolve_pending(&mut self, save: bool) -> Option<ActivateOutcome> {
        let target = self.pending.take()?;
        if save {
            self.commit();
        } else {
            self.discard();
        }
        Some(self.activate(target))
    }

    /// Abandon a suspended switch; the current draft stays active and dirty.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    fn load_draft(&mut self, id: LayerId) {
        self.draft = match self.canonical(id) {
            Some(layer) => DraftState::ActiveClean(layer.clone()),
            None => DraftState::Inactive,
        };
        tracing::debug!(id, "draft loaded");
    }

    // ----- draft lifecycle -----

    /// Apply `update` to the active draft. Returns false without a draft.
    ///
    /// The layer id and zIndex cannot be changed through a draft; stacking
    /// order only moves through `move_up`, `move_down` and `reorder`.
    pub fn mutate(&mut self, update: impl FnOnce(&mut Layer)) -> bool {
        let Some(draft) = self.draft.layer_mut() else {
            return false;
        };
        let (id, z_index) = (draft.id(), draft.z_index());
        update(draft);
        let common = draft.common_mut();
        common.id = id;
        common.z_index = z_index;
        self.refresh_dirty();
        true
    }

    /// Like [`mutate`](Self::mutate), but only when `id` is the active layer.
    fn mutate_active(&mut self, id: LayerId, update: impl FnOnce(&mut Layer) -> bool) -> bool {
        if self.active_id() != Some(id) {
            return false;
        }
        let mut applied = false;
        self.mutate(|layer| applied = update(layer));
        applied
    }

    fn refresh_dirty(&mut self) {
        let state = std::mem::take(&mut self.draft);
        self.draft = match state {
            DraftState::Inactive => DraftState::Inactive,
            DraftState::ActiveClean(layer) | DraftState::ActiveDirty(layer) => {
                if self.canonical(layer.id()) == Some(&layer) {
                    DraftState::ActiveClean(layer)
                } else {
                    DraftState::ActiveDirty(layer)
                }
            }
        };
    }

    /// Copy the draft over its canonical entry. Returns false without a draft.
    pub fn commit(&mut self) -> bool {
        let Some(draft) = self.draft.layer() else {
            return false;
        };
        let id = draft.id();
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.layers[index] = draft.clone();
        self.refresh_dirty();
        tracing::debug!(id, "draft committed");
        true
    }

    /// Reset the draft from its canonical entry.
    pub fn discard(&mut self) -> bool {
        let Some(id) = self.active_id() else {
            return false;
        };
        self.load_draft(id);
        true
    }

    // ----- canonical list -----

    /// Remove a layer. Deleting the dirty active draft needs `confirmed`.
    pub fn delete(&mut self, id: LayerId, confirmed: bool) -> DeleteOutcome {
        let Some(index) = self.index_of(id) else {
            return DeleteOutcome::NotFound;
        };
        let was_active = self.active_id() == Some(id);
        if was_active && self.draft.is_dirty() && !confirmed {
            return DeleteOutcome::ConfirmationRequired;
        }

        self.layers.remove(index);
        if was_active || self.pending == Some(id) {
            self.pending = None;
        }

        if was_active {
            match self.layers.last().map(Layer::id) {
                Some(next) => self.load_draft(next),
                None => self.draft = DraftState::Inactive,
            }
        }

        tracing::debug!(id, "layer deleted");
        DeleteOutcome::Deleted {
            active: self.active_id(),
        }
    }

    /// Swap with the next layer, exchanging z-indices. Returns false at the top.
    pub fn move_up(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.layers.len() => {
                self.swap_adjacent(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the previous layer, exchanging z-indices. Returns false at the bottom.
    pub fn move_down(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.swap_adjacent(i - 1, i);
                true
            }
            _ => false,
        }
    }

    fn swap_adjacent(&mut self, a: usize, b: usize) {
        let za = self.layers[a].z_index();
        let zb = self.layers[b].z_index();
        self.layers[a].common_mut().z_index = zb;
        self.layers[b].common_mut().z_index = za;
        self.layers.swap(a, b);
        self.sync_draft_z_index();
    }

    /// Move the layer at `old_index` to `new_index`; z-indices are renumbered
    /// from 2 in list order.
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> bool {
        let len = self.layers.len();
        if old_index == new_index || old_index >= len || new_index >= len {
            return false;
        }
        let layer = self.layers.remove(old_index);
        self.layers.insert(new_index, layer);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.common_mut().z_index = i as i32 + 2;
        }
        self.sync_draft_z_index();
        true
    }

    fn sync_draft_z_index(&mut self) {
        let Some(id) = self.active_id() else {
            return;
        };
        let Some(z) = self.canonical(id).map(Layer::z_index) else {
            return;
        };
        if let Some(draft) = self.draft.layer_mut() {
            draft.common_mut().z_index = z;
        }
        self.refresh_dirty();
    }

    /// Flip visibility on the canonical entry (and the draft if active).
    pub fn toggle_visibility(&mut self, id: LayerId) -> Option<bool> {
        let index = self.index_of(id)?;
        let common = self.layers[index].common_mut();
        common.visibility = !common.visibility;
        let visible = common.visibility;

        if let Some(draft) = self.draft.layer_mut()
            && draft.id() == id
        {
            draft.common_mut().visibility = visible;
        }
        self.refresh_dirty();
        Some(visible)
    }

    /// Replace the whole stack. Ids must be unique; nothing changes on error.
    pub fn load_layers(&mut self, layers: Vec<Layer>) -> GlyphstackResult<()> {
        let mut seen = HashSet::with_capacity(layers.len());
        for layer in &layers {
            if !seen.insert(layer.id()) {
                return Err(GlyphstackError::malformed_project(format!(
                    "duplicate layer id {}",
                    layer.id()
                )));
            }
        }

        self.next_id = layers.iter().map(Layer::id).max().map_or(1, |max| max + 1);
        self.layers = layers;
        self.draft = DraftState::Inactive;
        self.pending = None;
        tracing::debug!(count = self.layers.len(), next_id = self.next_id, "layers loaded");
        Ok(())
    }

    // ----- creation -----

    pub fn create_ascii_layer(&mut self, resolution: u32) -> (LayerId, ActivateOutcome) {
        self.create(LayerKind::Ascii, |common| Layer::new_ascii(common, resolution))
    }

    pub fn create_image_layer(&mut self) -> (LayerId, ActivateOutcome) {
        self.create(LayerKind::Image, Layer::new_image)
    }

    pub fn create_html_layer(&mut self) -> (LayerId, ActivateOutcome) {
        self.create(LayerKind::Html, Layer::new_html)
    }

    fn create(
        &mut self,
        kind: LayerKind,
        build: impl FnOnce(LayerCommon) -> Layer,
    ) -> (LayerId, ActivateOutcome) {
        let id = self.next_id;
        self.next_id += 1;

        let z_index = self.next_z_index();
        let parallax = (0.3 + 0.1 * self.layers.len() as f64).min(1.0);
        let common = LayerCommon::new(id, format!("{} Layer {id}", kind.label()), z_index, parallax);

        self.layers.push(build(common));
        tracing::debug!(id, ?kind, z_index, "layer created");
        (id, self.activate(id))
    }

    fn next_z_index(&self) -> i32 {
        self.layers
            .iter()
            .map(Layer::z_index)
            .max()
            .map_or(2, |max| max + 1)
    }

    /// Append a fully built layer (used by importers). The id is reassigned and
    /// the layer goes on top of the stack.
    pub fn push_layer(&mut self, mut layer: Layer) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        let z_index = self.next_z_index();
        let common = layer.common_mut();
        common.id = id;
        common.z_index = z_index;
        self.layers.push(layer);
        tracing::debug!(id, z_index, "layer imported");
        id
    }

    // ----- content editors (draft only) -----

    /// Convert encoded image bytes into the draft's lattice and keep the
    /// source as `originalImage`. Content is untouched on decode failure.
    pub fn set_lattice_from_image(
        &mut self,
        id: LayerId,
        bytes: &[u8],
        resolution: Option<u32>,
    ) -> GlyphstackResult<bool> {
        let Some(Layer::Ascii(ascii)) = self.draft.layer().filter(|l| l.id() == id) else {
            return Ok(false);
        };
        let resolution = resolution.unwrap_or(ascii.resolution);

        let converter = LatticeConverter::new(ConvertOptions {
            resolution,
            ..self.convert_options.clone()
        });
        let lattice = converter.convert_bytes(bytes)?;
        let mime = image::guess_format(bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/png");
        let original = data_url::encode_bytes(mime, bytes);

        Ok(self.mutate_active(id, |layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return false;
            };
            ascii.lattice = lattice;
            ascii.resolution = resolution;
            ascii.original_image = Some(original);
            true
        }))
    }

    /// Parse plain or styled text into the draft's lattice; clears `originalImage`.
    pub fn set_lattice_from_text(&mut self, id: LayerId, text: &str) -> bool {
        let lattice = codec::parse(text);
        self.mutate_active(id, |layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return false;
            };
            ascii.lattice = lattice;
            ascii.original_image = None;
            true
        })
    }

    /// Re-convert from `originalImage` at a new resolution. `Ok(false)` when the
    /// draft has no source image.
    pub fn set_lattice_resolution(&mut self, id: LayerId, resolution: u32) -> GlyphstackResult<bool> {
        let Some(Layer::Ascii(ascii)) = self.draft.layer().filter(|l| l.id() == id) else {
            return Ok(false);
        };
        let Some(original) = ascii.original_image.as_deref() else {
            return Ok(false);
        };

        let image = data_url::decode_image(original)?;
        let lattice = LatticeConverter::new(ConvertOptions {
            resolution,
            ..self.convert_options.clone()
        })
        .convert(&image)?;

        Ok(self.mutate_active(id, |layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return false;
            };
            ascii.lattice = lattice;
            ascii.resolution = resolution;
            true
        }))
    }

    /// Patch one draft cell. Out-of-range coordinates are ignored.
    pub fn update_cell(&mut self, id: LayerId, x: i64, y: i64, update: &CellUpdate) -> bool {
        self.mutate_active(id, |layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return false;
            };
            if !ascii.lattice.contains(x, y) {
                return false;
            }
            match ascii.lattice.get_mut(x as usize, y as usize) {
                Some(cell) => {
                    update.apply(cell);
                    true
                }
                None => false,
            }
        })
    }

    pub fn erase_cell(&mut self, id: LayerId, x: i64, y: i64) -> bool {
        self.update_cell(id, x, y, &CellUpdate::erase())
    }

    /// Recolor every non-space cell of the draft lattice.
    pub fn apply_color_to_all_cells(
        &mut self,
        id: LayerId,
        text_color: &str,
        bg_color: Option<&str>,
        alpha: Option<f64>,
    ) -> bool {
        let update = CellUpdate {
            text_color: Some(text_color.to_owned()),
            bg_color: bg_color.map(str::to_owned),
            alpha,
            ..CellUpdate::default()
        };
        self.mutate_active(id, |layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return false;
            };
            for cell in ascii.lattice.cells.iter_mut().flatten() {
                if cell.ch != ' ' {
                    update.apply(cell);
                }
            }
            true
        })
    }

    pub fn set_image_data(&mut self, id: LayerId, image_data: impl Into<String>) -> bool {
        let image_data = image_data.into();
        self.mutate_active(id, |layer| match layer.as_image_mut() {
            Some(image) => {
                image.image_data = image_data;
                true
            }
            None => false,
        })
    }

    pub fn set_edited_pixels(&mut self, id: LayerId, edited: impl Into<String>) -> bool {
        let edited = edited.into();
        self.mutate_active(id, |layer| match layer.as_image_mut() {
            Some(image) => {
                image.edited_pixels = Some(edited);
                true
            }
            None => false,
        })
    }

    pub fn set_html_content(&mut self, id: LayerId, content: impl Into<String>) -> bool {
        let content = content.into();
        self.mutate_active(id, |layer| match layer.as_html_mut() {
            Some(html) => {
                html.html_content = content;
                true
            }
            None => false,
        })
    }

    pub fn set_html_dimensions(&mut self, id: LayerId, width: HtmlExtent, height: HtmlExtent) -> bool {
        self.mutate_active(id, |layer| match layer.as_html_mut() {
            Some(html) => {
                html.width = width;
                html.height = height;
                true
            }
            None => false,
        })
    }

    pub fn set_html_overflow(&mut self, id: LayerId, overflow: Overflow) -> bool {
        self.mutate_active(id, |layer| match layer.as_html_mut() {
            Some(html) => {
                html.overflow = overflow;
                true
            }
            None => false,
        })
    }

    // ----- common-field editors (active draft) -----

    pub fn set_position(&mut self, position: Anchor) -> bool {
        self.mutate(|l| l.common_mut().position = position)
    }

    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) -> bool {
        self.mutate(|l| {
            let c = l.common_mut();
            c.offset_x = offset_x;
            c.offset_y = offset_y;
        })
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.mutate(|l| l.common_mut().scale = scale)
    }

    pub fn set_font_size(&mut self, font_size: f64) -> bool {
        self.mutate(|l| l.common_mut().font_size = font_size)
    }

    pub fn set_parallax_strength(&mut self, strength: f64) -> bool {
        self.mutate(|l| l.common_mut().parallax_strength = strength)
    }

    pub fn set_enable_pointer_events(&mut self, enabled: bool) -> bool {
        self.mutate(|l| l.common_mut().enable_pointer_events = enabled)
    }

    pub fn rename(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.mutate(|l| l.common_mut().name = name)
    }

    /// Set or clear the tint of an ASCII or image draft. HTML drafts are untouched.
    pub fn set_tint_color(&mut self, tint: Option<String>) -> bool {
        let Some(id) = self.active_id() else {
            return false;
        };
        self.mutate_active(id, |layer| match layer {
            Layer::Ascii(a) => {
                a.tint_color = tint;
                true
            }
            Layer::Image(i) => {
                i.tint_color = tint;
                true
            }
            Layer::Html(_) => false,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/store.rs"]
mod tests;
