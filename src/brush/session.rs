use image::RgbaImage;

use crate::{
    brush::{
        settings::{BrushSettings, Tool},
        stamp,
    },
    foundation::{
        core::{LayerId, Point, Rect, Vec2},
        error::GlyphstackResult,
    },
    layers::{model::Layer, store::LayerStore},
    raster::data_url,
};

/// Scale bounds for image layers.
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Pixels of handle drag that add 100% to the scale.
const SCALE_DRAG_SPAN: f64 = 200.0;

/// Edge or corner handle of an image layer's scale frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ScaleHandle {
    /// Multiplier for a drag of `delta` pixels; corner handles average both axes.
    pub fn factor(self, delta: Vec2) -> f64 {
        let right = 1.0 + delta.x / SCALE_DRAG_SPAN;
        let left = 1.0 - delta.x / SCALE_DRAG_SPAN;
        let down = 1.0 + delta.y / SCALE_DRAG_SPAN;
        let up = 1.0 - delta.y / SCALE_DRAG_SPAN;
        match self {
            ScaleHandle::E => right,
            ScaleHandle::W => left,
            ScaleHandle::S => down,
            ScaleHandle::N => up,
            ScaleHandle::NE => (right + up) / 2.0,
            ScaleHandle::NW => (left + up) / 2.0,
            ScaleHandle::SE => (right + down) / 2.0,
            ScaleHandle::SW => (left + down) / 2.0,
        }
    }
}

/// One pointer sample: canvas position plus the active layer element's
/// on-screen bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub bounds: Rect,
    /// Handle under the pointer, for scale gestures.
    pub handle: Option<ScaleHandle>,
}

impl PointerEvent {
    pub fn new(position: Point, bounds: Rect) -> Self {
        Self {
            position,
            bounds,
            handle: None,
        }
    }

    pub fn on_handle(mut self, handle: ScaleHandle) -> Self {
        self.handle = Some(handle);
        self
    }
}

#[derive(Debug, Default)]
enum Gesture {
    #[default]
    Idle,
    LatticeStroke {
        layer: LayerId,
    },
    /// The working raster is owned by the gesture and written back once.
    RasterStroke {
        layer: LayerId,
        raster: RgbaImage,
    },
    Move {
        layer: LayerId,
        start: Point,
        origin: Vec2,
    },
    Scale {
        layer: LayerId,
        handle: ScaleHandle,
        start: Point,
        start_scale: f64,
    },
}

/// Drives tools against the active draft of a [`LayerStore`].
///
/// A gesture starts on pointer-down, stamps or drags on pointer-move, and
/// ends with exactly one commit on pointer-up or pointer-leave.
#[derive(Debug, Default)]
pub struct BrushSession {
    pub tool: Tool,
    pub brush: BrushSettings,
    gesture: Gesture,
}

impl BrushSession {
    pub fn new(tool: Tool, brush: BrushSettings) -> Self {
        Self {
            tool,
            brush,
            gesture: Gesture::Idle,
        }
    }

    /// True while a stroke or drag is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn pointer_down(&mut self, store: &mut LayerStore, ev: PointerEvent) -> GlyphstackResult<()> {
        if self.is_active() {
            return Ok(());
        }
        let Some(draft) = store.draft() else {
            return Ok(());
        };
        let layer_id = draft.id();

        match self.tool {
            Tool::Move => {
                let c = draft.common();
                self.gesture = Gesture::Move {
                    layer: layer_id,
                    start: ev.position,
                    origin: Vec2::new(c.offset_x, c.offset_y),
                };
            }
            Tool::Scale => {
                if let (Layer::Image(image), Some(handle)) = (draft, ev.handle) {
                    self.gesture = Gesture::Scale {
                        layer: layer_id,
                        handle,
                        start: ev.position,
                        start_scale: image.common.scale,
                    };
                }
            }
            Tool::ColorPicker => match draft {
                Layer::Ascii(ascii) => {
                    let l = &ascii.lattice;
                    if let Some((x, y)) = stamp::cell_at(ev.position, ev.bounds, l.width, l.height) {
                        stamp::pick_cell(l, x, y, &mut self.brush);
                    }
                }
                Layer::Image(image) if image.effective_raster().is_empty() => {}
                Layer::Image(image) => {
                    let raster = data_url::decode_rgba(image.effective_raster())?;
                    let (w, h) = raster.dimensions();
                    if let Some((x, y)) = stamp::pixel_at(ev.position, ev.bounds, w, h) {
                        stamp::pick_pixel(&raster, x, y, &mut self.brush);
                    }
                }
                Layer::Html(_) => {}
            },
            tool if tool.is_stroke() => match draft {
                Layer::Ascii(ascii) => {
                    let l = &ascii.lattice;
                    if stamp::cell_at(ev.position, ev.bounds, l.width, l.height).is_some() {
                        self.gesture = Gesture::LatticeStroke { layer: layer_id };
                        self.stamp_lattice(store, ev);
                    }
                }
                Layer::Image(image) if image.effective_raster().is_empty() => {}
                Layer::Image(image) => {
                    let raster = data_url::decode_rgba(image.effective_raster())?;
                    let (w, h) = raster.dimensions();
                    if stamp::pixel_at(ev.position, ev.bounds, w, h).is_some() {
                        self.gesture = Gesture::RasterStroke {
                            layer: layer_id,
                            raster,
                        };
                        self.stamp_raster(ev);
                    }
                }
                Layer::Html(_) => {}
            },
            _ => {}
        }

        if self.is_active() {
            tracing::debug!(layer = layer_id, tool = ?self.tool, "gesture started");
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, store: &mut LayerStore, ev: PointerEvent) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::LatticeStroke { .. } => self.stamp_lattice(store, ev),
            Gesture::RasterStroke { .. } => self.stamp_raster(ev),
            Gesture::Move { start, origin, .. } => {
                let delta = ev.position - start;
                store.set_offset(origin.x + delta.x, origin.y + delta.y);
            }
            Gesture::Scale {
                handle,
                start,
                start_scale,
                ..
            } => {
                let factor = handle.factor(ev.position - start);
                store.set_scale((start_scale * factor).clamp(MIN_SCALE, MAX_SCALE));
            }
        }
    }

    /// End the gesture and commit the draft once. Returns whether a commit happened.
    pub fn pointer_up(&mut self, store: &mut LayerStore) -> GlyphstackResult<bool> {
        let layer = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return Ok(false),
            Gesture::RasterStroke { layer, raster } => {
                let url = data_url::encode_png(&raster)?;
                store.set_edited_pixels(layer, url);
                layer
            }
            Gesture::LatticeStroke { layer }
            | Gesture::Move { layer, .. }
            | Gesture::Scale { layer, .. } => layer,
        };

        if store.active_id() != Some(layer) {
            tracing::warn!(layer, "gesture target is no longer active, nothing committed");
            return Ok(false);
        }
        tracing::debug!(layer, "gesture ended");
        Ok(store.commit())
    }

    /// Leaving the surface finalizes like pointer-up.
    pub fn pointer_leave(&mut self, store: &mut LayerStore) -> GlyphstackResult<bool> {
        self.pointer_up(store)
    }

    fn stamp_lattice(&self, store: &mut LayerStore, ev: PointerEvent) {
        let Some(update) = stamp::lattice_update(self.tool, &self.brush) else {
            return;
        };
        let radius = self.brush.radius;
        store.mutate(|layer| {
            let Some(ascii) = layer.as_ascii_mut() else {
                return;
            };
            let l = &mut ascii.lattice;
            if let Some((x, y)) = stamp::cell_at(ev.position, ev.bounds, l.width, l.height) {
                stamp::stamp_lattice(l, x as i64, y as i64, radius, &update);
            }
        });
    }

    fn stamp_raster(&mut self, ev: PointerEvent) {
        let Gesture::RasterStroke { raster, .. } = &mut self.gesture else {
            return;
        };
        let (w, h) = raster.dimensions();
        let Some((x, y)) = stamp::pixel_at(ev.position, ev.bounds, w, h) else {
            return;
        };
        stamp::stamp_raster(
            raster,
            Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5),
            f64::from(self.brush.radius),
            self.tool,
            &self.brush,
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/session.rs"]
mod tests;
