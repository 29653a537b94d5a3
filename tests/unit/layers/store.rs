use std::io::Cursor;

use super::*;
use crate::lattice::model::{CharacterCell, Lattice};

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn store_with_ascii(text: &str) -> (LayerStore, LayerId) {
    let mut store = LayerStore::new();
    let (id, outcome) = store.create_ascii_layer(100);
    assert_eq!(outcome, ActivateOutcome::Activated);
    assert!(store.set_lattice_from_text(id, text));
    assert!(store.commit());
    (store, id)
}

fn z_indices(store: &LayerStore) -> Vec<i32> {
    store.layers().iter().map(Layer::z_index).collect()
}

fn assert_distinct(zs: &[i32]) {
    let mut sorted = zs.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), zs.len(), "duplicate z-index in {zs:?}");
}

#[test]
fn gate_is_a_pure_function_of_dirtiness_and_preference() {
    for pref in [SavePreference::Ask, SavePreference::AlwaysSave, SavePreference::NeverSave] {
        assert_eq!(gate(false, pref), GateAction::Proceed);
    }
    assert_eq!(gate(true, SavePreference::Ask), GateAction::Ask);
    assert_eq!(gate(true, SavePreference::AlwaysSave), GateAction::SaveThenProceed);
    assert_eq!(gate(true, SavePreference::NeverSave), GateAction::DiscardThenProceed);
}

#[test]
fn save_preference_uses_kebab_case_names() {
    assert_eq!(
        serde_json::to_string(&SavePreference::AlwaysSave).unwrap(),
        "\"always-save\""
    );
    let p: SavePreference = serde_json::from_str("\"never-save\"").unwrap();
    assert_eq!(p, SavePreference::NeverSave);
}

#[test]
fn created_layers_get_defaults_and_become_active() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(80);
    let (b, _) = store.create_image_layer();
    let (c, _) = store.create_html_layer();

    assert_eq!((a, b, c), (1, 2, 3));
    assert_eq!(store.active_id(), Some(c));
    assert_eq!(z_indices(&store), vec![2, 3, 4]);

    let names: Vec<_> = store.layers().iter().map(|l| l.common().name.clone()).collect();
    assert_eq!(names, ["ASCII Layer 1", "Image Layer 2", "HTML Layer 3"]);

    let parallax: Vec<_> = store
        .layers()
        .iter()
        .map(|l| l.common().parallax_strength)
        .collect();
    assert!((parallax[0] - 0.3).abs() < 1e-9);
    assert!((parallax[2] - 0.5).abs() < 1e-9);

    let Layer::Ascii(ascii) = &store.layers()[0] else {
        panic!("expected ascii layer");
    };
    assert_eq!(ascii.resolution, 80);
    assert!(ascii.lattice.is_empty());
}

#[test]
fn z_index_stays_unique_after_delete_then_create() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(100);
    store.create_ascii_layer(100);
    store.create_ascii_layer(100);
    assert!(matches!(store.delete(a, false), DeleteOutcome::Deleted { .. }));
    store.create_image_layer();
    assert_distinct(&z_indices(&store));
}

#[test]
fn draft_mutation_leaves_canonical_untouched_until_commit() {
    let (mut store, id) = store_with_ascii("ab\ncd");
    let before = store.layers()[0].clone();

    assert!(store.set_offset(10.0, -4.0));
    assert!(store.erase_cell(id, 0, 0));
    assert!(store.is_dirty());
    assert_eq!(store.layers()[0], before);
    assert_ne!(store.effective(id), Some(&before));

    assert!(store.discard());
    assert!(!store.is_dirty());
    assert_eq!(store.draft(), Some(&before));
    assert_eq!(store.effective(id), Some(&before));

    store.set_scale(2.0);
    assert!(store.commit());
    assert!(matches!(store.draft_state(), DraftState::ActiveClean(_)));
    assert_eq!(store.layers()[0].common().scale, 2.0);
}

#[test]
fn mutation_back_to_canonical_values_is_clean() {
    let (mut store, _) = store_with_ascii("x");
    store.set_scale(3.0);
    assert!(store.is_dirty());
    store.set_scale(1.0);
    assert!(!store.is_dirty());
}

#[test]
fn mutation_without_draft_is_noop() {
    let mut store = LayerStore::new();
    assert!(!store.mutate(|l| l.common_mut().scale = 9.0));
    assert!(!store.commit());
    assert!(!store.discard());
    assert!(!store.set_offset(1.0, 1.0));
}

#[test]
fn draft_cannot_change_its_id() {
    let (mut store, id) = store_with_ascii("x");
    store.mutate(|l| l.common_mut().id = 999);
    assert_eq!(store.active_id(), Some(id));
}

#[test]
fn draft_cannot_change_its_z_index() {
    let mut store = LayerStore::new();
    store.create_ascii_layer(100);
    store.create_ascii_layer(100);
    let bottom = store.layers()[0].z_index();

    store.mutate(|l| {
        l.common_mut().z_index = bottom;
        l.common_mut().name = "renamed".to_string();
    });
    assert!(store.commit());
    assert_eq!(store.layers()[1].common().name, "renamed");
    assert_eq!(z_indices(&store), vec![2, 3]);
}

#[test]
fn pushed_layer_lands_on_top_with_fresh_id() {
    let mut store = LayerStore::new();
    store.create_ascii_layer(100);
    let copy = store.layers()[0].clone();

    let id = store.push_layer(copy);
    assert_eq!(id, 2);
    assert_eq!(z_indices(&store), vec![2, 3]);

    assert!(store.move_down(id));
    assert_eq!(z_indices(&store), vec![2, 3]);
    assert_eq!(store.layers()[0].id(), id);
    assert_distinct(&z_indices(&store));
}

#[test]
fn erase_yields_canonical_empty_cell() {
    let (mut store, id) = store_with_ascii("@@\n@@");
    store.update_cell(
        id,
        1,
        1,
        &CellUpdate::colors("#ff00ff", "#00ff00", 0.4),
    );
    for (x, y) in [(0, 0), (1, 1)] {
        assert!(store.erase_cell(id, x, y));
        let Some(Layer::Ascii(a)) = store.effective(id) else {
            panic!("expected ascii layer");
        };
        assert_eq!(a.lattice.get(x as usize, y as usize), Some(&CharacterCell::empty()));
    }
}

#[test]
fn out_of_bounds_cell_updates_are_ignored() {
    let (mut store, id) = store_with_ascii("ab");
    assert!(!store.erase_cell(id, -1, 0));
    assert!(!store.erase_cell(id, 2, 0));
    assert!(!store.erase_cell(id, 0, 1));
    assert!(!store.is_dirty());
}

#[test]
fn editors_ignore_inactive_or_wrong_kind_layers() {
    let mut store = LayerStore::new();
    let (ascii, _) = store.create_ascii_layer(100);
    let (image, _) = store.create_image_layer();
    assert_eq!(store.active_id(), Some(image));

    assert!(!store.set_lattice_from_text(ascii, "zzz"));
    assert!(!store.set_html_content(image, "<p>x</p>"));
    assert!(store.set_image_data(image, "data:image/png;base64,AAAA"));
    assert!(store.is_dirty());
}

#[test]
fn switching_with_dirty_draft_honors_preference() {
    let mut store = LayerStore::new().with_save_preference(SavePreference::AlwaysSave);
    let (a, _) = store.create_ascii_layer(100);
    let (b, _) = store.create_ascii_layer(100);
    store.activate(a);
    store.set_scale(2.0);
    assert_eq!(store.activate(b), ActivateOutcome::Activated);
    assert_eq!(store.effective(a).unwrap().common().scale, 2.0);

    store.set_save_preference(SavePreference::NeverSave);
    store.set_scale(4.0);
    assert_eq!(store.activate(a), ActivateOutcome::Activated);
    assert_eq!(store.effective(b).unwrap().common().scale, 1.0);
}

#[test]
fn ask_preference_suspends_switch_until_resolved() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(100);
    let (b, _) = store.create_ascii_layer(100);
    store.set_scale(2.0);

    assert_eq!(store.activate(a), ActivateOutcome::NeedsDecision { from: b, to: a });
    assert_eq!(store.active_id(), Some(b));
    assert_eq!(store.pending(), Some(a));

    store.cancel_pending();
    assert_eq!(store.pending(), None);
    assert!(store.is_dirty());

    store.activate(a);
    assert_eq!(store.resolve_pending(true), Some(ActivateOutcome::Activated));
    assert_eq!(store.active_id(), Some(a));
    assert_eq!(store.effective(b).unwrap().common().scale, 2.0);

    store.set_scale(5.0);
    store.activate(b);
    assert_eq!(store.resolve_pending(false), Some(ActivateOutcome::Activated));
    assert_eq!(store.effective(a).unwrap().common().scale, 1.0);
    assert_eq!(store.resolve_pending(true), None);
}

#[test]
fn creation_passes_through_the_save_gate() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(100);
    store.set_scale(2.0);
    let (b, outcome) = store.create_html_layer();
    assert_eq!(outcome, ActivateOutcome::NeedsDecision { from: a, to: b });
    assert_eq!(store.layers().len(), 2);
    assert_eq!(store.resolve_pending(true), Some(ActivateOutcome::Activated));
    assert_eq!(store.active_id(), Some(b));
}

#[test]
fn activate_unknown_id_is_not_found() {
    let mut store = LayerStore::new();
    assert_eq!(store.activate(42), ActivateOutcome::NotFound);
}

#[test]
fn deleting_dirty_active_layer_requires_confirmation() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(100);
    let (b, _) = store.create_ascii_layer(100);
    store.set_scale(3.0);

    assert_eq!(store.delete(b, false), DeleteOutcome::ConfirmationRequired);
    assert_eq!(store.layers().len(), 2);
    assert_eq!(store.delete(b, true), DeleteOutcome::Deleted { active: Some(a) });
    assert_eq!(store.active_id(), Some(a));
    assert!(!store.is_dirty());

    assert_eq!(store.delete(a, false), DeleteOutcome::Deleted { active: None });
    assert!(matches!(store.draft_state(), DraftState::Inactive));
    assert_eq!(store.delete(a, true), DeleteOutcome::NotFound);
}

#[test]
fn deleting_inactive_layer_keeps_current_draft() {
    let mut store = LayerStore::new();
    let (a, _) = store.create_ascii_layer(100);
    let (b, _) = store.create_ascii_layer(100);
    store.set_scale(2.0);
    assert_eq!(store.delete(a, false), DeleteOutcome::Deleted { active: Some(b) });
    assert!(store.is_dirty());
}

#[test]
fn moves_and_reorders_keep_z_indices_distinct() {
    let mut store = LayerStore::new();
    let ids: Vec<_> = (0..4).map(|_| store.create_ascii_layer(100).0).collect();

    assert!(store.move_up(ids[0]));
    assert_distinct(&z_indices(&store));
    assert_eq!(store.layers()[1].id(), ids[0]);
    assert_eq!(store.layers()[1].z_index(), 3);

    assert!(!store.move_up(ids[3]));
    assert!(store.move_down(ids[3]));
    assert!(!store.move_down(store.layers()[0].id()));
    assert_distinct(&z_indices(&store));

    assert!(store.reorder(0, 3));
    assert_eq!(z_indices(&store), vec![2, 3, 4, 5]);
    assert!(!store.reorder(1, 1));
    assert!(!store.reorder(0, 9));
}

#[test]
fn reorder_syncs_active_draft_z_index() {
    let mut store = LayerStore::new();
    store.create_ascii_layer(100);
    let (b, _) = store.create_ascii_layer(100);
    assert_eq!(store.active_id(), Some(b));

    store.move_down(b);
    assert!(!store.is_dirty());
    assert_eq!(store.draft().unwrap().z_index(), 2);

    store.set_scale(2.0);
    store.commit();
    assert_distinct(&z_indices(&store));
}

#[test]
fn toggle_visibility_updates_canonical_and_draft() {
    let (mut store, id) = store_with_ascii("x");
    assert_eq!(store.toggle_visibility(id), Some(false));
    assert!(!store.layers()[0].common().visibility);
    assert!(!store.effective(id).unwrap().common().visibility);
    assert!(!store.is_dirty());
    assert_eq!(store.toggle_visibility(77), None);
}

#[test]
fn lattice_from_image_keeps_source_for_reconversion() {
    let mut store = LayerStore::new();
    let (id, _) = store.create_ascii_layer(100);
    let png = png_bytes(8, 8, [0, 0, 0, 255]);

    assert!(store.set_lattice_from_image(id, &png, Some(4)).unwrap());
    let Some(Layer::Ascii(a)) = store.draft() else {
        panic!("expected ascii draft");
    };
    assert_eq!((a.lattice.width, a.lattice.height), (4, 2));
    assert_eq!(a.lattice.get(0, 0).unwrap().ch, '█');
    assert!(a.original_image.as_deref().unwrap().starts_with("data:image/png;base64,"));

    assert!(store.set_lattice_resolution(id, 10).unwrap());
    let Some(Layer::Ascii(a)) = store.draft() else {
        panic!("expected ascii draft");
    };
    assert_eq!(a.resolution, 10);
    assert_eq!((a.lattice.width, a.lattice.height), (10, 5));

    assert!(store.set_lattice_from_text(id, "hi"));
    assert!(!store.set_lattice_resolution(id, 20).unwrap());
}

#[test]
fn undecodable_image_leaves_lattice_untouched() {
    let (mut store, id) = store_with_ascii("keep");
    let err = store.set_lattice_from_image(id, b"not an image", None).unwrap_err();
    assert!(matches!(err, GlyphstackError::ImageDecode(_)));
    let Some(Layer::Ascii(a)) = store.draft() else {
        panic!("expected ascii draft");
    };
    assert_eq!(crate::lattice::codec::to_plain_text(&a.lattice), "keep");
    assert!(!store.is_dirty());
}

#[test]
fn apply_color_skips_space_cells() {
    let (mut store, id) = store_with_ascii("a b");
    assert!(store.apply_color_to_all_cells(id, "#123456", None, Some(0.5)));
    let Some(Layer::Ascii(a)) = store.draft() else {
        panic!("expected ascii draft");
    };
    let row = &a.lattice.cells[0];
    assert_eq!(row[0].text_color, "#123456");
    assert_eq!(row[0].alpha, 0.5);
    assert_eq!(row[1], CharacterCell::plain(' '));
    assert_eq!(row[2].text_color, "#123456");
}

#[test]
fn tint_applies_to_ascii_and_image_only() {
    let mut store = LayerStore::new();
    store.create_html_layer();
    assert!(!store.set_tint_color(Some("#ff0000".to_string())));
    store.create_image_layer();
    assert!(store.set_tint_color(Some("#ff0000".to_string())));
    assert_eq!(store.draft().unwrap().tint_color(), Some("#ff0000"));
}

#[test]
fn load_layers_resets_ids_and_rejects_duplicates() {
    let mut store = LayerStore::new();
    store.create_ascii_layer(100);

    let mut a = Layer::new_ascii(LayerCommon::new(5, "five", 2, 0.3), 100);
    if let Some(ascii) = a.as_ascii_mut() {
        ascii.lattice = Lattice::filled(1, 1, CharacterCell::plain('x'));
    }
    let b = Layer::new_html(LayerCommon::new(9, "nine", 3, 0.4));

    let dup = vec![a.clone(), a.clone()];
    assert!(matches!(
        store.load_layers(dup),
        Err(GlyphstackError::MalformedProject(_))
    ));
    assert_eq!(store.layers().len(), 1);
    assert_eq!(store.active_id(), Some(1));

    store.load_layers(vec![a, b]).unwrap();
    assert_eq!(store.next_id(), 10);
    assert_eq!(store.active_id(), None);
    let (id, _) = store.create_image_layer();
    assert_eq!(id, 10);
    assert_distinct(&z_indices(&store));
}
