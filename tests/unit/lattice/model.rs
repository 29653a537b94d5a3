use super::*;

#[test]
fn empty_cell_is_canonical_erased_state() {
    let cell = CharacterCell::empty();
    assert_eq!(cell.ch, ' ');
    assert_eq!(cell.text_color, "#000000");
    assert_eq!(cell.bg_color, "transparent");
    assert_eq!(cell.alpha, 0.0);
    assert!(cell.is_blank());
    assert!(!cell.has_default_style());
    assert!(CharacterCell::plain('x').has_default_style());
}

#[test]
fn cell_json_uses_original_field_names() {
    let cell = CharacterCell {
        class_name: Some("twinkle".to_string()),
        ..CharacterCell::plain('*')
    };
    let v = serde_json::to_value(&cell).unwrap();
    assert_eq!(v["char"], "*");
    assert_eq!(v["textColor"], "#000000");
    assert_eq!(v["bgColor"], "transparent");
    assert_eq!(v["className"], "twinkle");

    let plain = serde_json::to_value(CharacterCell::plain('a')).unwrap();
    assert!(plain.get("className").is_none());
}

#[test]
fn empty_char_string_reads_as_space() {
    let cell: CharacterCell = serde_json::from_str(
        r##"{"char":"","textColor":"#000000","bgColor":"transparent","alpha":1}"##,
    )
    .unwrap();
    assert_eq!(cell.ch, ' ');
}

#[test]
fn from_rows_rejects_ragged_grids() {
    let ok = Lattice::from_rows(vec![
        vec![CharacterCell::plain('a'), CharacterCell::plain('b')],
        vec![CharacterCell::plain('c'), CharacterCell::plain('d')],
    ])
    .unwrap();
    assert_eq!((ok.width, ok.height), (2, 2));
    assert!(ok.is_consistent());

    assert!(
        Lattice::from_rows(vec![
            vec![CharacterCell::plain('a')],
            vec![CharacterCell::plain('b'), CharacterCell::plain('c')],
        ])
        .is_none()
    );
}

#[test]
fn bounds_checks() {
    let l = Lattice::filled(3, 2, CharacterCell::plain('.'));
    assert!(l.contains(0, 0));
    assert!(l.contains(2, 1));
    assert!(!l.contains(3, 0));
    assert!(!l.contains(0, -1));
    assert!(l.get(2, 1).is_some());
    assert!(l.get(0, 2).is_none());
    assert!(Lattice::empty().is_empty());
}

#[test]
fn cell_update_touches_only_given_fields() {
    let mut cell = CharacterCell {
        class_name: Some("twinkle".to_string()),
        ..CharacterCell::plain('@')
    };

    CellUpdate::alpha(0.25).apply(&mut cell);
    assert_eq!(cell.ch, '@');
    assert_eq!(cell.alpha, 0.25);

    CellUpdate::colors("#ff0000", "#00ff00", 0.5).apply(&mut cell);
    assert_eq!((cell.text_color.as_str(), cell.bg_color.as_str()), ("#ff0000", "#00ff00"));
    assert_eq!(cell.ch, '@');

    CellUpdate::erase().apply(&mut cell);
    assert_eq!(
        cell,
        CharacterCell {
            class_name: Some("twinkle".to_string()),
            ..CharacterCell::empty()
        }
    );
}
