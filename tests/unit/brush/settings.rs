use super::*;

#[test]
fn radius_clamps_per_layer_kind() {
    let mut b = BrushSettings::default();
    b.set_radius(0, LayerKind::Ascii);
    assert_eq!(b.radius, 1);
    b.set_radius(25, LayerKind::Ascii);
    assert_eq!(b.radius, 10);
    b.set_radius(25, LayerKind::Image);
    assert_eq!(b.radius, 25);
    b.set_radius(500, LayerKind::Image);
    assert_eq!(b.radius, 50);
}

#[test]
fn alpha_setter_clamps_to_unit_range() {
    let mut b = BrushSettings::default();
    b.set_alpha(1.5);
    assert_eq!(b.current_alpha, 1.0);
    b.set_alpha(-0.2);
    assert_eq!(b.current_alpha, 0.0);
    b.set_alpha(f64::NAN);
    assert_eq!(b.current_alpha, 0.0);
}

#[test]
fn tool_names_are_kebab_case() {
    assert_eq!(serde_json::to_string(&Tool::PaintAlpha).unwrap(), "\"paint-alpha\"");
    let t: Tool = serde_json::from_str("\"color-picker\"").unwrap();
    assert_eq!(t, Tool::ColorPicker);
    assert!(Tool::Erase.is_stroke());
    assert!(!Tool::Move.is_stroke());
}

#[test]
fn tool_config_validates_ranges() {
    let cfg: ToolConfig = serde_json::from_str(
        r##"{"activeTool":"paint-color","radius":30,"currentTextColor":"#ff0000",
            "currentBgColor":"transparent","currentAlpha":0.5}"##,
    )
    .unwrap();

    let (tool, brush) = cfg.validate(LayerKind::Image).unwrap();
    assert_eq!(tool, Tool::PaintColor);
    assert_eq!(brush.radius, 30);
    assert_eq!(brush.current_text_color, "#ff0000");

    let err = cfg.validate(LayerKind::Ascii).unwrap_err();
    assert!(err.to_string().contains("radius"));

    let bad_alpha = ToolConfig {
        current_alpha: 2.0,
        radius: 1,
        ..cfg
    };
    assert!(bad_alpha.validate(LayerKind::Ascii).is_err());
}
