//! Public-surface checks that need no display or input hardware.

use plinth::{Config, PhysicalWindowBounds, PointerButton, PointerState};

#[test]
fn pointer_state_clamps_through_the_public_api() {
    let mut pointer = PointerState::new(640, 480);
    assert_eq!(pointer.apply_delta(1000.0, 1000.0), (639.0, 479.0));
    assert_eq!(pointer.set_position(-5.0, 10.0), (0.0, 10.0));
}

#[test]
fn button_map_is_exported() {
    assert_eq!(
        plinth::input::map_pointer_button(plinth::input::BTN_MIDDLE),
        Some(PointerButton::Middle)
    );
    assert_eq!(plinth::input::map_pointer_button(0x117), None);
}

#[test]
fn bounds_are_value_types() {
    let a = PhysicalWindowBounds {
        width: 1920,
        height: 1080,
    };
    assert_eq!(a, a);
}

#[test]
fn config_parses_from_toml() {
    let config: Config = toml::from_str(
        r#"
        [window]
        show_cursor = false

        [diagnostics]
        frame_meter = true
        "#,
    )
    .unwrap();
    assert!(!config.window.show_cursor);
    assert!(config.diagnostics.frame_meter);
}
