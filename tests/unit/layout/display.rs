use super::*;

fn vp(container_width: f64, viewport_height: f64) -> Viewport {
    Viewport {
        container_width,
        viewport_height,
    }
}

#[test]
fn width_is_capped_at_max() {
    let cfg = DisplayConfig::default();
    assert_eq!(display_width_for(vp(1200.0, 2000.0), Canvas::STORY, &cfg), 430.0);
}

#[test]
fn width_follows_container_when_narrow() {
    let cfg = DisplayConfig::default();
    assert_eq!(display_width_for(vp(360.5, 2000.0), Canvas::STORY, &cfg), 360.0);
}

#[test]
fn width_follows_available_height() {
    let cfg = DisplayConfig::default();
    // (830 - 230) * 9/16 = 337.5
    assert_eq!(display_width_for(vp(1000.0, 830.0), Canvas::STORY, &cfg), 337.0);
}

#[test]
fn width_never_drops_below_floor() {
    let cfg = DisplayConfig::default();
    assert_eq!(display_width_for(vp(120.0, 2000.0), Canvas::STORY, &cfg), 200.0);
    assert_eq!(display_width_for(vp(1000.0, 100.0), Canvas::STORY, &cfg), 200.0);
}

#[test]
fn mapping_ratio_tracks_display_width() {
    let mut m = DisplayMapping::new(Canvas::STORY, 300.0);
    assert!((m.display_to_output_ratio() - 3.6).abs() < 1e-12);
    assert!((m.display_height() - 300.0 * 16.0 / 9.0).abs() < 1e-9);

    assert!(m.set_display_width(432.0));
    assert!((m.display_to_output_ratio() - 2.5).abs() < 1e-12);

    assert!(!m.set_display_width(0.0));
    assert!(!m.set_display_width(f64::INFINITY));
    assert_eq!(m.display_width(), 432.0);
}
