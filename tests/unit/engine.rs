use super::*;
use crate::foundation::core::{Point, Vec2};

const W: u32 = 54;
const H: u32 = 96;

fn small_config() -> EngineConfig {
    EngineConfig {
        canvas: Canvas::new(W, H).unwrap(),
        ..EngineConfig::default()
    }
}

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> AssetSource {
    AssetSource::from_bytes(png_bytes(&image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba(rgba),
    )))
}

/// White frame with a black (keyable) window over the right half.
fn window_frame() -> AssetSource {
    let mut img = image::RgbaImage::from_pixel(W, H, image::Rgba([255, 255, 255, 255]));
    for y in 0..H {
        for x in W / 2..W {
            img.put_pixel(x, y, image::Rgba([0, 0, 0, 255]));
        }
    }
    AssetSource::from_bytes(png_bytes(&img))
}

fn with_photo(width: u32, height: u32) -> FrameEngine {
    let mut e = FrameEngine::new(small_config()).unwrap();
    e.set_user_photo(Some(solid_png(width, height, [200, 10, 10, 255])));
    e.wait_for_loads();
    e
}

fn decoded_px(png: &[u8], x: u32, y: u32) -> [u8; 4] {
    image::load_from_memory(png).unwrap().to_rgba8().get_pixel(x, y).0
}

#[test]
fn fresh_engine_is_idle_with_default_transform() {
    let e = FrameEngine::new(EngineConfig::default()).unwrap();
    assert_eq!(e.state(), EngineState::Idle);
    assert_eq!(e.transform(), PhotoTransform::default());
    assert_eq!(e.zoom_percent(), 100);
    assert_eq!(e.display_width(), 300.0);
    assert!(!e.is_mounted());
    assert!(!e.has_frame());
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = EngineConfig::default();
    cfg.zoom.max_factor = -1.0;
    assert!(FrameEngine::new(cfg).is_err());
}

#[test]
fn transform_ops_are_noops_without_photo() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    assert!(!e.zoom_in());
    assert!(!e.zoom_out());
    assert!(!e.fit_to_frame());
    let r = e.handle_input(&InputEvent::Wheel { delta_y: 1.0 });
    assert_eq!(r, InputResponse::default());
    let r = e.handle_input(&InputEvent::MouseDown { x: 1.0, y: 1.0 });
    assert_eq!(r, InputResponse::default());
    assert_eq!(e.gesture_mode(), GestureMode::Idle);
    assert_eq!(e.revision(), 0);
}

#[test]
fn loaded_photo_is_cover_fitted_and_centered() {
    let e = with_photo(20, 10);
    assert_eq!(e.state(), EngineState::Ready);
    assert_eq!(e.photo_size(), Some((20, 10)));

    let t = e.transform();
    // max(54 / 20, 96 / 10)
    assert_eq!(t.scale, 9.6);
    assert_eq!(t.base_scale, 9.6);
    assert!((t.offset.x - (54.0 - 192.0) / 2.0).abs() < 1e-9);
    assert!(t.offset.y.abs() < 1e-9);
    assert_eq!(e.zoom_percent(), 100);
    assert_eq!(e.revision(), 1);
}

#[test]
fn fit_restores_cover_after_zoom_and_drag() {
    let mut e = with_photo(30, 30);
    let cover = e.transform();
    assert!(e.zoom_in());
    e.handle_input(&InputEvent::MouseDown { x: 0.0, y: 0.0 });
    e.handle_input(&InputEvent::MouseMove { x: 5.0, y: 3.0 });
    assert_ne!(e.transform(), cover);

    assert!(e.fit_to_frame());
    assert_eq!(e.transform(), cover);
}

#[test]
fn clearing_photo_resets_transform_exactly() {
    let mut e = with_photo(30, 60);
    e.zoom_in();
    let before = e.revision();

    e.set_user_photo(None);
    assert_eq!(e.state(), EngineState::Idle);
    let t = e.transform();
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.offset, Vec2::ZERO);
    assert!(e.revision() > before);
}

#[test]
fn zoom_stays_within_clamp() {
    let mut e = with_photo(27, 48);
    let base = e.transform().base_scale;
    for _ in 0..50 {
        e.zoom_in();
    }
    assert!((e.transform().scale - base * 6.0).abs() < 1e-9);
    assert_eq!(e.zoom_percent(), 600);
    assert!(!e.zoom_in());

    for _ in 0..50 {
        e.zoom_out();
    }
    assert!((e.transform().scale - base * 0.3).abs() < 1e-9);
    assert_eq!(e.zoom_percent(), 30);
}

#[test]
fn button_zoom_keeps_center_pixel() {
    let mut e = with_photo(40, 25);
    let center = e.canvas().center();
    let before = e.transform().canvas_to_photo(center);
    e.zoom_in();
    e.zoom_in();
    e.zoom_out();
    let after = e.transform().canvas_to_photo(center);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn drag_deltas_scale_by_display_ratio() {
    let mut e = with_photo(30, 30);
    assert!(e.set_display_width(27.0));
    assert_eq!(e.display_to_output_ratio(), 2.0);
    let origin = e.transform().offset;

    e.handle_input(&InputEvent::MouseDown { x: 10.0, y: 10.0 });
    let r = e.handle_input(&InputEvent::MouseMove { x: 15.0, y: 7.0 });
    assert!(r.transform_changed);
    assert!(!r.prevent_default);
    assert_eq!(e.transform().offset, origin + Vec2::new(10.0, -6.0));

    e.handle_input(&InputEvent::MouseLeave);
    let r = e.handle_input(&InputEvent::MouseMove { x: 40.0, y: 40.0 });
    assert!(!r.transform_changed);
    assert_eq!(e.transform().offset, origin + Vec2::new(10.0, -6.0));
}

#[test]
fn second_contact_cancels_drag_and_pinches() {
    let mut e = with_photo(30, 30);
    let start = e.transform();

    e.handle_input(&InputEvent::TouchStart {
        touches: vec![Point::new(5.0, 5.0)],
    });
    let r = e.handle_input(&InputEvent::TouchStart {
        touches: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
    });
    assert!(r.prevent_default);
    assert!(matches!(e.gesture_mode(), GestureMode::Pinching { .. }));

    // single-contact moves no longer drag
    e.handle_input(&InputEvent::TouchMove {
        touches: vec![Point::new(50.0, 50.0)],
    });
    assert_eq!(e.transform(), start);

    e.handle_input(&InputEvent::TouchMove {
        touches: vec![Point::new(0.0, 0.0), Point::new(15.0, 0.0)],
    });
    let t = e.transform();
    assert!((t.scale - start.scale * 1.5).abs() < 1e-9);
    assert_eq!(t.offset, start.offset);

    e.handle_input(&InputEvent::TouchEnd);
    assert_eq!(e.gesture_mode(), GestureMode::Idle);
}

#[test]
fn wheel_direction_picks_factor_and_prevents_default() {
    let mut e = with_photo(30, 30);
    let base = e.transform().scale;
    let r = e.handle_input(&InputEvent::Wheel { delta_y: 120.0 });
    assert!(r.prevent_default && r.transform_changed);
    assert!((e.transform().scale - base * 0.95).abs() < 1e-9);
    e.handle_input(&InputEvent::Wheel { delta_y: -120.0 });
    assert!((e.transform().scale - base * 0.95 * 1.05).abs() < 1e-9);
}

#[test]
fn stale_photo_completions_are_discarded() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    e.set_user_photo(Some(solid_png(11, 13, [1, 2, 3, 255])));
    e.set_user_photo(Some(solid_png(17, 19, [4, 5, 6, 255])));
    e.wait_for_loads();
    assert_eq!(e.photo_size(), Some((17, 19)));
    assert_eq!(e.pending_loads(), 0);
}

#[test]
fn clearing_photo_invalidates_in_flight_load() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    e.set_user_photo(Some(solid_png(11, 13, [1, 2, 3, 255])));
    e.set_user_photo(None);
    assert_eq!(e.wait_for_loads(), 0);
    assert_eq!(e.state(), EngineState::Idle);
    assert_eq!(e.transform(), PhotoTransform::default());
}

#[test]
fn failed_photo_decode_keeps_previous_photo() {
    let mut e = with_photo(20, 20);
    let t = e.transform();
    e.set_user_photo(Some(AssetSource::from_bytes(b"not an image".to_vec())));
    assert_eq!(e.wait_for_loads(), 0);
    assert_eq!(e.photo_size(), Some((20, 20)));
    assert_eq!(e.transform(), t);
}

#[test]
fn identical_frame_source_is_not_reprocessed() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    let frame = window_frame();
    assert!(e.set_frame_source(frame.clone()));
    assert!(!e.set_frame_source(frame.clone()));
    assert_eq!(e.pending_loads(), 1);
    e.wait_for_loads();
    assert!(e.has_frame());
    assert!(e.frame_is_keyed());
    assert!(!e.set_frame_source(frame));
    assert_eq!(e.pending_loads(), 0);
}

#[test]
fn export_without_surface_is_absent() {
    let mut e = with_photo(20, 20);
    assert!(e.export_composite().unwrap().is_none());
    let handle: &mut dyn CompositeHandle = &mut e;
    assert!(!handle.is_ready());
    assert!(handle.export_image().unwrap().is_none());
}

#[test]
fn export_without_photo_is_black_png() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    e.mount_surface().unwrap();
    let out = e.export_composite().unwrap().unwrap();
    assert_eq!((out.width, out.height), (W, H));
    assert_eq!(out.mime_type(), "image/png");
    assert_eq!(decoded_px(&out.png, 0, 0), [0, 0, 0, 255]);
    assert_eq!(decoded_px(&out.png, W - 1, H - 1), [0, 0, 0, 255]);
}

#[test]
fn export_composites_photo_under_keyed_frame() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    e.mount_surface().unwrap();
    e.set_frame_source(window_frame());
    e.set_user_photo(Some(solid_png(10, 10, [200, 10, 10, 255])));
    e.wait_for_loads();
    assert!(e.is_ready());

    let t = e.transform();
    let out = e.export_composite().unwrap().unwrap();
    assert_eq!(e.transform(), t);
    assert_eq!(decoded_px(&out.png, 2, H / 2), [255, 255, 255, 255]);
    assert_eq!(decoded_px(&out.png, W - 3, H / 2), [200, 10, 10, 255]);
}

#[test]
fn auto_redraw_renders_on_mutation_when_mounted() {
    let mut e = with_photo(20, 20);
    assert_eq!(e.render_count(), 0);
    e.mount_surface().unwrap();
    let n = e.render_count();
    assert!(n >= 1);
    e.zoom_in();
    assert_eq!(e.render_count(), n + 1);
    assert!(!e.needs_redraw());
}

#[test]
fn manual_redraw_mode_defers_rendering() {
    let mut cfg = small_config();
    cfg.auto_redraw = false;
    let mut e = FrameEngine::new(cfg).unwrap();
    e.mount_surface().unwrap();
    assert_eq!(e.render_count(), 0);
    assert!(e.needs_redraw());
    assert!(e.redraw());
    assert_eq!(e.render_count(), 1);
    assert!(!e.needs_redraw());
}

#[test]
fn unmount_drops_active_gesture() {
    let mut e = with_photo(20, 20);
    e.mount_surface().unwrap();
    e.handle_input(&InputEvent::MouseDown { x: 1.0, y: 1.0 });
    assert!(matches!(e.gesture_mode(), GestureMode::Dragging { .. }));
    e.unmount_surface();
    assert_eq!(e.gesture_mode(), GestureMode::Idle);
    assert!(!e.redraw());
}

#[test]
fn resize_applies_display_sizing_rules() {
    let mut e = FrameEngine::new(EngineConfig::default()).unwrap();
    let w = e.resize(Viewport {
        container_width: 1000.0,
        viewport_height: 2000.0,
    });
    assert_eq!(w, 430.0);
    let w = e.resize(Viewport {
        container_width: 1000.0,
        viewport_height: 400.0,
    });
    assert_eq!(w, 200.0);
    assert_eq!(e.display_width(), 200.0);
}

#[test]
fn short_key_truncates_long_data_urls() {
    let long = "x".repeat(100);
    assert_eq!(short_key(&long).len(), 48);
    assert_eq!(short_key("a.png"), "a.png");
}

#[test]
fn failed_frame_source_can_be_retried() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    let bad = AssetSource::from_bytes(b"garbage".to_vec());
    assert!(e.set_frame_source(bad.clone()));
    e.wait_for_loads();
    assert!(!e.has_frame());
    assert!(e.set_frame_source(bad));
    e.wait_for_loads();
}

#[test]
fn pump_applies_finished_loads_without_blocking() {
    let mut e = FrameEngine::new(small_config()).unwrap();
    assert_eq!(e.pump(), 0);
    e.set_user_photo(Some(solid_png(6, 6, [7, 7, 7, 255])));
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while e.pending_loads() > 0 && std::time::Instant::now() < deadline {
        e.pump();
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    assert_eq!(e.photo_size(), Some((6, 6)));
}
