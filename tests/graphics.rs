//! Integration tests driving the full subsystem through the headless backend.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::Rc;

use glam::{UVec2, Vec2};
use graphics2d::{
    Color, DrawState, EmitterConfig, Graphics, GraphicsConfig, ParticleEmitter, ScreenResolution,
    Sprite, TexFlip,
};

fn headless(width: u32, height: u32) -> Graphics {
    Graphics::headless(GraphicsConfig {
        resolution: ScreenResolution { width, height },
        vsync: false,
        ..Default::default()
    })
}

/// Write a small PNG under the temp dir and return its path.
fn test_png(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("graphics2d-test-{name}.png"));
    if !path.exists() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 255, 255]));
        img.save(&path).expect("failed to write test image");
    }
    path
}

#[test]
fn culled_draw_never_reaches_backend() {
    let mut graphics = headless(1600, 900);
    graphics.begin_frame();

    graphics.draw_filled_box(
        Vec2::new(1000.0, 1000.0),
        Vec2::splat(0.5),
        Vec2::new(32.0, 32.0),
        Color::RED,
    );
    assert_eq!(graphics.draw_calls(), 0);

    graphics.draw_filled_box(Vec2::ZERO, Vec2::splat(0.5), Vec2::new(32.0, 32.0), Color::RED);
    assert_eq!(graphics.draw_calls(), 1);

    // A box at the camera position with a centered pivot lands on the
    // viewport center.
    let recorded = graphics.backend().as_headless().unwrap().recorded();
    match &recorded[0] {
        graphics2d::backend::RecordedDraw::FillRect(rect) => {
            assert_eq!(rect.center(), Vec2::new(800.0, 450.0));
        }
        other => panic!("expected a filled rect, got {other:?}"),
    }

    graphics.end_frame();
}

#[test]
fn draw_outside_frame_is_skipped() {
    let mut graphics = headless(640, 360);
    graphics.draw_filled_box(Vec2::ZERO, Vec2::splat(0.5), Vec2::new(8.0, 8.0), Color::WHITE);
    assert_eq!(graphics.draw_calls(), 0);
}

#[test]
fn line_culls_only_when_both_endpoints_are_out() {
    let mut graphics = headless(1600, 900);
    graphics.begin_frame();

    graphics.draw_line(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Color::GREEN);
    assert_eq!(graphics.draw_calls(), 1);

    // One visible endpoint keeps the line.
    graphics.draw_line(Vec2::ZERO, Vec2::new(500.0, 500.0), Color::GREEN);
    assert_eq!(graphics.draw_calls(), 2);

    graphics.draw_line(
        Vec2::new(500.0, 500.0),
        Vec2::new(600.0, 600.0),
        Color::GREEN,
    );
    assert_eq!(graphics.draw_calls(), 2);

    graphics.end_frame();
}

#[test]
fn loaded_texture_remembers_its_path() {
    let mut graphics = headless(640, 360);
    let path = test_png("lookup");
    let id = graphics.load_texture(&path).expect("decode failed");
    let texture = graphics.texture_by_id(id).expect("id should resolve");
    assert_eq!(texture.path(), path);
    assert_eq!((texture.width(), texture.height()), (4, 4));
}

#[test]
fn missing_file_returns_sentinel() {
    let mut graphics = headless(640, 360);
    assert!(graphics
        .load_texture(std::path::Path::new("definitely-not-here.png"))
        .is_none());
}

#[test]
fn unload_keeps_other_ids_stable() {
    let mut graphics = headless(640, 360);
    let a = graphics.load_texture(&test_png("stable-a")).unwrap();
    let b = graphics.load_texture(&test_png("stable-b")).unwrap();
    let c = graphics.load_texture(&test_png("stable-c")).unwrap();

    assert!(graphics.unload_texture(b));
    assert!(graphics.texture_by_id(b).is_none());
    assert_eq!(
        graphics.texture_by_id(a).unwrap().path(),
        test_png("stable-a")
    );
    assert_eq!(
        graphics.texture_by_id(c).unwrap().path(),
        test_png("stable-c")
    );
    assert_eq!(graphics.texture_count(), 2);
}

#[test]
fn fullscreen_toggle_preserves_paths_not_ids() {
    let mut graphics = headless(1280, 720);
    let a = graphics.load_texture(&test_png("reload-a")).unwrap();
    let b = graphics.load_texture(&test_png("reload-b")).unwrap();

    let paths_before: BTreeSet<PathBuf> = [test_png("reload-a"), test_png("reload-b")]
        .into_iter()
        .collect();

    graphics.set_fullscreen(true);
    assert!(graphics.is_running());
    assert!(graphics.fullscreen());

    // Old ids died with the reset; the path set survived under fresh ids.
    assert!(graphics.texture_by_id(a).is_none());
    assert!(graphics.texture_by_id(b).is_none());
    assert_eq!(graphics.texture_count(), 2);

    graphics.set_fullscreen(false);
    assert!(!graphics.fullscreen());
    assert_eq!(
        graphics.current_resolution(),
        ScreenResolution {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(graphics.current_window_size(), (1280, 720));

    let paths_after: BTreeSet<PathBuf> = graphics
        .textures()
        .iter()
        .map(|t| t.path().to_path_buf())
        .collect();
    assert_eq!(paths_after, paths_before);
}

#[test]
fn reload_callback_fires_once_per_reset() {
    let mut graphics = headless(800, 600);
    let count = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&count);
    graphics.set_on_render_reload(move |_graphics| {
        seen.set(seen.get() + 1);
    });

    graphics.set_fullscreen(true);
    graphics.set_fullscreen(false);
    assert_eq!(count.get(), 2);
}

#[test]
fn sprite_draw_restores_backend_state() {
    let mut graphics = headless(640, 360);
    let id = graphics.load_texture(&test_png("sprite")).unwrap();
    let sprite = Sprite::from_grid(id, UVec2::new(2, 2), 15, 2);

    graphics.begin_frame();
    graphics.draw_sprite(
        &sprite,
        Vec2::ZERO,
        Vec2::splat(0.5),
        Vec2::new(16.0, 16.0),
        0.0,
        TexFlip::None,
        Color::WHITE,
    );
    graphics.end_frame();

    assert_eq!(graphics.draw_calls(), 1);
    // The texture binding and tint set for the sprite never leak out.
    assert_eq!(graphics.backend().draw_state(), DrawState::default());
}

#[test]
fn sprite_with_dead_texture_is_skipped() {
    let mut graphics = headless(640, 360);
    let id = graphics.load_texture(&test_png("dead")).unwrap();
    let sprite = Sprite::from_grid(id, UVec2::new(2, 2), 15, 2);
    graphics.unload_texture(id);

    graphics.begin_frame();
    graphics.draw_sprite(
        &sprite,
        Vec2::ZERO,
        Vec2::splat(0.5),
        Vec2::new(16.0, 16.0),
        0.0,
        TexFlip::None,
        Color::WHITE,
    );
    graphics.end_frame();
    assert_eq!(graphics.draw_calls(), 0);
}

#[test]
fn sprite_rebinds_to_fresh_id_after_reset() {
    let mut graphics = headless(640, 360);
    let id = graphics.load_texture(&test_png("rebind")).unwrap();
    let mut sprite = Sprite::from_grid(id, UVec2::new(2, 2), 15, 2);

    graphics.set_fullscreen(true);

    // The pre-reset id is dead, so the sprite draws nothing.
    graphics.begin_frame();
    graphics.draw_sprite(
        &sprite,
        Vec2::ZERO,
        Vec2::splat(0.5),
        Vec2::new(16.0, 16.0),
        0.0,
        TexFlip::None,
        Color::WHITE,
    );
    assert_eq!(graphics.draw_calls(), 0);

    let fresh = graphics.textures().iter().next().unwrap().id().unwrap();
    assert_ne!(fresh, id);
    sprite.rebind_texture(fresh);
    graphics.draw_sprite(
        &sprite,
        Vec2::ZERO,
        Vec2::splat(0.5),
        Vec2::new(16.0, 16.0),
        0.0,
        TexFlip::None,
        Color::WHITE,
    );
    assert_eq!(graphics.draw_calls(), 1);
    graphics.end_frame();
}

#[test]
fn render_target_resolves_on_end_frame() {
    let mut graphics = headless(640, 360);
    graphics.enable_render_target(true);
    assert!(graphics.render_target_active());

    graphics.begin_frame();
    graphics.draw_filled_box(Vec2::ZERO, Vec2::splat(0.5), Vec2::new(8.0, 8.0), Color::BLUE);
    graphics.end_frame();

    assert!(!graphics.render_target_active());
    assert_eq!(graphics.draw_calls(), 1);
}

#[test]
fn emitter_draws_camera_relative() {
    let mut graphics = headless(1600, 900);
    let mut emitter = ParticleEmitter::new(
        Vec2::ZERO,
        EmitterConfig {
            spawn_rate: 10.0,
            gravity: Vec2::ZERO,
            ..Default::default()
        },
    );
    emitter.update(0.5);
    assert_eq!(emitter.particle_count(), 5);

    graphics.begin_frame();
    emitter.render(&mut graphics);
    assert_eq!(graphics.draw_calls(), 5);

    // An emitter far outside the view is fully culled.
    let mut far = ParticleEmitter::new(
        Vec2::new(1000.0, 1000.0),
        EmitterConfig {
            spawn_rate: 10.0,
            gravity: Vec2::ZERO,
            speed: (0.0, 0.1),
            ..Default::default()
        },
    );
    far.update(0.5);
    far.render(&mut graphics);
    assert_eq!(graphics.draw_calls(), 5);

    graphics.end_frame();
}
