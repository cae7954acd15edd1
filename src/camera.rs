//! Camera state and the world-to-screen projection
//!
//! World coordinates are expressed in abstract units where [`WORLD_SPAN`]
//! units map across one full screen dimension. Every draw call goes through
//! [`project`], which yields both the screen rectangle and the visibility
//! verdict of the cheap distance cull.

use glam::Vec2;

use crate::backend::types::ScreenRect;

/// Number of world units spanning one screen dimension. Fixed by design,
/// not configurable per call.
pub const WORLD_SPAN: f32 = 16.0;

/// World-space camera. No rotation or zoom in the base model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub position: Vec2,
}

impl Camera {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

/// Result of projecting a world rectangle to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub rect: ScreenRect,
    pub visible: bool,
}

/// Convert a world position to absolute pixel coordinates for the given
/// viewport, ignoring the camera.
pub fn world_to_pixels(pos: Vec2, viewport: (u32, u32)) -> Vec2 {
    let (w, h) = (viewport.0 as f32, viewport.1 as f32);
    Vec2::new(pos.x / WORLD_SPAN * w, pos.y / WORLD_SPAN * h)
}

/// Project a world position with a pivot in `[0, 1]²` and a pixel size into
/// a camera-relative screen rectangle.
///
/// The visibility check is an axis-aligned distance approximation: the draw
/// is rejected when the pixel distance between the position and the camera
/// exceeds half the viewport plus the rectangle extent on either axis. It
/// deliberately trades exact rectangle intersection for one cheap branch.
pub fn project(
    camera: &Camera,
    pos: Vec2,
    pivot: Vec2,
    size: Vec2,
    viewport: (u32, u32),
) -> Projected {
    let (w, h) = (viewport.0 as f32, viewport.1 as f32);
    let pixel = world_to_pixels(pos, viewport);
    let cam_pixel = world_to_pixels(camera.position, viewport);

    let rect = ScreenRect::new(
        pixel.x - size.x * pivot.x - cam_pixel.x + w / 2.0,
        pixel.y - size.y * pivot.y - cam_pixel.y + h / 2.0,
        size.x,
        size.y,
    );

    let dist = (pixel - cam_pixel).abs();
    let visible = dist.x <= w / 2.0 + size.x && dist.y <= h / 2.0 + size.y;

    Projected { rect, visible }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (u32, u32) = (1600, 900);

    #[test]
    fn camera_position_projects_to_viewport_center() {
        for size in [Vec2::ZERO, Vec2::new(32.0, 32.0), Vec2::new(700.0, 5.0)] {
            let camera = Camera::new(Vec2::new(3.5, -2.0));
            let projected = project(
                &camera,
                camera.position,
                Vec2::new(0.5, 0.5),
                size,
                VIEWPORT,
            );
            assert_eq!(projected.rect.center(), Vec2::new(800.0, 450.0));
            assert!(projected.visible);
        }
    }

    #[test]
    fn world_to_pixels_scales_by_span() {
        let p = world_to_pixels(Vec2::new(8.0, 4.0), VIEWPORT);
        assert_eq!(p, Vec2::new(800.0, 225.0));
    }

    #[test]
    fn distant_position_is_culled() {
        let camera = Camera::default();
        let projected = project(
            &camera,
            Vec2::new(1000.0, 1000.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(32.0, 32.0),
            VIEWPORT,
        );
        assert!(!projected.visible);
    }

    #[test]
    fn cull_threshold_includes_size_margin() {
        let camera = Camera::default();
        let size = Vec2::new(50.0, 50.0);
        // 8.5 world units -> 850 px from the camera on x, just inside
        // the 800 + 50 margin.
        let inside = project(&camera, Vec2::new(8.5, 0.0), Vec2::ZERO, size, VIEWPORT);
        assert!(inside.visible);
        let outside = project(&camera, Vec2::new(8.6, 0.0), Vec2::ZERO, size, VIEWPORT);
        assert!(!outside.visible);
    }

    #[test]
    fn rect_offsets_by_pivot() {
        let camera = Camera::default();
        let projected = project(
            &camera,
            Vec2::ZERO,
            Vec2::new(0.0, 1.0),
            Vec2::new(100.0, 40.0),
            VIEWPORT,
        );
        assert_eq!(projected.rect.x, 800.0);
        assert_eq!(projected.rect.y, 410.0);
    }
}
