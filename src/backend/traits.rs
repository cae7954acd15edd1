//! Core backend abstraction traits
//!
//! These traits define the interface that every drawing backend must
//! implement: texture lifecycle, frame bracketing, stateful draw registers,
//! the 2D primitives, and a full device reset.

use crate::backend::types::*;
use glam::Vec2;
use std::sync::Arc;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Failed to present: {0}")]
    PresentFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Render target unavailable: {0}")]
    RenderTargetUnavailable(String),
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Snapshot of the mutable draw registers.
///
/// Captured on entry to a primitive draw and re-applied when the scope ends,
/// so one primitive's register changes never leak into the next draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub color: Color,
    pub blend: BlendMode,
    pub texture: Option<TextureHandle>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            blend: BlendMode::Alpha,
            texture: None,
        }
    }
}

/// Main drawing backend trait
pub trait RenderBackend: Sized {
    /// Resize the swapchain. Recreates the backing offscreen target when one
    /// is active, restoring the default target first.
    fn resize(&mut self, width: u32, height: u32);

    /// Get the actual surface size (may be clamped by device limits)
    fn surface_size(&self) -> (u32, u32);

    /// Begin a new frame, clearing the active target
    fn begin_frame(&mut self) -> BackendResult<()>;

    /// End the frame: present it, or in render-to-texture mode release the
    /// temporary target and restore the default one
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Tear down and recreate the device against the given window. All
    /// texture handles issued before the reset are invalid afterwards.
    fn reset(
        &mut self,
        window: Option<&Arc<winit::window::Window>>,
        vsync: bool,
    ) -> BackendResult<()>;

    // Resource lifecycle

    /// Create a texture from tightly packed RGBA8 pixels
    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle>;

    /// Replace the full contents of an existing texture
    fn update_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> BackendResult<()>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    // Draw registers

    /// Snapshot the current draw registers
    fn draw_state(&self) -> DrawState;

    /// Restore a previously captured register snapshot
    fn apply_draw_state(&mut self, state: DrawState);

    /// Set the color used by shape draws and as the texture tint
    fn set_draw_color(&mut self, color: Color);

    /// Set the blend mode for subsequent draws
    fn set_blend_mode(&mut self, blend: BlendMode);

    /// Bind the texture sampled by [`RenderBackend::draw_textured`]
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    // Primitives (screen-space coordinates, origin top-left)

    /// Fill a rectangle with the draw color
    fn fill_rect(&mut self, rect: ScreenRect);

    /// Outline a rectangle with the draw color
    fn stroke_rect(&mut self, rect: ScreenRect);

    /// Draw a one-pixel line between two points
    fn draw_line(&mut self, from: Vec2, to: Vec2);

    /// Draw a single point
    fn draw_point(&mut self, point: Vec2);

    /// Copy the bound texture (optionally a sub-rectangle of it) into `dst`,
    /// rotated around the rectangle center by `angle` degrees
    fn draw_textured(
        &mut self,
        src: Option<FrameRect>,
        dst: ScreenRect,
        angle: f32,
        flip: TexFlip,
    );

    // Render target

    /// Redirect subsequent draws to an offscreen target, or back to the
    /// default one
    fn enable_render_target(&mut self, enable: bool) -> BackendResult<()>;

    /// Whether an offscreen target is currently bound
    fn render_target_active(&self) -> bool;

    /// Number of primitive draw calls issued since creation or last reset
    fn draw_call_count(&self) -> u64;
}
