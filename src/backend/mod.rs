//! Drawing backend abstraction

pub mod headless;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

use std::sync::Arc;

use glam::Vec2;

use crate::BackendKind;
pub use headless::{HeadlessBackend, RecordedDraw};
pub use traits::{BackendError, BackendResult, DrawState, RenderBackend, TextureHandle};
pub use types::*;
pub use wgpu_backend::WgpuBackend;

/// Backend wrapper to abstract over the concrete implementations
pub enum Backend {
    Wgpu(WgpuBackend),
    Headless(HeadlessBackend),
}

impl Backend {
    /// Create a new backend of the configured kind
    pub fn new(
        kind: BackendKind,
        window: Option<&Arc<winit::window::Window>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> BackendResult<Self> {
        match kind {
            BackendKind::Wgpu => {
                let window = window.ok_or_else(|| {
                    BackendError::InitializationFailed("wgpu backend requires a window".into())
                })?;
                Ok(Backend::Wgpu(WgpuBackend::new(window.clone(), vsync)?))
            }
            BackendKind::Headless => Ok(Backend::Headless(HeadlessBackend::new(width, height))),
        }
    }

    /// Get the headless backend (if configured)
    pub fn as_headless(&self) -> Option<&HeadlessBackend> {
        match self {
            Backend::Headless(b) => Some(b),
            _ => None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        match self {
            Backend::Wgpu(b) => b.resize(width, height),
            Backend::Headless(b) => b.resize(width, height),
        }
    }

    pub fn surface_size(&self) -> (u32, u32) {
        match self {
            Backend::Wgpu(b) => b.surface_size(),
            Backend::Headless(b) => b.surface_size(),
        }
    }

    pub fn begin_frame(&mut self) -> BackendResult<()> {
        match self {
            Backend::Wgpu(b) => b.begin_frame(),
            Backend::Headless(b) => b.begin_frame(),
        }
    }

    pub fn end_frame(&mut self) -> BackendResult<()> {
        match self {
            Backend::Wgpu(b) => b.end_frame(),
            Backend::Headless(b) => b.end_frame(),
        }
    }

    pub fn reset(
        &mut self,
        window: Option<&Arc<winit::window::Window>>,
        vsync: bool,
    ) -> BackendResult<()> {
        match self {
            Backend::Wgpu(b) => b.reset(window, vsync),
            Backend::Headless(b) => b.reset(window, vsync),
        }
    }

    pub fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle> {
        match self {
            Backend::Wgpu(b) => b.create_texture(desc, pixels),
            Backend::Headless(b) => b.create_texture(desc, pixels),
        }
    }

    pub fn update_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> BackendResult<()> {
        match self {
            Backend::Wgpu(b) => b.update_texture(texture, pixels),
            Backend::Headless(b) => b.update_texture(texture, pixels),
        }
    }

    pub fn destroy_texture(&mut self, texture: TextureHandle) {
        match self {
            Backend::Wgpu(b) => b.destroy_texture(texture),
            Backend::Headless(b) => b.destroy_texture(texture),
        }
    }

    pub fn draw_state(&self) -> DrawState {
        match self {
            Backend::Wgpu(b) => b.draw_state(),
            Backend::Headless(b) => b.draw_state(),
        }
    }

    pub fn apply_draw_state(&mut self, state: DrawState) {
        match self {
            Backend::Wgpu(b) => b.apply_draw_state(state),
            Backend::Headless(b) => b.apply_draw_state(state),
        }
    }

    pub fn set_draw_color(&mut self, color: Color) {
        match self {
            Backend::Wgpu(b) => b.set_draw_color(color),
            Backend::Headless(b) => b.set_draw_color(color),
        }
    }

    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        match self {
            Backend::Wgpu(b) => b.set_blend_mode(blend),
            Backend::Headless(b) => b.set_blend_mode(blend),
        }
    }

    pub fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        match self {
            Backend::Wgpu(b) => b.bind_texture(texture),
            Backend::Headless(b) => b.bind_texture(texture),
        }
    }

    pub fn fill_rect(&mut self, rect: ScreenRect) {
        match self {
            Backend::Wgpu(b) => b.fill_rect(rect),
            Backend::Headless(b) => b.fill_rect(rect),
        }
    }

    pub fn stroke_rect(&mut self, rect: ScreenRect) {
        match self {
            Backend::Wgpu(b) => b.stroke_rect(rect),
            Backend::Headless(b) => b.stroke_rect(rect),
        }
    }

    pub fn draw_line(&mut self, from: Vec2, to: Vec2) {
        match self {
            Backend::Wgpu(b) => b.draw_line(from, to),
            Backend::Headless(b) => b.draw_line(from, to),
        }
    }

    pub fn draw_point(&mut self, point: Vec2) {
        match self {
            Backend::Wgpu(b) => b.draw_point(point),
            Backend::Headless(b) => b.draw_point(point),
        }
    }

    pub fn draw_textured(
        &mut self,
        src: Option<FrameRect>,
        dst: ScreenRect,
        angle: f32,
        flip: TexFlip,
    ) {
        match self {
            Backend::Wgpu(b) => b.draw_textured(src, dst, angle, flip),
            Backend::Headless(b) => b.draw_textured(src, dst, angle, flip),
        }
    }

    pub fn enable_render_target(&mut self, enable: bool) -> BackendResult<()> {
        match self {
            Backend::Wgpu(b) => b.enable_render_target(enable),
            Backend::Headless(b) => b.enable_render_target(enable),
        }
    }

    pub fn render_target_active(&self) -> bool {
        match self {
            Backend::Wgpu(b) => b.render_target_active(),
            Backend::Headless(b) => b.render_target_active(),
        }
    }

    pub fn draw_call_count(&self) -> u64 {
        match self {
            Backend::Wgpu(b) => b.draw_call_count(),
            Backend::Headless(b) => b.draw_call_count(),
        }
    }
}
