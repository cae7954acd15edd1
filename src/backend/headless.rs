//! Headless drawing backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but provides a valid
//! implementation of the drawing API without requiring a window or GPU
//! hardware. Every primitive that reaches it is recorded, which makes draw
//! issue rates observable from tests.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use crate::backend::traits::*;
use crate::backend::types::*;

/// One recorded primitive draw.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedDraw {
    FillRect(ScreenRect),
    StrokeRect(ScreenRect),
    Line(Vec2, Vec2),
    Point(Vec2),
    Textured {
        texture: Option<TextureHandle>,
        src: Option<FrameRect>,
        dst: ScreenRect,
    },
}

/// Headless drawing backend.
#[derive(Debug)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    textures: HashMap<u64, (u32, u32)>,
    next_texture_id: u64,
    state: DrawState,
    render_target: bool,
    draw_calls: u64,
    recorded: Vec<RecordedDraw>,
}

impl HeadlessBackend {
    /// Create a new headless backend with the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        log::debug!("HeadlessBackend: created at {}x{}", width, height);
        Self {
            width,
            height,
            textures: HashMap::new(),
            next_texture_id: 1,
            state: DrawState::default(),
            render_target: false,
            draw_calls: 0,
            recorded: Vec::new(),
        }
    }

    /// All primitives recorded since creation or the last reset.
    pub fn recorded(&self) -> &[RecordedDraw] {
        &self.recorded
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn record(&mut self, draw: RecordedDraw) {
        self.draw_calls += 1;
        self.recorded.push(draw);
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) -> BackendResult<()> {
        log::trace!("HeadlessBackend: begin frame");
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        log::trace!("HeadlessBackend: end frame");
        if self.render_target {
            self.render_target = false;
        }
        Ok(())
    }

    fn reset(
        &mut self,
        _window: Option<&Arc<winit::window::Window>>,
        _vsync: bool,
    ) -> BackendResult<()> {
        self.textures.clear();
        self.state = DrawState::default();
        self.render_target = false;
        self.draw_calls = 0;
        self.recorded.clear();
        Ok(())
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle> {
        let expected = desc.width as usize * desc.height as usize * 4;
        if pixels.len() != expected {
            return Err(BackendError::TextureCreationFailed(format!(
                "pixel buffer is {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(id, (desc.width, desc.height));
        log::trace!(
            "HeadlessBackend: creating texture {:?} ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        Ok(TextureHandle(id))
    }

    fn update_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> BackendResult<()> {
        match self.textures.get(&texture.0) {
            Some(&(w, h)) if pixels.len() == w as usize * h as usize * 4 => Ok(()),
            Some(_) => Err(BackendError::TextureCreationFailed(
                "pixel buffer does not match texture size".into(),
            )),
            None => Err(BackendError::TextureCreationFailed(
                "texture not found".into(),
            )),
        }
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        if self.state.texture == Some(texture) {
            self.state.texture = None;
        }
    }

    fn draw_state(&self) -> DrawState {
        self.state
    }

    fn apply_draw_state(&mut self, state: DrawState) {
        self.state = state;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_blend_mode(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.state.texture = texture;
    }

    fn fill_rect(&mut self, rect: ScreenRect) {
        self.record(RecordedDraw::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: ScreenRect) {
        self.record(RecordedDraw::StrokeRect(rect));
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.record(RecordedDraw::Line(from, to));
    }

    fn draw_point(&mut self, point: Vec2) {
        self.record(RecordedDraw::Point(point));
    }

    fn draw_textured(
        &mut self,
        src: Option<FrameRect>,
        dst: ScreenRect,
        _angle: f32,
        _flip: TexFlip,
    ) {
        let texture = self.state.texture;
        self.record(RecordedDraw::Textured { texture, src, dst });
    }

    fn enable_render_target(&mut self, enable: bool) -> BackendResult<()> {
        self.render_target = enable;
        Ok(())
    }

    fn render_target_active(&self) -> bool {
        self.render_target
    }

    fn draw_call_count(&self) -> u64 {
        self.draw_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor {
            label: Some("test".into()),
            width,
            height,
        }
    }

    #[test]
    fn texture_lifecycle() {
        let mut backend = HeadlessBackend::new(320, 180);
        let handle = backend
            .create_texture(&descriptor(2, 2), &[0u8; 16])
            .unwrap();
        assert_eq!(backend.texture_count(), 1);

        assert!(backend.update_texture(handle, &[255u8; 16]).is_ok());
        assert!(backend.update_texture(handle, &[255u8; 4]).is_err());

        backend.destroy_texture(handle);
        assert_eq!(backend.texture_count(), 0);
        assert!(backend.update_texture(handle, &[255u8; 16]).is_err());
    }

    #[test]
    fn create_rejects_short_pixel_buffer() {
        let mut backend = HeadlessBackend::new(320, 180);
        assert!(backend.create_texture(&descriptor(4, 4), &[0u8; 8]).is_err());
    }

    #[test]
    fn destroying_bound_texture_unbinds_it() {
        let mut backend = HeadlessBackend::new(320, 180);
        let handle = backend
            .create_texture(&descriptor(1, 1), &[0u8; 4])
            .unwrap();
        backend.bind_texture(Some(handle));
        backend.destroy_texture(handle);
        assert_eq!(backend.draw_state().texture, None);
    }

    #[test]
    fn draws_are_recorded() {
        let mut backend = HeadlessBackend::new(320, 180);
        backend.begin_frame().unwrap();
        backend.fill_rect(ScreenRect::new(0.0, 0.0, 8.0, 8.0));
        backend.draw_point(Vec2::ZERO);
        backend.end_frame().unwrap();
        assert_eq!(backend.draw_call_count(), 2);
        assert_eq!(backend.recorded().len(), 2);
    }
}
