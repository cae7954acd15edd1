//! The owning graphics component
//!
//! [`Graphics`] owns the window, the drawing backend, the texture registry,
//! and the current camera, and exposes the bracketed frame API every
//! collaborator draws through. Device-altering operations (`set_fullscreen`,
//! `set_resolution`) run synchronously: the component enters the `Resetting`
//! state, rebuilds the device, replays every tracked texture from its source
//! path, notifies dependents, and returns to `Ready`. Draw calls issued while
//! `Resetting` are rejected.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use glam::Vec2;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;

use crate::backend::{Backend, BackendError, BlendMode, Color, DrawState, TexFlip};
use crate::camera::{self, Camera};
use crate::registry::{TextureId, TextureRegistry};
use crate::sprite::Sprite;
use crate::texture::Texture;
use crate::window::Window;
use crate::{fatal, BackendKind, GraphicsConfig, ScreenResolution};

type ReloadCallback = Box<dyn FnMut(&mut Graphics)>;
type EventSink = Box<dyn FnMut(&WindowEvent)>;

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceState {
    Ready,
    Resetting,
}

/// The 2D rendering subsystem
pub struct Graphics {
    config: GraphicsConfig,
    window: Option<Window>,
    backend: Backend,
    textures: TextureRegistry,
    camera: Camera,
    device_state: DeviceState,
    frame_active: bool,
    on_render_reload: Option<ReloadCallback>,
    event_sink: Option<EventSink>,
}

impl Graphics {
    /// Create the subsystem with a window on the given event loop.
    ///
    /// Window or device creation failure is unrecoverable and terminates the
    /// process after emitting a diagnostic.
    pub fn new(event_loop: &EventLoop<()>, config: GraphicsConfig) -> Self {
        let window = match Window::create(event_loop, &config) {
            Ok(window) => window,
            Err(err) => fatal(&format!("Cannot create window: {err}")),
        };

        let backend = match Backend::new(
            config.backend,
            Some(window.window_arc()),
            config.resolution.width,
            config.resolution.height,
            config.vsync,
        ) {
            Ok(backend) => backend,
            Err(err) => fatal(&format!("Cannot create rendering device: {err}")),
        };

        log::info!(
            "graphics subsystem ready: {}x{}, fullscreen={}",
            config.resolution.width,
            config.resolution.height,
            config.fullscreen
        );

        Self::from_parts(config, Some(window), backend)
    }

    /// Create the subsystem without a window, on the headless backend.
    pub fn headless(mut config: GraphicsConfig) -> Self {
        config.backend = BackendKind::Headless;
        let backend = Backend::new(
            config.backend,
            None,
            config.resolution.width,
            config.resolution.height,
            config.vsync,
        )
        .unwrap_or_else(|err| fatal(&format!("Cannot create rendering device: {err}")));
        Self::from_parts(config, None, backend)
    }

    fn from_parts(config: GraphicsConfig, window: Option<Window>, backend: Backend) -> Self {
        let strict = config.strict_textures;
        Self {
            config,
            window,
            backend,
            textures: TextureRegistry::new(strict),
            camera: Camera::default(),
            device_state: DeviceState::Ready,
            frame_active: false,
            on_render_reload: None,
            event_sink: None,
        }
    }

    // Accessors

    /// False while a device reset is in flight
    pub fn is_running(&self) -> bool {
        self.device_state == DeviceState::Ready
    }

    pub fn fullscreen(&self) -> bool {
        self.config.fullscreen
    }

    pub fn current_resolution(&self) -> ScreenResolution {
        self.config.resolution
    }

    pub fn current_screen(&self) -> usize {
        self.config.screen_index
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> Option<&mut Window> {
        self.window.as_mut()
    }

    /// Get access to the backend for advanced operations
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Pixel dimensions every projection maps into: the monitor size in
    /// fullscreen, the window size otherwise, the configured resolution when
    /// headless.
    pub fn current_window_size(&self) -> (u32, u32) {
        match &self.window {
            Some(window) if self.config.fullscreen => window
                .monitor_size()
                .unwrap_or_else(|| self.backend.surface_size()),
            Some(window) => window.dimensions(),
            None => self.backend.surface_size(),
        }
    }

    /// Display modes of the current monitor
    pub fn available_resolutions(&self) -> Vec<ScreenResolution> {
        match &self.window {
            Some(window) => window.available_resolutions(),
            None => vec![self.config.resolution],
        }
    }

    /// Register the callback invoked once after every successful device
    /// recreation, so dependents can rebind cached handles.
    pub fn set_on_render_reload(&mut self, callback: impl FnMut(&mut Graphics) + 'static) {
        self.on_render_reload = Some(Box::new(callback));
    }

    /// Register the overlay sink receiving raw window events.
    pub fn set_event_sink(&mut self, sink: impl FnMut(&WindowEvent) + 'static) {
        self.event_sink = Some(Box::new(sink));
    }

    /// Forward a raw platform event: window bookkeeping plus unmodified
    /// dispatch to the overlay sink. Contents are not interpreted here.
    pub fn forward_event(&mut self, event: &WindowEvent) {
        if let Some(window) = &mut self.window {
            window.handle_event(event);
        }
        if let Some(sink) = &mut self.event_sink {
            sink(event);
        }
    }

    // Texture registry

    /// Load a texture into the registry. `None` when decoding fails.
    pub fn load_texture(&mut self, path: &Path) -> Option<TextureId> {
        self.textures.load(&mut self.backend, path)
    }

    /// Load a caller-owned texture outside the registry.
    pub fn load_texture_raw(&mut self, path: &Path) -> Option<Texture> {
        self.textures.load_raw(&mut self.backend, path)
    }

    pub fn texture_by_id(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn unload_texture(&mut self, id: TextureId) -> bool {
        self.textures.unload(&mut self.backend, id)
    }

    pub fn clear_textures(&mut self) {
        self.textures.clear(&mut self.backend);
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Read access to the registry
    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    // Device-altering operations

    /// Transition between windowed and fullscreen display.
    ///
    /// Runs the full reset sequence synchronously: every tracked texture is
    /// destroyed, the device is recreated in the new mode, every texture is
    /// reloaded from its remembered path under a fresh id, and the reload
    /// callback runs before the subsystem reports ready again.
    pub fn set_fullscreen(&mut self, state: bool) {
        log::info!(
            "display mode change: fullscreen={} -> {}",
            self.config.fullscreen,
            state
        );
        self.device_state = DeviceState::Resetting;
        self.frame_active = false;
        self.config.fullscreen = state;

        let reload = self.textures.reload_table(&mut self.backend);

        if let Some(window) = &self.window {
            window.set_fullscreen(state, self.config.screen_index);
        }

        if let Err(err) = self
            .backend
            .reset(self.window.as_ref().map(|w| w.window_arc()), self.config.vsync)
        {
            fatal(&format!("Cannot recreate rendering device: {err}"));
        }

        let (width, height) = self.current_window_size();
        self.backend.resize(width, height);

        for (old_id, path) in reload {
            match self.textures.load(&mut self.backend, &path) {
                Some(new_id) => log::debug!(
                    "reloaded {} ({:?} -> {:?})",
                    path.display(),
                    old_id,
                    new_id
                ),
                None => log::error!("failed to reload {}", path.display()),
            }
        }

        self.run_reload_callback();
        self.device_state = DeviceState::Ready;
    }

    /// Resize the surface. When an offscreen render target is active the
    /// backend recreates it at the new size with the default target restored.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.config.resolution = ScreenResolution { width, height };
        if let Some(window) = &mut self.window {
            window.request_resize(width, height);
        }
        self.backend.resize(width, height);
    }

    pub fn set_resolution_entry(&mut self, resolution: &ScreenResolution) {
        self.set_resolution(resolution.width, resolution.height);
    }

    /// Move the window to another screen
    pub fn set_screen(&mut self, screen_index: usize) {
        self.config.screen_index = screen_index;
        if let Some(window) = &self.window {
            window.move_to_screen(screen_index);
        }
    }

    /// Redirect subsequent draws into an offscreen target, or back to the
    /// default one.
    pub fn enable_render_target(&mut self, state: bool) {
        if let Err(err) = self.backend.enable_render_target(state) {
            log::error!("render target switch failed: {err}");
        }
    }

    pub fn render_target_active(&self) -> bool {
        self.backend.render_target_active()
    }

    fn run_reload_callback(&mut self) {
        if let Some(mut callback) = self.on_render_reload.take() {
            callback(self);
            if self.on_render_reload.is_none() {
                self.on_render_reload = Some(callback);
            }
        }
    }

    // Frame bracketing

    /// Start the rendering frame, clearing the active target.
    pub fn begin_frame(&mut self) {
        if self.device_state == DeviceState::Resetting {
            log::warn!("begin_frame rejected during device reset");
            return;
        }
        if self.frame_active {
            log::warn!("begin_frame called twice without end_frame");
            return;
        }
        match self.backend.begin_frame() {
            Ok(()) => self.frame_active = true,
            Err(BackendError::SurfaceLost) => {
                log::warn!("surface lost, reconfiguring");
                let (width, height) = self.current_window_size();
                self.backend.resize(width, height);
            }
            Err(BackendError::OutOfMemory) => fatal("out of GPU memory"),
            Err(err) => log::error!("begin_frame failed: {err}"),
        }
    }

    /// End the rendering frame and present the buffer (or resolve the
    /// offscreen target in render-to-texture mode).
    pub fn end_frame(&mut self) {
        if !self.frame_active {
            return;
        }
        self.frame_active = false;
        if let Err(err) = self.backend.end_frame() {
            log::error!("end_frame failed: {err}");
        }
    }

    /// Primitive draw calls issued to the backend so far
    pub fn draw_calls(&self) -> u64 {
        self.backend.draw_call_count()
    }

    fn can_draw(&self) -> bool {
        if self.device_state == DeviceState::Resetting {
            return false;
        }
        if !self.frame_active {
            log::debug!("draw call outside of a frame, skipped");
            return false;
        }
        true
    }

    // Primitives. Each projects through the camera, applies the visibility
    // cull before touching the backend, and scopes its register changes.

    /// Draw a filled box at a world position
    pub fn draw_filled_box(&mut self, pos: Vec2, pivot: Vec2, size: Vec2, color: Color) {
        if !self.can_draw() {
            return;
        }
        let projected =
            camera::project(&self.camera, pos, pivot, size, self.current_window_size());
        if !projected.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.fill_rect(projected.rect);
    }

    /// Draw a wireframe box at a world position
    pub fn draw_box(&mut self, pos: Vec2, pivot: Vec2, size: Vec2, color: Color) {
        if !self.can_draw() {
            return;
        }
        let projected =
            camera::project(&self.camera, pos, pivot, size, self.current_window_size());
        if !projected.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.stroke_rect(projected.rect);
    }

    /// Draw a line between two world positions
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        if !self.can_draw() {
            return;
        }
        let viewport = self.current_window_size();
        let a = camera::project(&self.camera, from, Vec2::ZERO, Vec2::ZERO, viewport);
        let b = camera::project(&self.camera, to, Vec2::ZERO, Vec2::ZERO, viewport);
        if !a.visible && !b.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.draw_line(
            Vec2::new(a.rect.x, a.rect.y),
            Vec2::new(b.rect.x, b.rect.y),
        );
    }

    /// Draw a single point at a world position
    pub fn draw_point(&mut self, pos: Vec2, color: Color) {
        if !self.can_draw() {
            return;
        }
        let projected = camera::project(
            &self.camera,
            pos,
            Vec2::ZERO,
            Vec2::ZERO,
            self.current_window_size(),
        );
        if !projected.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.draw_point(Vec2::new(projected.rect.x, projected.rect.y));
    }

    /// Draw the current frame of a sprite at a world position
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sprite(
        &mut self,
        sprite: &Sprite,
        pos: Vec2,
        pivot: Vec2,
        size: Vec2,
        angle: f32,
        flip: TexFlip,
        color: Color,
    ) {
        if !self.can_draw() {
            return;
        }
        let Some(texture) = self.textures.get(sprite.texture()) else {
            log::debug!("sprite references an unloaded texture, skipped");
            return;
        };
        let handle = texture.handle();
        let Some(frame) = sprite.current_rect() else {
            debug_assert!(false, "sprite cursor out of range");
            return;
        };
        let projected =
            camera::project(&self.camera, pos, pivot, size, self.current_window_size());
        if !projected.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.bind_texture(Some(handle));
        scope.draw_textured(Some(frame), projected.rect, angle, flip);
    }

    /// Draw a registry texture at a world position
    #[allow(clippy::too_many_arguments)]
    pub fn draw_texture(
        &mut self,
        id: TextureId,
        pos: Vec2,
        pivot: Vec2,
        size: Vec2,
        angle: f32,
        flip: TexFlip,
        color: Color,
    ) {
        if !self.can_draw() {
            return;
        }
        let Some(texture) = self.textures.get(id) else {
            log::debug!("draw_texture with a dead id, skipped");
            return;
        };
        let handle = texture.handle();
        self.draw_texture_handle(handle, pos, pivot, size, angle, flip, color);
    }

    /// Draw a caller-owned texture at a world position
    #[allow(clippy::too_many_arguments)]
    pub fn draw_texture_raw(
        &mut self,
        texture: &Texture,
        pos: Vec2,
        pivot: Vec2,
        size: Vec2,
        angle: f32,
        flip: TexFlip,
        color: Color,
    ) {
        if !self.can_draw() {
            return;
        }
        self.draw_texture_handle(texture.handle(), pos, pivot, size, angle, flip, color);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_texture_handle(
        &mut self,
        handle: crate::backend::TextureHandle,
        pos: Vec2,
        pivot: Vec2,
        size: Vec2,
        angle: f32,
        flip: TexFlip,
        color: Color,
    ) {
        let projected =
            camera::project(&self.camera, pos, pivot, size, self.current_window_size());
        if !projected.visible {
            return;
        }
        let mut scope = DrawStateScope::new(&mut self.backend);
        scope.set_blend_mode(BlendMode::Alpha);
        scope.set_draw_color(color);
        scope.bind_texture(Some(handle));
        scope.draw_textured(None, projected.rect, angle, flip);
    }
}

/// Scoped capture of the backend draw registers.
///
/// The state present on construction is re-applied when the scope drops, on
/// every exit path, so a primitive's register changes never leak into the
/// next draw call.
struct DrawStateScope<'a> {
    backend: &'a mut Backend,
    saved: DrawState,
}

impl<'a> DrawStateScope<'a> {
    fn new(backend: &'a mut Backend) -> Self {
        let saved = backend.draw_state();
        Self { backend, saved }
    }
}

impl Deref for DrawStateScope<'_> {
    type Target = Backend;

    fn deref(&self) -> &Backend {
        self.backend
    }
}

impl DerefMut for DrawStateScope<'_> {
    fn deref_mut(&mut self) -> &mut Backend {
        self.backend
    }
}

impl Drop for DrawStateScope<'_> {
    fn drop(&mut self) {
        let saved = self.saved;
        self.backend.apply_draw_state(saved);
    }
}
