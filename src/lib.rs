//! Graphics2D - A camera-relative 2D rendering engine
//!
//! This engine draws world-space primitives and sprites through a shared
//! camera projection, and survives device-level discontinuities (fullscreen
//! toggles, resolution changes) by tearing the surface down and replaying
//! every tracked texture from its source path.
//!
//! Two drawing backends are supported:
//! - **wgpu**: Cross-platform GPU rendering against a winit window
//! - **Headless**: No-GPU backend that records draw calls, for tests and
//!   tooling
//!
//! # Features
//! - Bracketed begin/end frame API with filled/outlined boxes, lines, points,
//!   textures, and sprite frames
//! - Texture registry with generation-counted ids and wholesale reload across
//!   device resets
//! - Cheap axis-aligned visibility cull applied before any backend work
//! - Offscreen render-target redirection
//! - Camera-relative particle emitter bridge

pub mod backend;
pub mod camera;
pub mod emitter;
pub mod graphics;
pub mod registry;
pub mod sprite;
pub mod texture;
pub mod window;

pub use backend::{
    Backend, BackendError, BackendResult, BlendMode, Color, DrawState, FrameRect, HeadlessBackend,
    RenderBackend, ScreenRect, TexFlip, TextureHandle, WgpuBackend,
};
pub use camera::{project, Camera, Projected, WORLD_SPAN};
pub use emitter::{EmitterConfig, ParticleEmitter};
pub use graphics::Graphics;
pub use registry::{TextureId, TextureRegistry};
pub use sprite::Sprite;
pub use texture::{Texture, TextureData};
pub use window::Window;

/// Backend selection for the graphics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// wgpu backend - hardware rendering against a window
    #[default]
    Wgpu,
    /// Headless backend - records draws, needs no window or GPU
    Headless,
}

/// A display resolution in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenResolution {
    pub width: u32,
    pub height: u32,
}

/// Configuration for initializing the graphics engine
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Window title
    pub title: String,
    /// Index of the screen the window opens on
    pub screen_index: usize,
    /// Initial resolution
    pub resolution: ScreenResolution,
    /// Start in borderless fullscreen
    pub fullscreen: bool,
    /// Enable vsync
    pub vsync: bool,
    /// Which backend to use
    pub backend: BackendKind,
    /// Treat texture decode failures as fatal instead of returning the
    /// `None` sentinel
    pub strict_textures: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            title: "Graphics2D".to_string(),
            screen_index: 0,
            resolution: ScreenResolution {
                width: 1280,
                height: 720,
            },
            fullscreen: false,
            vsync: true,
            backend: BackendKind::Wgpu,
            strict_textures: false,
        }
    }
}

/// Emit a diagnostic and terminate the process. Used for unrecoverable
/// failures: window/device creation and device-reset steps.
pub(crate) fn fatal(message: &str) -> ! {
    log::error!("fatal: {message}");
    eprintln!("Fatal error: {message}");
    std::process::exit(1);
}
