//! Texture loading and records
//!
//! [`TextureData`] is the CPU side: an image file decoded into a tightly
//! packed RGBA8 buffer. [`Texture`] is the GPU-resident record the registry
//! stores: the backend handle plus the metadata needed to recreate it from
//! its source path after a device reset.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};

use crate::backend::traits::TextureHandle;
use crate::backend::types::TextureDescriptor;
use crate::registry::TextureId;

/// Decoded image data
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture data from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|e| e.to_string())?;
        Ok(Self::from_image(img, &name))
    }

    /// Load texture data from an in-memory encoded image
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();
        Self {
            width,
            height,
            data: rgba.into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a 1x1 solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    /// Create a default white texture
    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    pub fn descriptor(&self) -> TextureDescriptor {
        TextureDescriptor {
            label: Some(self.name.clone()),
            width: self.width,
            height: self.height,
        }
    }
}

/// A GPU-resident texture tracked by (or handed out from) the registry.
///
/// The texture does not own the sprites or emitters referencing it; they must
/// not outlive it. `id` is `None` for raw textures loaded outside the
/// registry.
pub struct Texture {
    pub(crate) handle: TextureHandle,
    pub(crate) id: Option<TextureId>,
    width: u32,
    height: u32,
    path: PathBuf,
}

impl Texture {
    pub(crate) fn new(
        handle: TextureHandle,
        width: u32,
        height: u32,
        path: PathBuf,
    ) -> Self {
        Self {
            handle,
            id: None,
            width,
            height,
            path,
        }
    }

    /// Backend handle of this texture
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Registry id, if tracked
    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source path the texture was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}
