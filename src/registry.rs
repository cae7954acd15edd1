//! Texture registry
//!
//! Owns every tracked GPU texture. Ids are generation-counted slot handles:
//! unloading a texture frees its slot and bumps the slot generation, so a
//! stale id can never resolve to a texture loaded later into the same slot.

use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::texture::{Texture, TextureData};

/// Stable handle to a registry entry: slot index plus slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId {
    index: u32,
    generation: u32,
}

impl TextureId {
    #[cfg(test)]
    pub(crate) fn dummy() -> Self {
        Self {
            index: 0,
            generation: 0,
        }
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<Texture>,
}

/// The owning collection of loaded textures.
pub struct TextureRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    strict: bool,
}

impl TextureRegistry {
    /// Create an empty registry. Under `strict`, a failed decode or upload is
    /// fatal instead of returning the `None` sentinel.
    pub fn new(strict: bool) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            strict,
        }
    }

    /// Decode an image file, upload it, and track it. Returns `None` when
    /// decoding fails (unless strict).
    pub fn load(&mut self, backend: &mut Backend, path: &Path) -> Option<TextureId> {
        let data = match TextureData::from_file(path) {
            Ok(data) => data,
            Err(err) => return self.load_failure(path, &err),
        };
        self.insert_data(backend, data, path.to_path_buf())
    }

    /// Same decode/upload path as [`TextureRegistry::load`], but the returned
    /// texture is caller-owned and not tracked by the registry.
    pub fn load_raw(&mut self, backend: &mut Backend, path: &Path) -> Option<Texture> {
        let data = match TextureData::from_file(path) {
            Ok(data) => data,
            Err(err) => return self.load_failure(path, &err),
        };
        self.upload(backend, data, path.to_path_buf())
    }

    /// Generation-checked lookup.
    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Destroy the GPU resource and free the slot. Every other id stays
    /// valid. Returns whether the id referred to a live texture.
    pub fn unload(&mut self, backend: &mut Backend, id: TextureId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        else {
            return false;
        };
        let Some(texture) = slot.entry.take() else {
            return false;
        };
        backend.destroy_texture(texture.handle);
        slot.generation += 1;
        self.free.push(id.index);
        true
    }

    /// Destructively drain the registry into an `(id, path)` reload table.
    ///
    /// Every GPU resource is destroyed and every slot freed; the registry is
    /// empty afterwards. Used only while replaying resources across a device
    /// reset.
    pub fn reload_table(&mut self, backend: &mut Backend) -> Vec<(TextureId, PathBuf)> {
        let mut table = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(texture) = slot.entry.take() {
                log::debug!("scheduling texture reload: {}", texture.path().display());
                table.push((
                    TextureId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    texture.path().to_path_buf(),
                ));
                backend.destroy_texture(texture.handle);
                slot.generation += 1;
                self.free.push(index as u32);
            }
        }
        // Refill lowest slots first so reloads get sequential fresh ids.
        self.free.sort_unstable_by(|a, b| b.cmp(a));
        table
    }

    /// Destroy and remove every entry without producing a reload table.
    pub fn clear(&mut self, backend: &mut Backend) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(texture) = slot.entry.take() {
                backend.destroy_texture(texture.handle);
                slot.generation += 1;
                self.free.push(index as u32);
            }
        }
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over live textures.
    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.slots.iter().filter_map(|slot| slot.entry.as_ref())
    }

    pub(crate) fn insert_data(
        &mut self,
        backend: &mut Backend,
        data: TextureData,
        path: PathBuf,
    ) -> Option<TextureId> {
        let mut texture = self.upload(backend, data, path)?;

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = TextureId {
            index,
            generation: slot.generation,
        };
        texture.id = Some(id);
        slot.entry = Some(texture);
        Some(id)
    }

    fn upload(
        &mut self,
        backend: &mut Backend,
        data: TextureData,
        path: PathBuf,
    ) -> Option<Texture> {
        match backend.create_texture(&data.descriptor(), &data.data) {
            Ok(handle) => Some(Texture::new(handle, data.width, data.height, path)),
            Err(err) => self.load_failure(&path, &err.to_string()),
        }
    }

    fn load_failure<T>(&self, path: &Path, err: &str) -> Option<T> {
        if self.strict {
            crate::fatal(&format!(
                "failed to load texture {}: {}",
                path.display(),
                err
            ));
        }
        log::warn!("failed to load texture {}: {}", path.display(), err);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    fn registry_with_backend() -> (TextureRegistry, Backend) {
        (
            TextureRegistry::new(false),
            Backend::new(crate::BackendKind::Headless, None, 640, 360, false).unwrap(),
        )
    }

    fn insert(registry: &mut TextureRegistry, backend: &mut Backend, name: &str) -> TextureId {
        registry
            .insert_data(
                backend,
                TextureData::solid_color([255, 0, 0, 255], name),
                PathBuf::from(name),
            )
            .unwrap()
    }

    #[test]
    fn lookup_returns_inserted_texture() {
        let (mut registry, mut backend) = registry_with_backend();
        let id = insert(&mut registry, &mut backend, "a.png");
        let texture = registry.get(id).unwrap();
        assert_eq!(texture.path(), Path::new("a.png"));
        assert_eq!(texture.id(), Some(id));
    }

    #[test]
    fn unload_keeps_other_ids_valid() {
        let (mut registry, mut backend) = registry_with_backend();
        let a = insert(&mut registry, &mut backend, "a.png");
        let b = insert(&mut registry, &mut backend, "b.png");
        let c = insert(&mut registry, &mut backend, "c.png");

        assert!(registry.unload(&mut backend, b));
        assert!(registry.get(b).is_none());
        assert_eq!(registry.get(a).unwrap().path(), Path::new("a.png"));
        assert_eq!(registry.get(c).unwrap().path(), Path::new("c.png"));
        assert_eq!(registry.len(), 2);

        // Unloading twice is a no-op.
        assert!(!registry.unload(&mut backend, b));
    }

    #[test]
    fn stale_id_never_aliases_reused_slot() {
        let (mut registry, mut backend) = registry_with_backend();
        let a = insert(&mut registry, &mut backend, "a.png");
        registry.unload(&mut backend, a);

        let d = insert(&mut registry, &mut backend, "d.png");
        assert!(registry.get(a).is_none());
        assert_eq!(registry.get(d).unwrap().path(), Path::new("d.png"));
    }

    #[test]
    fn reload_table_drains_registry() {
        let (mut registry, mut backend) = registry_with_backend();
        let a = insert(&mut registry, &mut backend, "a.png");
        let b = insert(&mut registry, &mut backend, "b.png");
        registry.unload(&mut backend, a);

        let table = registry.reload_table(&mut backend);
        assert!(registry.is_empty());
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].0, b);
        assert_eq!(table[0].1, PathBuf::from("b.png"));
        // Drained paths never include the unloaded one.
        assert!(table.iter().all(|(_, p)| p != Path::new("a.png")));
    }

    #[test]
    fn clear_destroys_everything() {
        let (mut registry, mut backend) = registry_with_backend();
        insert(&mut registry, &mut backend, "a.png");
        insert(&mut registry, &mut backend, "b.png");
        registry.clear(&mut backend);
        assert!(registry.is_empty());
        assert_eq!(backend.as_headless().unwrap().texture_count(), 0);
    }
}
