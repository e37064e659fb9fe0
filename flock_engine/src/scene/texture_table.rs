/// Texture handle table
///
/// Textures are owned here and referenced everywhere else by a generational
/// `TextureHandle`. Names are deduplicated: inserting a name that already
/// exists returns the existing handle and bumps its reference count.
/// Each live texture also has a dense descriptor index, its slot in the
/// shared set's sampler array. The default texture is always index 0.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::error::Result;
use crate::{engine_debug, engine_warn_err};

new_key_type! {
    /// Generational handle into a [`TextureTable`]
    pub struct TextureHandle;
}

#[derive(Debug)]
struct TextureEntry<T> {
    name: String,
    texture: T,
    ref_count: u32,
}

#[derive(Debug)]
pub struct TextureTable<T> {
    entries: SlotMap<TextureHandle, TextureEntry<T>>,
    by_name: FxHashMap<String, TextureHandle>,
    /// Descriptor order
    order: Vec<TextureHandle>,
    default_handle: TextureHandle,
}

impl<T> TextureTable<T> {
    /// Create a table holding only the default texture
    pub fn new(default_name: &str, default_texture: T) -> Self {
        let mut entries = SlotMap::with_key();
        let default_handle = entries.insert(TextureEntry {
            name: default_name.to_string(),
            texture: default_texture,
            ref_count: 1,
        });
        let mut by_name = FxHashMap::default();
        by_name.insert(default_name.to_string(), default_handle);

        Self {
            entries,
            by_name,
            order: vec![default_handle],
            default_handle,
        }
    }

    pub fn default_handle(&self) -> TextureHandle {
        self.default_handle
    }

    /// Insert `name`, building the texture only if the name is new
    pub fn insert_with(&mut self, name: &str, build: impl FnOnce() -> Result<T>) -> Result<TextureHandle> {
        if let Some(handle) = self.reuse(name) {
            return Ok(handle);
        }
        let texture = build()?;
        Ok(self.insert_new(name, texture))
    }

    /// Insert `name`; an existing texture of that name wins and `texture` is dropped
    pub fn insert(&mut self, name: &str, texture: T) -> TextureHandle {
        match self.reuse(name) {
            Some(handle) => handle,
            None => self.insert_new(name, texture),
        }
    }

    fn reuse(&mut self, name: &str) -> Option<TextureHandle> {
        let handle = *self.by_name.get(name)?;
        let entry = self.entries.get_mut(handle)?;
        entry.ref_count += 1;
        engine_debug!("flock::scene", "Texture '{}' reused (refs: {})", name, entry.ref_count);
        Some(handle)
    }

    fn insert_new(&mut self, name: &str, texture: T) -> TextureHandle {
        let handle = self.entries.insert(TextureEntry {
            name: name.to_string(),
            texture,
            ref_count: 1,
        });
        self.by_name.insert(name.to_string(), handle);
        self.order.push(handle);
        handle
    }

    /// Add a reference to a live texture
    pub fn retain(&mut self, handle: TextureHandle) -> Result<()> {
        match self.entries.get_mut(handle) {
            Some(entry) => {
                entry.ref_count += 1;
                Ok(())
            }
            None => Err(engine_warn_err!("flock::scene", "Retain of a stale texture handle")),
        }
    }

    /// Drop a reference; returns the texture once the last reference is gone
    ///
    /// The default texture is never removed. Removal shifts the descriptor
    /// index of every later texture, so the shared set must be rewritten.
    pub fn release(&mut self, handle: TextureHandle) -> Result<Option<T>> {
        let Some(entry) = self.entries.get_mut(handle) else {
            return Err(engine_warn_err!("flock::scene", "Release of a stale texture handle"));
        };
        if handle == self.default_handle {
            return Ok(None);
        }

        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count > 0 {
            return Ok(None);
        }

        let Some(entry) = self.entries.remove(handle) else {
            return Ok(None);
        };
        self.by_name.remove(&entry.name);
        self.order.retain(|&h| h != handle);
        engine_debug!("flock::scene", "Texture '{}' removed", entry.name);
        Ok(Some(entry.texture))
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&T> {
        self.entries.get(handle).map(|e| &e.texture)
    }

    pub fn get_mut(&mut self, handle: TextureHandle) -> Option<&mut T> {
        self.entries.get_mut(handle).map(|e| &mut e.texture)
    }

    pub fn find(&self, name: &str) -> Option<TextureHandle> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, handle: TextureHandle) -> Option<&str> {
        self.entries.get(handle).map(|e| e.name.as_str())
    }

    pub fn ref_count(&self, handle: TextureHandle) -> u32 {
        self.entries.get(handle).map_or(0, |e| e.ref_count)
    }

    /// Position of the texture in the shared sampler array
    pub fn descriptor_index(&self, handle: TextureHandle) -> Option<u32> {
        self.order.iter().position(|&h| h == handle).map(|i| i as u32)
    }

    /// Live textures in descriptor order
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &T)> {
        self.order
            .iter()
            .filter_map(move |&h| self.entries.get(h).map(|e| (h, &e.texture)))
    }

    /// Convert every texture, in descriptor order
    pub fn try_map<U>(&self, mut f: impl FnMut(&str, &T) -> Result<U>) -> Result<Vec<U>> {
        self.order
            .iter()
            .filter_map(|&h| self.entries.get(h))
            .map(|e| f(&e.name, &e.texture))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
#[path = "texture_table_tests.rs"]
mod tests;
