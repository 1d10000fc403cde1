//! Renderable symbol factory
//!
//! The reel bank never draws anything. It places symbols through a
//! [`SymbolRenderer`], which owns the sprites and hands out opaque
//! [`SpriteId`] handles. Handles are never reused, so a destroyed sprite
//! stays dead and liveness is a plain lookup.
//!
//! [`SpriteStore`] is the headless renderer used by the simulator and tests.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::symbols::{SymbolCatalog, SymbolId};

/// Opaque handle to a sprite owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteId(pub u64);

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sprite#{}", self.0)
    }
}

/// Animatable sprite property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    X,
    Y,
    Scale,
}

/// Renderable symbol factory and sprite surface
pub trait SymbolRenderer {
    /// Whether a texture is registered for `id`
    fn has_texture(&self, id: SymbolId) -> bool;

    /// Create a sprite showing `id` at the origin, scale 1.0
    fn create(&mut self, id: SymbolId) -> ReelResult<SpriteId>;

    /// Remove a sprite. Unknown handles are ignored.
    fn destroy(&mut self, sprite: SpriteId);

    fn is_alive(&self, sprite: SpriteId) -> bool;

    /// Read a property, `None` once the sprite is gone
    fn get(&self, sprite: SpriteId, property: Property) -> Option<f32>;

    /// Write a property. Returns `false` if the sprite is gone.
    fn set(&mut self, sprite: SpriteId, property: Property, value: f32) -> bool;

    /// Unscaled (width, height) of the sprite's texture
    fn size(&self, sprite: SpriteId) -> Option<(f32, f32)>;
}

/// Texture metadata known to the headless renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub name: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
struct Sprite {
    symbol: SymbolId,
    x: f32,
    y: f32,
    scale: f32,
}

/// Headless renderer: sprites are plain records keyed by handle
#[derive(Debug, Default)]
pub struct SpriteStore {
    textures: HashMap<SymbolId, TextureInfo>,
    sprites: HashMap<SpriteId, Sprite>,
    next_id: u64,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a texture of the given size for every catalog id
    pub fn with_catalog(catalog: &SymbolCatalog, width: f32, height: f32) -> Self {
        let mut store = Self::new();
        for id in catalog.ids() {
            store.register_texture(id, width, height);
        }
        store
    }

    pub fn register_texture(&mut self, id: SymbolId, width: f32, height: f32) {
        self.textures.insert(
            id,
            TextureInfo {
                name: id.texture_name(),
                width,
                height,
            },
        );
    }

    pub fn texture(&self, id: SymbolId) -> Option<&TextureInfo> {
        self.textures.get(&id)
    }

    /// Symbol id a live sprite shows
    pub fn symbol_of(&self, sprite: SpriteId) -> Option<SymbolId> {
        self.sprites.get(&sprite).map(|s| s.symbol)
    }

    /// Number of sprites currently alive
    pub fn live_count(&self) -> usize {
        self.sprites.len()
    }
}

impl SymbolRenderer for SpriteStore {
    fn has_texture(&self, id: SymbolId) -> bool {
        self.textures.contains_key(&id)
    }

    fn create(&mut self, id: SymbolId) -> ReelResult<SpriteId> {
        if !self.textures.contains_key(&id) {
            return Err(ReelError::MissingTexture { id: id.0 });
        }
        self.next_id += 1;
        let handle = SpriteId(self.next_id);
        self.sprites.insert(
            handle,
            Sprite {
                symbol: id,
                x: 0.0,
                y: 0.0,
                scale: 1.0,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, sprite: SpriteId) {
        self.sprites.remove(&sprite);
    }

    fn is_alive(&self, sprite: SpriteId) -> bool {
        self.sprites.contains_key(&sprite)
    }

    fn get(&self, sprite: SpriteId, property: Property) -> Option<f32> {
        self.sprites.get(&sprite).map(|s| match property {
            Property::X => s.x,
            Property::Y => s.y,
            Property::Scale => s.scale,
        })
    }

    fn set(&mut self, sprite: SpriteId, property: Property, value: f32) -> bool {
        let Some(s) = self.sprites.get_mut(&sprite) else {
            return false;
        };
        match property {
            Property::X => s.x = value,
            Property::Y => s.y = value,
            Property::Scale => s.scale = value,
        }
        true
    }

    fn size(&self, sprite: SpriteId) -> Option<(f32, f32)> {
        let symbol = self.sprites.get(&sprite)?.symbol;
        self.textures.get(&symbol).map(|t| (t.width, t.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_texture() {
        let mut store = SpriteStore::new();
        store.register_texture(SymbolId(1), 100.0, 80.0);
        assert!(store.create(SymbolId(1)).is_ok());
        assert!(matches!(
            store.create(SymbolId(9)),
            Err(ReelError::MissingTexture { id: 9 })
        ));
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut store = SpriteStore::with_catalog(&SymbolCatalog::standard(), 100.0, 80.0);
        let a = store.create(SymbolId(2)).unwrap();
        store.destroy(a);
        let b = store.create(SymbolId(2)).unwrap();
        assert_ne!(a, b);
        assert!(!store.is_alive(a));
        assert!(!store.set(a, Property::Scale, 2.0));
        assert_eq!(store.get(a, Property::Y), None);
    }

    #[test]
    fn test_properties_and_size() {
        let mut store = SpriteStore::with_catalog(&SymbolCatalog::standard(), 120.0, 90.0);
        let s = store.create(SymbolId(5)).unwrap();
        assert_eq!(store.get(s, Property::Scale), Some(1.0));
        assert!(store.set(s, Property::Y, -90.0));
        assert_eq!(store.get(s, Property::Y), Some(-90.0));
        assert_eq!(store.size(s), Some((120.0, 90.0)));
        assert_eq!(store.symbol_of(s), Some(SymbolId(5)));
        assert_eq!(store.texture(SymbolId(5)).map(|t| t.name.as_str()), Some("symbol5"));
    }
}
