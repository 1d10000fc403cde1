//! Symbol identifiers, the symbol catalog and the outcome RNG

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::error::{ReelError, ReelResult};
use crate::scene::SpriteId;

/// RNG used for landing draws and strip shuffles
pub type ReelRng = ChaCha8Rng;

/// Build the reel RNG, seeded when reproducible spins are wanted
pub fn reel_rng(seed: Option<u64>) -> ReelRng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_os_rng(),
    }
}

/// Symbol identifier drawn from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Texture key the renderer resolves this id with (`symbol1` … `symbol8`)
    pub fn texture_name(&self) -> String {
        format!("symbol{}", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// A placed symbol: catalog id plus the sprite showing it
///
/// Two symbols are equal when their ids match, whatever sprite shows them.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Symbol {
    pub id: SymbolId,
    pub sprite: SpriteId,
}

impl Symbol {
    pub fn new(id: SymbolId, sprite: SpriteId) -> Self {
        Self { id, sprite }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Finite, inclusive range of symbol ids with a uniform picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogConfig")]
pub struct SymbolCatalog {
    min_id: u32,
    max_id: u32,
}

impl SymbolCatalog {
    /// Catalog over `min_id..=max_id`
    pub fn new(min_id: u32, max_id: u32) -> ReelResult<Self> {
        if min_id == 0 || min_id > max_id {
            return Err(ReelError::InvalidConfig(format!(
                "symbol range {min_id}..={max_id} is empty or starts at 0"
            )));
        }
        Ok(Self { min_id, max_id })
    }

    /// The eight-symbol catalog the game ships with
    pub fn standard() -> Self {
        Self { min_id: 1, max_id: 8 }
    }

    /// Uniform draw over the whole catalog
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        SymbolId(rng.random_range(self.min_id..=self.max_id))
    }

    /// All ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (self.min_id..=self.max_id).map(SymbolId)
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        (self.min_id..=self.max_id).contains(&id.0)
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.max_id - self.min_id) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.max_id < self.min_id
    }
}

impl TryFrom<CatalogConfig> for SymbolCatalog {
    type Error = ReelError;

    fn try_from(config: CatalogConfig) -> ReelResult<Self> {
        Self::new(config.min_id, config.max_id)
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_rejects_bad_range() {
        assert!(SymbolCatalog::new(0, 8).is_err());
        assert!(SymbolCatalog::new(5, 4).is_err());
        assert_eq!(SymbolCatalog::new(3, 3).map(|c| c.len()).ok(), Some(1));
    }

    #[test]
    fn test_deserialize_validates_range() {
        assert!(serde_json::from_str::<SymbolCatalog>(r#"{"min_id":5,"max_id":1}"#).is_err());
        assert!(serde_json::from_str::<SymbolCatalog>(r#"{"min_id":0,"max_id":8}"#).is_err());

        let catalog: SymbolCatalog =
            serde_json::from_str(r#"{"min_id":2,"max_id":4}"#).expect("valid range");
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![SymbolId(2), SymbolId(3), SymbolId(4)]);
    }

    #[test]
    fn test_pick_stays_in_range() {
        let catalog = SymbolCatalog::standard();
        let mut rng = reel_rng(Some(7));
        for _ in 0..1_000 {
            let id = catalog.pick_random(&mut rng);
            assert!(catalog.contains(id), "{id} outside catalog");
        }
    }

    #[test]
    fn test_pick_uniformity() {
        let catalog = SymbolCatalog::standard();
        let mut rng = reel_rng(Some(42));
        let draws = 80_000;
        let mut counts = [0usize; 8];
        for _ in 0..draws {
            counts[(catalog.pick_random(&mut rng).0 - 1) as usize] += 1;
        }

        let expected = draws / catalog.len();
        for (i, &count) in counts.iter().enumerate() {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "id {} drawn {count} times", i + 1);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let catalog = SymbolCatalog::standard();
        let mut a = reel_rng(Some(99));
        let mut b = reel_rng(Some(99));
        let left: Vec<_> = (0..32).map(|_| catalog.pick_random(&mut a)).collect();
        let right: Vec<_> = (0..32).map(|_| catalog.pick_random(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_symbol_equality_ignores_sprite() {
        let a = Symbol::new(SymbolId(3), SpriteId(1));
        let b = Symbol::new(SymbolId(3), SpriteId(2));
        let c = Symbol::new(SymbolId(4), SpriteId(1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(SymbolId(3).texture_name(), "symbol3");
    }
}
