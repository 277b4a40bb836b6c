use rustc_hash::FxHashMap;

use crate::foundation::error::{GlyphgridError, GlyphgridResult};
use crate::render::frame::Tile;
use crate::render::raster::TileRasterizer;
use crate::scene::dot::{Dot, DotKey};

/// Cache hit/miss counters, exposed for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Distinct dots registered so far.
    pub registered: u64,
    /// Tiles actually rasterized (first-sight misses).
    pub rasterized: u64,
    /// Lookups answered from an existing tile.
    pub hits: u64,
}

/// The consumer-owned render cache: content key → rasterized tile.
///
/// Tiles are rasterized lazily on first reference and retained for the
/// process lifetime. No eviction: distinct visual dots are bounded by
/// font x color x letter combinations in practice.
pub struct RenderCache {
    rasterizer: Box<dyn TileRasterizer>,
    registrations: FxHashMap<u64, Dot>,
    tiles: FxHashMap<u64, Tile>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new(rasterizer: Box<dyn TileRasterizer>) -> Self {
        Self {
            rasterizer,
            registrations: FxHashMap::default(),
            tiles: FxHashMap::default(),
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Record a producer registration. Re-registration of a known key is
    /// harmless (the canonical dot is identical by construction).
    pub fn register(&mut self, key: DotKey, dot: Dot) {
        if self.registrations.insert(key.0, dot).is_none() {
            self.stats.registered += 1;
        }
    }

    pub fn register_all(&mut self, registrations: impl IntoIterator<Item = (DotKey, Dot)>) {
        for (key, dot) in registrations {
            self.register(key, dot);
        }
    }

    /// Resolve a content key to its tile, rasterizing on first sight.
    ///
    /// A key that was never registered is a wire-contract violation
    /// (registration dropped or reordered) and fails fast as a `Protocol`
    /// error instead of being skipped.
    pub fn resolve(&mut self, key: DotKey) -> GlyphgridResult<&Tile> {
        if !self.tiles.contains_key(&key.0) {
            let dot = self.registrations.get(&key.0).ok_or_else(|| {
                GlyphgridError::protocol(format!(
                    "content key {:016x} referenced before registration",
                    key.0
                ))
            })?;
            let tile = self.rasterizer.rasterize(dot)?;
            self.tiles.insert(key.0, tile);
            self.stats.rasterized += 1;
        } else {
            self.stats.hits += 1;
        }
        self.tiles
            .get(&key.0)
            .ok_or_else(|| GlyphgridError::render("cache tile disappeared after insert"))
    }

    /// The registered dot for a key, if any (round-trip decoding helper).
    pub fn registered_dot(&self, key: DotKey) -> Option<&Dot> {
        self.registrations.get(&key.0)
    }

    /// Cell size of the tiles this cache produces.
    pub fn block(&self) -> crate::foundation::core::PixelSize {
        self.rasterizer.block()
    }
}
