//! Bounded read-through memo caches for the repeated geometry computations of batch runs.
//!
//! Caching never changes a result: every entry is keyed by the full input tuple and errors are
//! not stored. A [`GeometryCache`] is an ordinary value owned by whoever runs the estimates, so
//! its lifetime and invalidation ([`GeometryCache::clear`]) are explicit.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{ImageSize, TileGrid};
use crate::error::Result;
use crate::geometry::resize_to_multiple;
use crate::tiles::{best_grid_among, enumerate_tile_grids};

/// Hit/miss counters of one cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub name: &'static str,
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

struct Arena<K, V> {
    slots: Vec<(K, V)>,
    index: HashMap<K, usize>,
    /// Slot overwritten by the next insert once the arena is full.
    next_victim: usize,
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self { slots: Vec::new(), index: HashMap::new(), next_victim: 0 }
    }
}

/// Fixed-capacity memo table: an arena of slots plus a key → slot index.
///
/// Lookups share a read lock. A miss computes outside the lock and inserts under a short write
/// lock, so distinct keys never wait on each other's computation. When full, slots are reused in
/// insertion order.
pub struct MemoCache<K, V> {
    name: &'static str,
    capacity: usize,
    arena: RwLock<Arena<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// A capacity of zero disables storage; every lookup then computes.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            arena: RwLock::new(Arena::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        arena.index.get(key).map(|&slot| arena.slots[slot].1.clone())
    }

    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<V, E> {
        if let Some(value) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        match self.get_or_try_insert_with::<Infallible>(key, || Ok(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have filled the same key while we computed.
        if arena.index.contains_key(&key) {
            return;
        }

        if arena.slots.len() < self.capacity {
            let slot = arena.slots.len();
            arena.slots.push((key.clone(), value));
            arena.index.insert(key, slot);
            return;
        }

        let slot = arena.next_victim;
        let (evicted, _) = std::mem::replace(&mut arena.slots[slot], (key.clone(), value));
        arena.index.remove(&evicted);
        arena.index.insert(key, slot);
        arena.next_victim = (slot + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.arena.read().unwrap_or_else(PoisonError::into_inner).slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        *arena = Arena::default();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}

type ResizeKey = (u32, u32, u32, u64, u64);
type GridRangeKey = (u32, u32);
type OptimalGridKey = (ImageSize, ImageSize, u32, u32);

/// Memo caches for `resize_to_multiple`, `enumerate_tile_grids` and `choose_optimal_tile_grid`.
pub struct GeometryCache {
    resize: MemoCache<ResizeKey, (u32, u32)>,
    grids: MemoCache<GridRangeKey, Arc<[TileGrid]>>,
    optimal: MemoCache<OptimalGridKey, TileGrid>,
}

impl GeometryCache {
    pub const RESIZE_CAPACITY: usize = 1024;
    pub const GRID_CAPACITY: usize = 10;
    pub const OPTIMAL_GRID_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacities(
            Self::RESIZE_CAPACITY,
            Self::GRID_CAPACITY,
            Self::OPTIMAL_GRID_CAPACITY,
        )
    }

    pub fn with_capacities(resize: usize, grids: usize, optimal: usize) -> Self {
        Self {
            resize: MemoCache::new("resize_to_multiple", resize),
            grids: MemoCache::new("enumerate_tile_grids", grids),
            optimal: MemoCache::new("choose_optimal_tile_grid", optimal),
        }
    }

    /// Pass-through cache that never stores anything.
    pub fn disabled() -> Self {
        Self::with_capacities(0, 0, 0)
    }

    pub fn resize_to_multiple(
        &self,
        height: u32,
        width: u32,
        factor: u32,
        min_pixels: u64,
        max_pixels: u64,
    ) -> Result<(u32, u32)> {
        self.resize.get_or_try_insert_with((height, width, factor, min_pixels, max_pixels), || {
            resize_to_multiple(height, width, factor, min_pixels, max_pixels)
        })
    }

    pub fn tile_grids(&self, min_tiles: u32, max_tiles: u32) -> Arc<[TileGrid]> {
        self.grids
            .get_or_insert_with((min_tiles, max_tiles), || enumerate_tile_grids(min_tiles, max_tiles).into())
    }

    pub fn optimal_tile_grid(
        &self,
        original: ImageSize,
        tile_size: ImageSize,
        min_tiles: u32,
        max_tiles: u32,
    ) -> Result<TileGrid> {
        self.optimal.get_or_try_insert_with((original, tile_size, min_tiles, max_tiles), || {
            let candidates = self.tile_grids(min_tiles, max_tiles);
            best_grid_among(original, tile_size, &candidates)
        })
    }

    pub fn stats(&self) -> [CacheStats; 3] {
        [self.resize.stats(), self.grids.stats(), self.optimal.stats()]
    }

    pub fn clear(&self) {
        self.resize.clear();
        self.grids.clear();
        self.optimal.clear();
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}
