use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::Vec3;

use crate::grid::CellCoord;

/// A live ground tile.
///
/// `handle` belongs to the tile factory; the streaming core only carries it
/// from creation to disposal.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile<H> {
    pub cell: CellCoord,
    /// Minimum corner of the cell in world space.
    pub origin: Vec3,
    pub handle: H,
    /// Frame in which the tile was created.
    pub created_frame: u64,
}

/// The set of live tiles, at most one per cell.
#[derive(Debug)]
pub struct TileStore<H> {
    tiles: HashMap<CellCoord, Tile<H>>,
}

impl<H> Default for TileStore<H> {
    fn default() -> Self {
        Self {
            tiles: HashMap::new(),
        }
    }
}

impl<H> TileStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tile exists for `cell`.
    pub fn has(&self, cell: CellCoord) -> bool {
        self.tiles.contains_key(&cell)
    }

    pub fn get(&self, cell: CellCoord) -> Option<&Tile<H>> {
        self.tiles.get(&cell)
    }

    /// Insert a tile under its own cell. Returns `false` and drops `tile` if
    /// the cell is already occupied; the existing tile is kept.
    pub fn insert(&mut self, tile: Tile<H>) -> bool {
        match self.tiles.entry(tile.cell) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(tile);
                true
            }
        }
    }

    /// Insert the tile built by `make` only if `cell` is vacant. `make` is not
    /// called for an occupied cell. Returns whether a tile was inserted.
    pub fn insert_with(&mut self, cell: CellCoord, make: impl FnOnce() -> Tile<H>) -> bool {
        match self.tiles.entry(cell) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let tile = make();
                debug_assert_eq!(tile.cell, cell, "tile built for the wrong cell");
                slot.insert(tile);
                true
            }
        }
    }

    /// Remove and return the tile for `cell`, if any.
    pub fn remove(&mut self, cell: CellCoord) -> Option<Tile<H>> {
        self.tiles.remove(&cell)
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate over live tiles. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Tile<H>)> {
        self.tiles.iter().map(|(cell, tile)| (*cell, tile))
    }

    /// Visit every live tile. The store cannot change during the visit, so
    /// callers collect removals and apply them afterwards.
    pub fn for_each(&self, mut f: impl FnMut(CellCoord, &Tile<H>)) {
        for (cell, tile) in &self.tiles {
            f(*cell, tile);
        }
    }

    /// Snapshot of the occupied cells.
    pub fn cells(&self) -> Vec<CellCoord> {
        self.tiles.keys().copied().collect()
    }

    /// Remove every tile, returning them for disposal.
    pub fn drain(&mut self) -> Vec<Tile<H>> {
        self.tiles.drain().map(|(_, tile)| tile).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: i32, z: i32, handle: u32) -> Tile<u32> {
        Tile {
            cell: CellCoord::new(x, z),
            origin: Vec3::new(x as f32, 0.0, z as f32),
            handle,
            created_frame: 0,
        }
    }

    #[test]
    fn empty_store() {
        let store: TileStore<u32> = TileStore::new();
        assert!(store.is_empty());
        assert!(!store.has(CellCoord::ORIGIN));
    }

    #[test]
    fn duplicate_insert_keeps_first_tile() {
        let mut store = TileStore::new();
        assert!(store.insert(tile(1, 2, 10)));
        assert!(!store.insert(tile(1, 2, 20)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(CellCoord::new(1, 2)).unwrap().handle, 10);
    }

    #[test]
    fn insert_with_skips_builder_when_occupied() {
        let mut store = TileStore::new();
        store.insert(tile(0, 0, 1));
        let mut called = false;
        let inserted = store.insert_with(CellCoord::ORIGIN, || {
            called = true;
            tile(0, 0, 2)
        });
        assert!(!inserted);
        assert!(!called);
    }

    #[test]
    fn remove_returns_tile_and_absent_remove_is_noop() {
        let mut store = TileStore::new();
        store.insert(tile(3, -3, 7));
        let removed = store.remove(CellCoord::new(3, -3)).unwrap();
        assert_eq!(removed.handle, 7);
        assert!(store.remove(CellCoord::new(3, -3)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_then_remove_visits_everything_once() {
        let mut store = TileStore::new();
        for i in 0..50 {
            store.insert(tile(i, -i, i as u32));
        }
        let mut doomed = Vec::new();
        store.for_each(|cell, t| {
            if t.handle % 2 == 0 {
                doomed.push(cell);
            }
        });
        for cell in &doomed {
            assert!(store.remove(*cell).is_some());
        }
        assert_eq!(doomed.len(), 25);
        assert_eq!(store.len(), 25);
        assert!(store.iter().all(|(_, t)| t.handle % 2 == 1));
    }

    #[test]
    fn drain_empties_store() {
        let mut store = TileStore::new();
        store.insert(tile(0, 0, 1));
        store.insert(tile(0, 1, 2));
        let drained = store.drain();
        assert_eq!(drained.len(), 2);
        assert!(store.is_empty());
    }
}
