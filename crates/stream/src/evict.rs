use glam::{DVec2, Vec3};

use crate::factory::TileFactory;
use crate::grid::{CellCoord, GridKeyCodec};
use crate::store::TileStore;

/// Removes tiles whose center is farther than the eviction radius from every
/// observer. Distances are measured on the ground plane, in f64 so that squared
/// distances stay finite for any grid the codec accepts.
#[derive(Debug, Clone, Copy)]
pub struct EvictionSweeper {
    codec: GridKeyCodec,
    eviction_radius: f32,
}

impl EvictionSweeper {
    pub fn new(codec: GridKeyCodec, eviction_radius: f32) -> Self {
        Self {
            codec,
            eviction_radius,
        }
    }

    pub fn eviction_radius(&self) -> f32 {
        self.eviction_radius
    }

    /// Distance from the center of `cell` to the nearest observer, or `None`
    /// when there are no observers.
    pub fn nearest_distance(&self, cell: CellCoord, observers: &[Vec3]) -> Option<f64> {
        let center = self.codec.to_center(cell);
        let center = DVec2::new(center.x as f64, center.z as f64);
        observers
            .iter()
            .map(|p| center.distance_squared(DVec2::new(p.x as f64, p.z as f64)))
            .min_by(f64::total_cmp)
            .map(f64::sqrt)
    }

    /// Whether at least one observer is within range of `cell`.
    pub fn in_range(&self, cell: CellCoord, observers: &[Vec3]) -> bool {
        self.nearest_distance(cell, observers)
            .is_some_and(|d| d <= self.eviction_radius as f64)
    }

    /// Cells that should be evicted this frame. Tiles created during `frame`
    /// are never selected.
    pub fn doomed<H>(&self, store: &TileStore<H>, observers: &[Vec3], frame: u64) -> Vec<CellCoord> {
        let mut doomed = Vec::new();
        store.for_each(|cell, tile| {
            if tile.created_frame != frame && !self.in_range(cell, observers) {
                doomed.push(cell);
            }
        });
        doomed
    }

    /// Evict out-of-range tiles and hand their handles back to the factory.
    /// Returns the evicted cells.
    pub fn sweep<F: TileFactory>(
        &self,
        store: &mut TileStore<F::Handle>,
        factory: &mut F,
        observers: &[Vec3],
        frame: u64,
    ) -> Vec<CellCoord> {
        let doomed = self.doomed(store, observers, frame);
        for cell in &doomed {
            if let Some(tile) = store.remove(*cell) {
                tracing::debug!(%cell, frame, "evicting tile");
                factory.dispose(tile.handle);
            }
        }
        doomed
    }
}
