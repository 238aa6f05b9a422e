use glam::Vec3;

use crate::error::StreamError;
use crate::factory::TileFactory;
use crate::grid::{CellCoord, Direction, GridKeyCodec};
use crate::store::{Tile, TileStore};

/// Decides which cells an observer is about to need and creates the missing ones.
///
/// An observer always gets its own cell. A cardinal neighbor is requested once
/// the observer is within `cell_size / 2 + edge_threshold` of the boundary
/// facing it, so for the +x neighbor the trigger is
/// `local_x > cell_size / 2 - edge_threshold`.
///
/// The expander does not de-duplicate across observers; the store's
/// insert-if-absent contract does.
#[derive(Debug, Clone, Copy)]
pub struct ProximityExpander {
    codec: GridKeyCodec,
    edge_threshold: f32,
}

impl ProximityExpander {
    pub fn new(codec: GridKeyCodec, edge_threshold: f32) -> Self {
        Self {
            codec,
            edge_threshold,
        }
    }

    /// Cells required by an observer at `position`: its own cell first, then
    /// each triggered neighbor.
    pub fn requested_cells(&self, position: Vec3) -> Result<Vec<CellCoord>, StreamError> {
        let cell = self.codec.to_cell(position)?;
        let size = self.codec.cell_size();
        let (local_x, local_z) = self.codec.local_offset(position, cell);
        let reach = size * 0.5 + self.edge_threshold;

        let mut cells = Vec::with_capacity(5);
        cells.push(cell);
        for dir in Direction::ALL {
            let to_edge = match dir {
                Direction::PosX => size - local_x,
                Direction::NegX => local_x,
                Direction::PosZ => size - local_z,
                Direction::NegZ => local_z,
            };
            if to_edge < reach {
                let neighbor = cell
                    .neighbor(dir)
                    .ok_or(StreamError::CoordinateOverflow {
                        x: position.x,
                        z: position.z,
                    })?;
                cells.push(neighbor);
            }
        }
        Ok(cells)
    }

    /// Cells required by an observer that moved from `from` to `to` this frame:
    /// every cell crossed on the way (capped at `max_cells`), then the cells
    /// requested at `to`.
    pub fn requested_along(
        &self,
        from: Vec3,
        to: Vec3,
        max_cells: usize,
    ) -> Result<Vec<CellCoord>, StreamError> {
        let mut cells = self.codec.cells_along(from, to, max_cells)?;
        cells.extend(self.requested_cells(to)?);
        Ok(cells)
    }

    /// Create tiles for every cell in `cells` that the store does not hold yet.
    /// Returns the cells that were created.
    pub fn ensure<F: TileFactory>(
        &self,
        cells: &[CellCoord],
        store: &mut TileStore<F::Handle>,
        factory: &mut F,
        frame: u64,
    ) -> Vec<CellCoord> {
        let mut created = Vec::new();
        for &cell in cells {
            let origin = self.codec.to_origin(cell);
            let inserted = store.insert_with(cell, || Tile {
                cell,
                origin,
                handle: factory.create(origin),
                created_frame: frame,
            });
            if inserted {
                tracing::debug!(%cell, frame, "creating tile");
                created.push(cell);
            }
        }
        created
    }

    /// Expand around a single observer. Returns the cells that were created.
    pub fn expand<F: TileFactory>(
        &self,
        position: Vec3,
        store: &mut TileStore<F::Handle>,
        factory: &mut F,
        frame: u64,
    ) -> Result<Vec<CellCoord>, StreamError> {
        let cells = self.requested_cells(position)?;
        Ok(self.ensure(&cells, store, factory, frame))
    }
}
