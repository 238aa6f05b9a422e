//! Streaming: procedural ground tiles around moving observers.
//!
//! # Invariants
//! - At most one tile per cell; creation is insert-if-absent.
//! - `to_cell(to_origin(c)) == c` exactly for every addressable cell, for any
//!   cell size.
//! - Expansion runs before eviction within a frame, against the same positions.
//! - A tile is never evicted in the frame it was created.
//! - The eviction radius exceeds the generation radius by at least one cell,
//!   so an observer never evicts a tile it would immediately request again.
//!
//! The store is owned by [`StreamingManager`]; observers are handed in on every
//! tick and never retained.

mod config;
mod error;
mod evict;
mod expand;
mod factory;
mod grid;
mod manager;
mod stats;
mod store;

pub use config::{Coverage, StreamConfig};
pub use error::StreamError;
pub use evict::EvictionSweeper;
pub use expand::ProximityExpander;
pub use factory::{CountingFactory, TileFactory};
pub use grid::{CellCoord, Direction, GridKeyCodec};
pub use manager::{FrameReport, ObserverPath, StreamingManager};
pub use stats::{StreamHistory, StreamStats};
pub use store::{Tile, TileStore};

pub fn crate_info() -> &'static str {
    "wanderfield-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
