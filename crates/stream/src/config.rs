use serde::{Deserialize, Serialize};

use crate::error::StreamError;
use crate::grid::GridKeyCodec;

/// How much of an observer's motion the expander covers each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Only the observer's current cell and the neighbors it is close to.
    /// A large single-frame jump can outrun generation.
    #[default]
    Neighbors,
    /// Also every cell crossed since the previous frame, up to
    /// [`StreamConfig::max_path_cells`].
    Path,
}

/// Streaming configuration: grid size, generation trigger, eviction range.
///
/// All distances are in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Edge length of one ground tile.
    pub cell_size: f32,
    /// A neighbor is requested once the observer is within
    /// `cell_size / 2 + edge_threshold` of the boundary facing it.
    pub edge_threshold: f32,
    /// Tiles whose center is farther than this from every observer are evicted.
    pub eviction_radius: f32,
    pub coverage: Coverage,
    /// Upper bound on cells walked per observer per frame in path coverage.
    pub max_path_cells: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            cell_size: 20.0,
            edge_threshold: 2.0,
            eviction_radius: 60.0,
            coverage: Coverage::Neighbors,
            max_path_cells: 256,
        }
    }
}

impl StreamConfig {
    /// Same config with the eviction radius given as a number of cells.
    pub fn with_eviction_cells(mut self, cells: f32) -> Self {
        self.eviction_radius = cells * self.cell_size;
        self
    }

    /// Farthest a requested tile's center can lie from the observer that
    /// requested it.
    ///
    /// The worst case is a cardinal neighbor: up to `cell_size + edge_threshold`
    /// along the requested axis and half a cell across it.
    pub fn generation_radius(&self) -> f32 {
        (self.cell_size + self.edge_threshold).hypot(self.cell_size * 0.5)
    }

    /// Check the invariants the streaming core relies on.
    pub fn validate(&self) -> Result<(), StreamError> {
        GridKeyCodec::new(self.cell_size)?;
        if !self.edge_threshold.is_finite()
            || self.edge_threshold < 0.0
            || self.edge_threshold >= self.cell_size * 0.5
        {
            return Err(StreamError::invalid_config(format!(
                "edge_threshold must be in [0, cell_size/2), got {} for cell_size {}",
                self.edge_threshold, self.cell_size
            )));
        }
        // Below this a tile could be evicted and re-requested by the observer
        // standing next to it.
        let min_eviction = self.generation_radius() + self.cell_size;
        if !self.eviction_radius.is_finite() || self.eviction_radius <= min_eviction {
            return Err(StreamError::invalid_config(format!(
                "eviction_radius must exceed generation radius plus one cell ({min_eviction:.2}), got {}",
                self.eviction_radius
            )));
        }
        if self.max_path_cells == 0 {
            return Err(StreamError::invalid_config("max_path_cells must be at least 1"));
        }
        Ok(())
    }
}
