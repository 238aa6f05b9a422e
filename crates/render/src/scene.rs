use std::collections::BTreeMap;

use glam::Vec3;
use wanderfield_stream::TileFactory;

/// Handle to a tile node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileHandle(pub u64);

/// How ground tiles are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStyle {
    pub wireframe: bool,
    pub color: [f32; 4],
    /// Grid lines per tile edge, not counting the border.
    pub divisions: u32,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            wireframe: true,
            color: [0.0, 1.0, 1.0, 0.8],
            divisions: 3,
        }
    }
}

/// A ground tile registered in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TileNode {
    /// Minimum corner on the ground plane.
    pub origin: Vec3,
    pub size: f32,
    pub style: TileStyle,
}

impl TileNode {
    /// Line segments of the tile's wireframe grid: `divisions + 2` lines along
    /// each axis, border included.
    pub fn wireframe_lines(&self) -> Vec<[Vec3; 2]> {
        let steps = self.style.divisions + 1;
        let spacing = self.size / steps as f32;
        let mut lines = Vec::with_capacity(2 * (steps as usize + 1));
        for i in 0..=steps {
            let offset = i as f32 * spacing;
            lines.push([
                self.origin + Vec3::new(offset, 0.0, 0.0),
                self.origin + Vec3::new(offset, 0.0, self.size),
            ]);
            lines.push([
                self.origin + Vec3::new(0.0, 0.0, offset),
                self.origin + Vec3::new(self.size, 0.0, offset),
            ]);
        }
        lines
    }
}

/// In-memory render graph of ground tiles.
///
/// Implements [`TileFactory`] so the streaming manager registers a node when
/// it creates a tile and removes it again on eviction.
#[derive(Debug)]
pub struct SceneGraph {
    tile_size: f32,
    style: TileStyle,
    nodes: BTreeMap<TileHandle, TileNode>,
    next: u64,
    disposed_total: u64,
}

impl SceneGraph {
    pub fn new(tile_size: f32) -> Self {
        Self::with_style(tile_size, TileStyle::default())
    }

    pub fn with_style(tile_size: f32, style: TileStyle) -> Self {
        Self {
            tile_size,
            style,
            nodes: BTreeMap::new(),
            next: 0,
            disposed_total: 0,
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn node(&self, handle: TileHandle) -> Option<&TileNode> {
        self.nodes.get(&handle)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&TileHandle, &TileNode)> {
        self.nodes.iter()
    }

    /// Nodes currently in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn registered_total(&self) -> u64 {
        self.next
    }

    pub fn disposed_total(&self) -> u64 {
        self.disposed_total
    }

    /// Total wireframe segments a GPU backend would upload for the scene.
    pub fn line_count(&self) -> usize {
        self.nodes
            .values()
            .map(|n| 2 * (n.style.divisions as usize + 2))
            .sum()
    }
}

impl TileFactory for SceneGraph {
    type Handle = TileHandle;

    fn create(&mut self, origin: Vec3) -> TileHandle {
        let handle = TileHandle(self.next);
        self.next += 1;
        self.nodes.insert(
            handle,
            TileNode {
                origin,
                size: self.tile_size,
                style: self.style,
            },
        );
        handle
    }

    fn dispose(&mut self, handle: TileHandle) {
        match self.nodes.remove(&handle) {
            Some(_) => self.disposed_total += 1,
            None => tracing::warn!(?handle, "dispose of unknown tile node"),
        }
    }
}
