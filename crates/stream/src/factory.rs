use std::collections::HashSet;

use glam::Vec3;

/// Creates and disposes the renderable object behind a tile.
///
/// Both calls are synchronous and assumed to succeed. Failures inside the
/// renderer are the implementor's to handle.
pub trait TileFactory {
    /// Opaque handle the renderer uses to find the tile again.
    type Handle;

    /// Instantiate and register a tile whose minimum corner is `origin`.
    fn create(&mut self, origin: Vec3) -> Self::Handle;

    /// Remove the tile from the render graph and release its resources.
    fn dispose(&mut self, handle: Self::Handle);
}

/// Headless factory that hands out sequential ids and tracks which are live.
///
/// Used by benchmarks, tests and any driver without a renderer attached.
#[derive(Debug, Default)]
pub struct CountingFactory {
    next: u64,
    live: HashSet<u64>,
    disposed: usize,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total handles ever created.
    pub fn created(&self) -> usize {
        self.next as usize
    }

    /// Total handles disposed.
    pub fn disposed(&self) -> usize {
        self.disposed
    }

    /// Handles created and not yet disposed.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: u64) -> bool {
        self.live.contains(&handle)
    }
}

impl TileFactory for CountingFactory {
    type Handle = u64;

    fn create(&mut self, _origin: Vec3) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.live.insert(handle);
        handle
    }

    fn dispose(&mut self, handle: u64) {
        if self.live.remove(&handle) {
            self.disposed += 1;
        } else {
            tracing::warn!(handle, "dispose of unknown tile handle");
        }
    }
}
