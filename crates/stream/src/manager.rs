use std::time::Instant;

use glam::Vec3;
use serde::Serialize;

use crate::config::{Coverage, StreamConfig};
use crate::error::StreamError;
use crate::evict::EvictionSweeper;
use crate::expand::ProximityExpander;
use crate::factory::TileFactory;
use crate::grid::{CellCoord, GridKeyCodec};
use crate::stats::{StreamHistory, StreamStats};
use crate::store::TileStore;

const HISTORY_WINDOW: usize = 120;

/// Where an observer was last frame and where it is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPath {
    pub from: Vec3,
    pub to: Vec3,
}

impl ObserverPath {
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }

    /// An observer that did not move (or just appeared).
    pub fn stationary(at: Vec3) -> Self {
        Self { from: at, to: at }
    }
}

/// Cells created and evicted by one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub created: Vec<CellCoord>,
    pub evicted: Vec<CellCoord>,
}

/// Owns the live tiles and runs the per-frame streaming pass.
///
/// Each tick first expands around every observer, then sweeps the whole store
/// once against the same observer positions. Observers are not remembered
/// between ticks; the caller passes the current set every frame.
pub struct StreamingManager<F: TileFactory> {
    config: StreamConfig,
    codec: GridKeyCodec,
    expander: ProximityExpander,
    sweeper: EvictionSweeper,
    store: TileStore<F::Handle>,
    factory: F,
    frame: u64,
    stats: StreamStats,
    history: StreamHistory,
}

impl<F: TileFactory> StreamingManager<F> {
    /// Validate `config` and build a manager with an empty world.
    pub fn new(config: StreamConfig, factory: F) -> Result<Self, StreamError> {
        config.validate()?;
        let codec = GridKeyCodec::new(config.cell_size)?;
        Ok(Self {
            config,
            codec,
            expander: ProximityExpander::new(codec, config.edge_threshold),
            sweeper: EvictionSweeper::new(codec, config.eviction_radius),
            store: TileStore::new(),
            factory,
            frame: 0,
            stats: StreamStats::default(),
            history: StreamHistory::new(HISTORY_WINDOW),
        })
    }

    /// Run one frame with the observers' current positions.
    ///
    /// If any position cannot be mapped to the grid the error is returned and
    /// the store is left untouched.
    pub fn tick(&mut self, observers: &[Vec3]) -> Result<FrameReport, StreamError> {
        let _span = tracing::info_span!("stream_tick", observers = observers.len()).entered();
        let start = Instant::now();

        let mut requests = Vec::with_capacity(observers.len() * 5);
        for &position in observers {
            requests.extend(self.expander.requested_cells(position)?);
        }
        Ok(self.apply(&requests, observers, start))
    }

    /// Run one frame from each observer's motion since the last frame.
    ///
    /// With [`Coverage::Path`] every cell crossed on the way is generated as
    /// well; with [`Coverage::Neighbors`] this is `tick` on the `to` positions.
    pub fn tick_paths(&mut self, paths: &[ObserverPath]) -> Result<FrameReport, StreamError> {
        let _span = tracing::info_span!("stream_tick", observers = paths.len()).entered();
        let start = Instant::now();

        let mut requests = Vec::with_capacity(paths.len() * 5);
        for path in paths {
            let cells = match self.config.coverage {
                Coverage::Neighbors => self.expander.requested_cells(path.to)?,
                Coverage::Path => {
                    self.expander
                        .requested_along(path.from, path.to, self.config.max_path_cells)?
                }
            };
            requests.extend(cells);
        }
        let observers: Vec<Vec3> = paths.iter().map(|p| p.to).collect();
        Ok(self.apply(&requests, &observers, start))
    }

    fn apply(&mut self, requests: &[CellCoord], observers: &[Vec3], start: Instant) -> FrameReport {
        self.frame += 1;
        let frame = self.frame;

        let created = self
            .expander
            .ensure(requests, &mut self.store, &mut self.factory, frame);
        let evicted = self
            .sweeper
            .sweep(&mut self.store, &mut self.factory, observers, frame);

        let frame_time = start.elapsed();
        self.stats = StreamStats {
            frame,
            observers: observers.len(),
            tiles_created_this_frame: created.len(),
            tiles_evicted_this_frame: evicted.len(),
            total_live_tiles: self.store.len(),
            tiles_created_total: self.stats.tiles_created_total + created.len(),
            tiles_evicted_total: self.stats.tiles_evicted_total + evicted.len(),
            frame_time,
        };
        self.history.record(self.stats.clone());

        tracing::trace!(
            frame,
            created = created.len(),
            evicted = evicted.len(),
            live = self.store.len(),
            "stream tick complete"
        );

        FrameReport {
            frame,
            created,
            evicted,
        }
    }

    /// Dispose every live tile. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let tiles = self.store.drain();
        let count = tiles.len();
        for tile in tiles {
            self.factory.dispose(tile.handle);
        }
        tracing::debug!(count, "cleared all tiles");
        count
    }

    /// Release every tile and hand the factory back.
    pub fn into_factory(mut self) -> F {
        self.clear();
        self.factory
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn codec(&self) -> &GridKeyCodec {
        &self.codec
    }

    pub fn store(&self) -> &TileStore<F::Handle> {
        &self.store
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether a tile is live at `cell`.
    pub fn is_live(&self, cell: CellCoord) -> bool {
        self.store.has(cell)
    }

    pub fn live_tiles(&self) -> usize {
        self.store.len()
    }

    /// Statistics from the last tick.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Statistics of the most recent ticks.
    pub fn history(&self) -> &StreamHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CountingFactory;

    fn manager() -> StreamingManager<CountingFactory> {
        StreamingManager::new(StreamConfig::default(), CountingFactory::new()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = StreamConfig {
            eviction_radius: 10.0,
            ..StreamConfig::default()
        };
        assert!(StreamingManager::new(config, CountingFactory::new()).is_err());
    }

    #[test]
    fn first_tick_creates_own_cell() {
        let mut m = manager();
        let report = m.tick(&[Vec3::ZERO]).unwrap();
        assert_eq!(report.frame, 1);
        assert!(m.is_live(CellCoord::ORIGIN));
        assert!(report.evicted.is_empty());
        assert_eq!(m.stats().tiles_created_this_frame, report.created.len());
        assert_eq!(m.stats().total_live_tiles, m.live_tiles());
    }

    #[test]
    fn store_and_factory_agree() {
        let mut m = manager();
        for i in 0..200 {
            let x = i as f32 * 3.7;
            m.tick(&[Vec3::new(x, 0.0, -x * 0.5), Vec3::new(-x, 0.0, 0.0)])
                .unwrap();
            assert_eq!(m.live_tiles(), m.factory().live());
        }
        assert_eq!(
            m.stats().tiles_created_total - m.stats().tiles_evicted_total,
            m.live_tiles()
        );
    }

    #[test]
    fn bad_observer_leaves_store_untouched() {
        let mut m = manager();
        m.tick(&[Vec3::ZERO]).unwrap();
        let before = m.live_tiles();
        let err = m
            .tick(&[Vec3::new(500.0, 0.0, 0.0), Vec3::new(f32::NAN, 0.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, StreamError::NonFinitePosition { .. }));
        assert_eq!(m.live_tiles(), before);
        assert_eq!(m.frame(), 1);
    }

    #[test]
    fn zero_observers_empties_world() {
        let mut m = manager();
        m.tick(&[Vec3::new(10.0, 0.0, 10.0)]).unwrap();
        assert!(m.live_tiles() > 0);
        let report = m.tick(&[]).unwrap();
        assert_eq!(m.live_tiles(), 0);
        assert!(report.created.is_empty());
        assert_eq!(m.factory().live(), 0);
    }

    #[test]
    fn neighbor_coverage_ignores_path_origin() {
        let mut m = manager();
        let path = ObserverPath::new(Vec3::ZERO, Vec3::new(300.0, 0.0, 0.0));
        m.tick_paths(&[path]).unwrap();
        assert!(!m.is_live(CellCoord::new(5, 0)));
        assert!(m.is_live(CellCoord::new(15, 0)));
    }

    #[test]
    fn path_coverage_walks_crossed_cells() {
        let config = StreamConfig {
            coverage: Coverage::Path,
            ..StreamConfig::default()
        };
        let mut m = StreamingManager::new(config, CountingFactory::new()).unwrap();
        let path = ObserverPath::new(Vec3::new(10.0, 0.0, 10.0), Vec3::new(310.0, 0.0, 10.0));
        let report = m.tick_paths(&[path]).unwrap();
        for x in 0..=15 {
            assert!(report.created.contains(&CellCoord::new(x, 0)), "missing ({x}, 0)");
        }
        // Walked cells far behind are released on the following frame.
        m.tick_paths(&[ObserverPath::stationary(Vec3::new(310.0, 0.0, 10.0))])
            .unwrap();
        assert!(!m.is_live(CellCoord::new(0, 0)));
        assert!(m.is_live(CellCoord::new(15, 0)));
    }

    #[test]
    fn clear_and_into_factory_release_everything() {
        let mut m = manager();
        m.tick(&[Vec3::new(10.0, 0.0, 10.0)]).unwrap();
        let live = m.live_tiles();
        assert_eq!(m.clear(), live);
        m.tick(&[Vec3::new(10.0, 0.0, 10.0)]).unwrap();
        let factory = m.into_factory();
        assert_eq!(factory.live(), 0);
        assert_eq!(factory.created(), factory.disposed());
    }

    #[test]
    fn observer_on_a_tile_origin_keys_to_that_tile() {
        let config = StreamConfig {
            cell_size: 3.3,
            edge_threshold: 0.3,
            eviction_radius: 10.0,
            ..StreamConfig::default()
        };
        for x in -60..60 {
            let cell = CellCoord::new(x, -x / 2);
            let mut m = StreamingManager::new(config, CountingFactory::new()).unwrap();
            let at = m.codec().to_origin(cell);
            let mut report = m.tick(&[at]).unwrap();
            report.created.sort();

            let mut expected = vec![
                cell,
                CellCoord::new(cell.x - 1, cell.z),
                CellCoord::new(cell.x, cell.z - 1),
            ];
            expected.sort();
            assert_eq!(report.created, expected, "observer at origin of {cell}");
        }
    }

    #[test]
    fn stationary_observer_on_huge_cells_does_not_thrash() {
        let config = StreamConfig {
            cell_size: 1.0e20,
            edge_threshold: 0.0,
            eviction_radius: 3.0e20,
            ..StreamConfig::default()
        };
        let mut m = StreamingManager::new(config, CountingFactory::new()).unwrap();
        let at = Vec3::new(9.0e19, 0.0, 5.0e19);

        let first = m.tick(&[at]).unwrap();
        assert_eq!(first.created.len(), 2);
        for _ in 0..3 {
            let report = m.tick(&[at]).unwrap();
            assert!(report.created.is_empty());
            assert!(report.evicted.is_empty());
        }
        assert_eq!(m.live_tiles(), 2);
    }

    #[test]
    fn history_records_each_tick() {
        let mut m = manager();
        for _ in 0..5 {
            m.tick(&[Vec3::ZERO]).unwrap();
        }
        assert_eq!(m.history().len(), 5);
        assert_eq!(m.history().latest(), Some(m.stats()));
        assert_eq!(m.stats().frame, 5);
        // Only the first tick created anything.
        assert_eq!(m.history().churn(), m.stats().tiles_created_total);
    }
}
