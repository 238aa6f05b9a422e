use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Per-frame streaming statistics for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamStats {
    pub frame: u64,
    pub observers: usize,
    pub tiles_created_this_frame: usize,
    pub tiles_evicted_this_frame: usize,
    pub total_live_tiles: usize,
    /// Tiles created since the manager was built.
    pub tiles_created_total: usize,
    /// Tiles evicted since the manager was built.
    pub tiles_evicted_total: usize,
    pub frame_time: Duration,
}

/// The last `window` frames of [`StreamStats`], oldest first.
///
/// Aggregates are over the window only; lifetime totals live in the stats
/// themselves.
#[derive(Debug, Clone)]
pub struct StreamHistory {
    frames: VecDeque<StreamStats>,
    window: usize,
}

impl StreamHistory {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            frames: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Append a frame, dropping the oldest one once the window is full.
    pub fn record(&mut self, stats: StreamStats) {
        if self.frames.len() == self.window {
            self.frames.pop_front();
        }
        self.frames.push_back(stats);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn latest(&self) -> Option<&StreamStats> {
        self.frames.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamStats> {
        self.frames.iter()
    }

    fn frame_times(&self) -> impl Iterator<Item = Duration> + '_ {
        self.frames.iter().map(|s| s.frame_time)
    }

    pub fn average_frame_time(&self) -> Duration {
        if self.frames.is_empty() {
            return Duration::ZERO;
        }
        self.frame_times().sum::<Duration>() / self.frames.len() as u32
    }

    pub fn max_frame_time(&self) -> Duration {
        self.frame_times().max().unwrap_or(Duration::ZERO)
    }

    pub fn min_frame_time(&self) -> Duration {
        self.frame_times().min().unwrap_or(Duration::ZERO)
    }

    /// Highest live tile count seen in the window.
    pub fn peak_live_tiles(&self) -> usize {
        self.frames
            .iter()
            .map(|s| s.total_live_tiles)
            .max()
            .unwrap_or(0)
    }

    /// Tiles created plus tiles evicted across the window.
    pub fn churn(&self) -> usize {
        self.frames
            .iter()
            .map(|s| s.tiles_created_this_frame + s.tiles_evicted_this_frame)
            .sum()
    }
}
