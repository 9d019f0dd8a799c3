//! Per-system profiling with a rolling sample window.
//!
//! The scheduler wraps every system invocation in a [`ScopeTimer`]; the
//! resulting samples land here, where cached rolling statistics are kept
//! for display by whatever overlay or log consumer cares.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Rolling statistics for one named system.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileStats {
    pub last_ms: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub samples: usize,
}

/// Collects `(system name, elapsed ms)` samples and keeps rolling stats
/// over a bounded window per system.
pub struct Profiler {
    window: usize,
    frame_samples: HashMap<String, f64>,
    history: HashMap<String, VecDeque<f64>>,
    stats: HashMap<String, ProfileStats>,
}

impl Profiler {
    /// Create a profiler keeping `window` samples per system.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            frame_samples: HashMap::new(),
            history: HashMap::new(),
            stats: HashMap::new(),
        }
    }

    /// Clear the per-frame sample map. Call once at the top of each frame.
    pub fn begin_frame(&mut self) {
        self.frame_samples.clear();
    }

    /// Record one timing sample for a system.
    pub fn submit_sample(&mut self, name: &str, ms: f64) {
        self.frame_samples.insert(name.to_owned(), ms);

        let history = self.history.entry(name.to_owned()).or_default();
        history.push_back(ms);
        if history.len() > self.window {
            history.pop_front();
        }

        let mut min_ms = f64::INFINITY;
        let mut max_ms = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &sample in history.iter() {
            min_ms = min_ms.min(sample);
            max_ms = max_ms.max(sample);
            sum += sample;
        }

        self.stats.insert(
            name.to_owned(),
            ProfileStats {
                last_ms: ms,
                avg_ms: sum / history.len() as f64,
                min_ms,
                max_ms,
                samples: history.len(),
            },
        );
    }

    /// Cached rolling stats per system.
    pub fn stats(&self) -> &HashMap<String, ProfileStats> {
        &self.stats
    }

    /// Samples submitted since the last `begin_frame`.
    pub fn last_frame_samples(&self) -> &HashMap<String, f64> {
        &self.frame_samples
    }

    /// Resize the rolling window, trimming existing histories.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        for history in self.history.values_mut() {
            while history.len() > self.window {
                history.pop_front();
            }
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new(120)
    }
}

/// Measures elapsed wall time from construction to [`ScopeTimer::finish`].
pub struct ScopeTimer<'p> {
    profiler: &'p mut Profiler,
    name: String,
    start: Instant,
}

impl<'p> ScopeTimer<'p> {
    pub fn new(profiler: &'p mut Profiler, name: impl Into<String>) -> Self {
        Self {
            profiler,
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Stop the timer and submit the sample.
    pub fn finish(self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.profiler.submit_sample(&self.name, ms);
    }
}
