// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rolling per-system timing windows.

use crate::ring::RingBuffer;
use serde::Serialize;
use std::collections::HashMap;
use talos_core::CapabilityId;

/// Samples retained per system: one second of history at 60 Hz.
pub const SAMPLE_WINDOW: usize = 60;

/// Aggregated view over one system's timing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    /// Number of samples currently in the window.
    pub samples: usize,
    /// Duration of the most recent recorded update, in milliseconds.
    pub last_ms: f64,
    /// Mean duration over the window, in milliseconds.
    pub average_ms: f64,
}

impl ProfileSnapshot {
    fn empty() -> Self {
        Self {
            samples: 0,
            last_ms: 0.0,
            average_ms: 0.0,
        }
    }
}

/// Records how long each system's update takes, keeping a rolling window per
/// system.
///
/// Purely observational: nothing in scheduling decisions reads these numbers.
/// When disabled, `record` is a no-op and existing windows keep their data.
#[derive(Debug)]
pub struct FrameProfiler {
    enabled: bool,
    windows: HashMap<CapabilityId, RingBuffer<f64, SAMPLE_WINDOW>>,
}

impl FrameProfiler {
    /// Creates a profiler, initially enabled or not per configuration.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            windows: HashMap::new(),
        }
    }

    /// Whether update invocations should currently be timed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns timing on or off at runtime.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!(
                "Frame profiling {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
    }

    /// Ensures a window exists for `key`. Idempotent; existing samples are
    /// kept.
    pub fn track(&mut self, key: CapabilityId) {
        self.windows.entry(key).or_default();
    }

    /// Drops the window for `key`, if any.
    pub fn forget(&mut self, key: &CapabilityId) {
        self.windows.remove(key);
    }

    /// Records one update duration for `key`, in milliseconds.
    pub fn record(&mut self, key: CapabilityId, ms: f64) {
        if !self.enabled {
            return;
        }
        log::trace!("{key} update took {ms:.3} ms");
        self.windows.entry(key).or_default().push(ms);
    }

    /// The most recent sample for `key`, `0.0` when none exist.
    pub fn last_ms(&self, key: &CapabilityId) -> f64 {
        self.windows
            .get(key)
            .and_then(|w| w.latest())
            .unwrap_or(0.0)
    }

    /// The window mean for `key`, `0.0` when no samples exist.
    pub fn average_ms(&self, key: &CapabilityId) -> f64 {
        self.windows.get(key).map(|w| w.average()).unwrap_or(0.0)
    }

    /// An aggregated snapshot for `key`; zeroed when `key` is untracked.
    pub fn snapshot(&self, key: &CapabilityId) -> ProfileSnapshot {
        match self.windows.get(key) {
            Some(window) => ProfileSnapshot {
                samples: window.count(),
                last_ms: window.latest().unwrap_or(0.0),
                average_ms: window.average(),
            },
            None => ProfileSnapshot::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    fn key() -> CapabilityId {
        CapabilityId::of::<Marker>()
    }

    #[test]
    fn record_feeds_last_and_average() {
        let mut profiler = FrameProfiler::new(true);
        profiler.track(key());
        profiler.record(key(), 2.0);
        profiler.record(key(), 4.0);

        assert_eq!(profiler.last_ms(&key()), 4.0);
        assert_eq!(profiler.average_ms(&key()), 3.0);
        let snap = profiler.snapshot(&key());
        assert_eq!(snap.samples, 2);
        assert_eq!(snap.last_ms, 4.0);
    }

    #[test]
    fn disabled_profiler_records_nothing() {
        let mut profiler = FrameProfiler::new(false);
        profiler.track(key());
        profiler.record(key(), 7.5);
        assert_eq!(profiler.snapshot(&key()).samples, 0);
    }

    #[test]
    fn window_is_bounded_to_sample_window() {
        let mut profiler = FrameProfiler::new(true);
        for i in 0..(SAMPLE_WINDOW + 10) {
            profiler.record(key(), i as f64);
        }
        let snap = profiler.snapshot(&key());
        assert_eq!(snap.samples, SAMPLE_WINDOW);
        assert_eq!(snap.last_ms, (SAMPLE_WINDOW + 9) as f64);
        // The first ten samples have been evicted.
        assert!(snap.average_ms > 10.0);
    }

    #[test]
    fn forget_drops_the_window() {
        let mut profiler = FrameProfiler::new(true);
        profiler.record(key(), 1.0);
        profiler.forget(&key());
        assert_eq!(profiler.snapshot(&key()).samples, 0);
    }

    #[test]
    fn untracked_key_reads_as_zero() {
        let profiler = FrameProfiler::new(true);
        assert_eq!(profiler.last_ms(&key()), 0.0);
        assert_eq!(profiler.average_ms(&key()), 0.0);
    }
}
