//! Locale resolution metrics.
//!
//! Counts which precedence source decided each `detect()` call and how many
//! storage failures were swallowed along the way.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters owned by a single resolver.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Detections answered by a persisted preference
    persisted_hits: AtomicUsize,

    /// Detections answered by the negotiated browser/runtime language
    negotiated_hits: AtomicUsize,

    /// Detections that fell through to the default locale
    default_fallbacks: AtomicUsize,

    /// Storage reads or writes whose error was swallowed
    storage_failures: AtomicUsize,
}

impl ResolutionMetrics {
    /// Create a metrics set with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detection answered by a persisted preference.
    pub fn record_persisted_hit(&self) {
        self.persisted_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a detection answered by the negotiated language.
    pub fn record_negotiated_hit(&self) {
        self.negotiated_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a detection that fell back to the default locale.
    pub fn record_default_fallback(&self) {
        self.default_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a storage error that was swallowed.
    pub fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Detections answered by a persisted preference.
    pub fn persisted_hits(&self) -> usize {
        self.persisted_hits.load(Ordering::Relaxed)
    }

    /// Detections answered by the negotiated language.
    pub fn negotiated_hits(&self) -> usize {
        self.negotiated_hits.load(Ordering::Relaxed)
    }

    /// Detections that fell back to the default locale.
    pub fn default_fallbacks(&self) -> usize {
        self.default_fallbacks.load(Ordering::Relaxed)
    }

    /// Storage errors swallowed by reads and writes.
    pub fn storage_failures(&self) -> usize {
        self.storage_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let persisted = self.persisted_hits();
        let negotiated = self.negotiated_hits();
        let defaults = self.default_fallbacks();
        let detections = persisted + negotiated + defaults;
        let fallback_rate = if detections > 0 {
            (defaults as f64 / detections as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            detections,
            persisted_hits: persisted,
            negotiated_hits: negotiated,
            default_fallbacks: defaults,
            fallback_rate,
            storage_failures: self.storage_failures(),
        }
    }
}

/// Snapshot of resolution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Total `detect()` calls
    pub detections: usize,

    pub persisted_hits: usize,

    pub negotiated_hits: usize,

    pub default_fallbacks: usize,

    /// Share of detections that used the default locale, as a percentage (0-100)
    pub fallback_rate: f64,

    /// Swallowed storage errors (reads and writes)
    pub storage_failures: usize,
}
