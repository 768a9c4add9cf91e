//! Opt-in timing hooks for tunnel builds.
//!
//! Timing is only collected when the `tunnel_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). When
//! disabled, every call compiles down to running the closure.
//!
//! ```ignore
//! let mut metrics = TunnelMetrics::default();
//! metrics.begin();
//! let samples = metrics.time(TimingBucket::Sampling, || sample_path(&path, 1.0))?;
//! if let Some(report) = metrics.end() {
//!     println!("sampling: {} ns", report.sampling_ns);
//! }
//! ```

/// Phases of a tunnel build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Path length query and per-ring path evaluation.
    Sampling,
    /// Frame resolution, including degenerate-frame fallbacks.
    Frames,
    /// Ring emission and stitching.
    Rings,
    /// Edge topology counting.
    Diagnostics,
}

/// Cumulative nanoseconds per [`TimingBucket`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TunnelTimingReport {
    pub sampling_ns: u64,
    pub frames_ns: u64,
    pub rings_ns: u64,
    pub diagnostics_ns: u64,
}

impl TunnelTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.sampling_ns
            .saturating_add(self.frames_ns)
            .saturating_add(self.rings_ns)
            .saturating_add(self.diagnostics_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing tunnel builds.
///
/// When the `tunnel_metrics` feature is disabled (or on WASM), all methods are
/// no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct TunnelMetrics {
    #[cfg(all(feature = "tunnel_metrics", not(target_arch = "wasm32")))]
    report: TunnelTimingReport,
}

impl TunnelMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "tunnel_metrics", not(target_arch = "wasm32")))]
        {
            self.report = TunnelTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<TunnelTimingReport> {
        #[cfg(all(feature = "tunnel_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "tunnel_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times `f` and adds the elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "tunnel_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let slot = match bucket {
                TimingBucket::Sampling => &mut self.report.sampling_ns,
                TimingBucket::Frames => &mut self.report.frames_ns,
                TimingBucket::Rings => &mut self.report.rings_ns,
                TimingBucket::Diagnostics => &mut self.report.diagnostics_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "tunnel_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
