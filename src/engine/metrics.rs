//! Extraction run metrics.
//!
//! Small structs used to observe where time goes in one extraction run:
//! building the document, then each extractor in turn.
//!
//! The intended usage is:
//!
//! - `api::extract_with` for normal operation (timings are still taken, they
//!   are cheap, but only the total is surfaced).
//! - `api::extract_verbose_with` for profiling and rule debugging.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Timing for one extractor.
#[derive(Debug, Clone, Serialize)]
pub struct StageMetrics {
    /// Extractor name, e.g. `"controller"`.
    pub name: &'static str,
    /// Elapsed time for the stage.
    pub duration: Duration,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ExtractionMetrics {
    /// Time spent flattening segments and assembling entities.
    pub build: Duration,
    /// Per-extractor timings, in execution order.
    pub stages: Vec<StageMetrics>,
}

impl ExtractionMetrics {
    /// Run `stage`, recording its duration under `name`.
    pub(crate) fn time<T>(&mut self, name: &'static str, stage: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = stage();
        self.stages.push(StageMetrics { name, duration: start.elapsed() });
        out
    }

    /// Sum of the build time and all stage timings.
    pub(crate) fn total(&self) -> Duration {
        self.build + self.stages.iter().map(|s| s.duration).sum::<Duration>()
    }
}
