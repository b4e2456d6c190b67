//! Metric names and instruments for generation dispatch

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

/// Dispatched generations, by `kind` and `outcome`
pub const GENERATION_COUNT: &str = "muse.generation.count";
/// Wall-clock dispatch time in seconds, by `kind` and `outcome`
pub const GENERATION_DURATION: &str = "muse.generation.duration";

/// Instruments recorded once per dispatched generation
#[derive(Clone)]
pub struct GenerationMetrics {
    count: Counter<u64>,
    duration: Histogram<f64>,
}

impl GenerationMetrics {
    /// Create instruments on the global meter provider
    ///
    /// Without an exporter the global provider is a no-op, so this is safe
    /// to call in tests.
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter("muse");

        Self {
            count: meter
                .u64_counter(GENERATION_COUNT)
                .with_description("Number of generation requests dispatched")
                .build(),
            duration: meter
                .f64_histogram(GENERATION_DURATION)
                .with_description("Generation dispatch duration")
                .with_unit("s")
                .build(),
        }
    }

    pub fn record(&self, kind: &'static str, outcome: &'static str, start: Instant) {
        let attributes = [KeyValue::new("kind", kind), KeyValue::new("outcome", outcome)];
        self.count.add(1, &attributes);
        record_duration(&self.duration, start, &attributes);
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GenerationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationMetrics").finish_non_exhaustive()
    }
}

/// Record a duration measurement on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    let duration = start.elapsed().as_secs_f64();
    histogram.record(duration, attributes);
}
