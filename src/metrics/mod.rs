use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for the fulfillment workflow
// ============================================================================
//
// One counter per placed order, plus per-stage transition and failure
// counters and a per-stage duration histogram. Registered with a local
// registry and scraped via GET /metrics.
//
// ============================================================================

/// Central metrics registry for the service.
pub struct Metrics {
    registry: Registry,

    pub orders_placed: IntCounter,
    pub stage_transitions: IntCounterVec,
    pub stage_failures: IntCounterVec,
    pub stage_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let stage_transitions = IntCounterVec::new(
            Opts::new(
                "stage_transitions_total",
                "Successful fulfillment stage transitions",
            ),
            &["stage"],
        )?;
        registry.register(Box::new(stage_transitions.clone()))?;

        let stage_failures = IntCounterVec::new(
            Opts::new(
                "stage_failures_total",
                "Rejected fulfillment stage operations",
            ),
            &["stage", "reason"],
        )?;
        registry.register(Box::new(stage_failures.clone()))?;

        let stage_duration = HistogramVec::new(
            HistogramOpts::new(
                "stage_duration_seconds",
                "Fulfillment stage operation duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["stage"],
        )?;
        registry.register(Box::new(stage_duration.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            stage_transitions,
            stage_failures,
            stage_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transition(&self, stage: &str) {
        self.stage_transitions.with_label_values(&[stage]).inc();
    }

    pub fn record_failure(&self, stage: &str, reason: &str) {
        self.stage_failures
            .with_label_values(&[stage, reason])
            .inc();
    }

    pub fn observe_stage_duration(&self, stage: &str, duration_secs: f64) {
        self.stage_duration
            .with_label_values(&[stage])
            .observe(duration_secs);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
