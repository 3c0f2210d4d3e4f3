use axum::{routing::get, Router};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_runs_total", "Scoring runs that produced a ranking.");
        describe_counter!(
            "scoring_failures_total",
            "Scoring runs rejected (empty standings, degenerate normalization)."
        );
        describe_gauge!("scoring_entities_ranked", "Drivers ranked by the last run.");
        describe_histogram!("scoring_run_duration_ms", "Scoring run time in milliseconds.");
    });
}

pub(crate) fn record_run(ranked: usize, elapsed_ms: f64) {
    ensure_described();
    counter!("scoring_runs_total").increment(1);
    gauge!("scoring_entities_ranked").set(ranked as f64);
    histogram!("scoring_run_duration_ms").record(elapsed_ms);
}

pub(crate) fn record_failure() {
    ensure_described();
    counter!("scoring_failures_total").increment(1);
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Only one per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
