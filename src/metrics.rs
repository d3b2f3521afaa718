use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only the binary calls this; library code
    /// records through the `metrics` facade, which is a no-op without a recorder.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("claims_scored_total", "Text/URL claims scored, by verdict.");
        describe_counter!("media_scored_total", "Media uploads scored, by decode outcome.");
        describe_counter!(
            "media_decode_failures_total",
            "Uploads that did not decode as an image."
        );
        describe_counter!(
            "commentary_unavailable_total",
            "Generative commentary requests that degraded to none."
        );
        describe_histogram!("claim_scoring_ms", "End-to-end claim scoring time in milliseconds.");
        describe_histogram!("evidence_lookup_ms", "Fact-check lookup time in milliseconds.");

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
