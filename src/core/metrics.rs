use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_question_mutation(operation: &'static str) {
    metrics::counter!("questions_mutations_total", "operation" => operation).increment(1);
}

pub(crate) fn record_test_paper_mutation(operation: &'static str, question_count: usize) {
    metrics::counter!("test_papers_mutations_total", "operation" => operation).increment(1);
    metrics::histogram!("test_paper_question_count", "operation" => operation)
        .record(question_count as f64);
}
