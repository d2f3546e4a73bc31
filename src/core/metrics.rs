use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

pub(crate) const ATTEMPTS_STARTED: &str = "exam_attempts_started_total";
pub(crate) const RESPONSES_SAVED: &str = "exam_responses_saved_total";
pub(crate) const ATTEMPTS_SUBMITTED: &str = "exam_attempts_submitted_total";
pub(crate) const ATTEMPT_PERCENTAGE: &str = "exam_attempt_percentage";

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
