//! Drowsiness Monitor - Main Entry Point

use std::path::Path;
use std::sync::Arc;

use alerting::LogAlarm;
use anyhow::Context;
use api::{init_logging, run_server, AppState, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;
use monitor::{load_samples, replay, MonitorSession};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_logging(&settings.log_level).context("failed to initialize logging")?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &settings.replay_file {
        return replay_file(&settings, path);
    }

    let metrics = if settings.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    let session = MonitorSession::spawn(settings.tracker, Arc::new(LogAlarm))
        .context("failed to start monitoring session")?;
    let state = AppState::new(session, settings.score_layout, metrics);

    run_server(&settings.server.addr, state).await
}

fn replay_file(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    info!("Replaying samples from {}", path.display());

    let samples = load_samples(path).context("failed to load replay samples")?;
    let report = replay(settings.tracker, &samples).context("replay failed")?;

    info!(
        "Replay finished: {} samples, {} dropped, {} drowsy events, final state {}",
        samples.len(),
        report.dropped,
        report.event_count,
        report.final_state
    );
    for timestamp in report.event_timestamps() {
        info!("Drowsiness confirmed at {:.3}s", timestamp);
    }

    Ok(())
}
