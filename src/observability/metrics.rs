/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Gauge, Histogram, Registry, register_counter_with_registry,
    register_gauge_with_registry, register_histogram_with_registry,
};
use std::sync::Arc;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    pub releases_started: Counter,
    pub releases_completed: Counter,
    pub releases_failed: Counter,
    pub quota_rejections: Counter,
    pub progress_events: Counter,

    pub run_duration: Histogram,

    pub active_runs: Gauge,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同名メトリクスの二重登録などで Prometheus 登録に失敗した場合。
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            releases_started: register_counter_with_registry!(
                "newsroom_releases_started_total",
                "Total number of release generation runs started",
                registry
            )?,
            releases_completed: register_counter_with_registry!(
                "newsroom_releases_completed_total",
                "Total number of release generation runs completed",
                registry
            )?,
            releases_failed: register_counter_with_registry!(
                "newsroom_releases_failed_total",
                "Total number of release generation runs failed",
                registry
            )?,
            quota_rejections: register_counter_with_registry!(
                "newsroom_quota_rejections_total",
                "Total number of runs rejected by the quota gate",
                registry
            )?,
            progress_events: register_counter_with_registry!(
                "newsroom_progress_events_total",
                "Total number of events published to release channels",
                registry
            )?,
            run_duration: register_histogram_with_registry!(
                "newsroom_release_run_duration_seconds",
                "Duration of a full generation run",
                registry
            )?,
            active_runs: register_gauge_with_registry!(
                "newsroom_active_runs",
                "Number of generation runs currently in flight",
                registry
            )?,
        })
    }
}
