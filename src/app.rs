use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::{
    api,
    clients::{BillingClient, BillingConfig, QuotaGate, UnmeteredQuota},
    config::Config,
    observability::Telemetry,
    pipeline::{PipelineOrchestrator, tables::ScoringTables},
    progress::ProgressHub,
    store::dao::{MemoryReleaseDao, PgReleaseDao, ReleaseDao},
    util::retry::RetryConfig,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    dao: Arc<dyn ReleaseDao>,
    quota: Arc<dyn QuotaGate>,
    hub: Arc<ProgressHub>,
    orchestrator: Arc<PipelineOrchestrator>,
    run_permits: Arc<Semaphore>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn dao(&self) -> Arc<dyn ReleaseDao> {
        Arc::clone(&self.registry.dao)
    }

    pub(crate) fn quota(&self) -> Arc<dyn QuotaGate> {
        Arc::clone(&self.registry.quota)
    }

    pub(crate) fn hub(&self) -> Arc<ProgressHub> {
        Arc::clone(&self.registry.hub)
    }

    pub(crate) fn orchestrator(&self) -> Arc<PipelineOrchestrator> {
        Arc::clone(&self.registry.orchestrator)
    }

    pub(crate) fn run_permits(&self) -> Arc<Semaphore> {
        Arc::clone(&self.registry.run_permits)
    }
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化し、アプリケーションの共有レジストリを構築する。
    ///
    /// # Errors
    /// Telemetry の初期化、採点テーブルの読み込み、課金クライアント構築が失敗した場合はエラーを返す。
    pub async fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new()?;
        let tables = Arc::new(ScoringTables::load(
            config.scoring_tables_path().map(Path::new),
        )?);

        let dao: Arc<dyn ReleaseDao> = match config.db_dsn() {
            Some(dsn) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections())
                    .min_connections(config.db_min_connections())
                    .acquire_timeout(config.db_acquire_timeout())
                    .idle_timeout(Some(config.db_idle_timeout()))
                    .max_lifetime(Some(config.db_max_lifetime()))
                    .test_before_acquire(true)
                    .connect_lazy(dsn)
                    .context("failed to configure releases connection pool")?;
                let dao = PgReleaseDao::new(pool);
                // The pool connects lazily. A database that is still coming up
                // only defers the schema; later queries surface the real error.
                if let Err(error) = dao.migrate().await {
                    warn!(error = %error, "release schema migration failed at startup");
                }
                Arc::new(dao)
            }
            None => {
                warn!("NEWSROOM_DB_DSN is not set, storing releases in memory");
                Arc::new(MemoryReleaseDao::new())
            }
        };

        let quota: Arc<dyn QuotaGate> = match config.billing_base_url() {
            Some(base_url) => Arc::new(BillingClient::new(BillingConfig {
                base_url: base_url.to_string(),
                connect_timeout: config.billing_connect_timeout(),
                total_timeout: config.billing_total_timeout(),
                service_token: config.billing_service_token().map(str::to_string),
                retry: RetryConfig::new(
                    config.http_max_retries(),
                    config.http_backoff_base_ms(),
                    config.http_backoff_cap_ms(),
                ),
            })?),
            None => {
                warn!("BILLING_BASE_URL is not set, releases are unmetered");
                Arc::new(UnmeteredQuota)
            }
        };

        let hub = Arc::new(ProgressHub::new(config.progress_capacity()));
        let metrics = telemetry.metrics_arc();
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            tables,
            Arc::clone(&dao),
            Arc::clone(&quota),
            Arc::clone(&hub),
            metrics,
        )?);
        let run_permits = Arc::new(Semaphore::new(config.max_concurrent_runs().get()));

        Ok(Self {
            config,
            telemetry,
            dao,
            quota,
            hub,
            orchestrator,
            run_permits,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}
