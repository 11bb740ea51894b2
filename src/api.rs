pub(crate) mod diff;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod progress;
pub(crate) mod releases;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route(
            "/v1/orgs/{org_id}/releases",
            post(releases::create).get(releases::list),
        )
        .route(
            "/v1/orgs/{org_id}/releases/{release_id}",
            get(releases::get_one),
        )
        .route(
            "/v1/orgs/{org_id}/releases/{release_id}/status",
            patch(releases::update_status),
        )
        .route(
            "/v1/orgs/{org_id}/releases/{release_id}/events",
            get(progress::stream),
        )
        .route("/v1/diff", post(diff::compare))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
