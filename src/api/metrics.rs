use axum::{extract::State, http::StatusCode, http::header, response::IntoResponse};

use crate::app::AppState;

/// Prometheus exposition endpoint for the worker's run and quota counters.
pub(crate) async fn exporter(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.telemetry().render_prometheus(),
    )
        .into_response()
}
