use axum::Json;
use serde::Deserialize;

use crate::pipeline::{diff::semantic_diff, types::DiffSummary};

#[derive(Debug, Deserialize)]
pub(crate) struct DiffRequest {
    original: String,
    rewritten: String,
}

/// Compares an edited draft against the generated original, sentence by
/// sentence.
pub(crate) async fn compare(Json(payload): Json<DiffRequest>) -> Json<DiffSummary> {
    Json(semantic_diff(&payload.original, &payload.rewritten))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::{
        app::{ComponentRegistry, build_router},
        config::{Config, ENV_MUTEX},
    };

    #[tokio::test]
    async fn compare_reports_sentence_level_changes() {
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            Config::from_env().expect("config loads")
        };
        let registry = ComponentRegistry::build(config)
            .await
            .expect("registry builds");
        let app = build_router(registry);

        let body = serde_json::json!({
            "original": "Acme announced a new platform today. The platform targets enterprise teams.",
            "rewritten": "Acme announced a new platform today. Pricing starts at ten dollars.",
        })
        .to_string();
        let request = Request::post("/v1/diff")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let payload: serde_json::Value = serde_json::from_slice(&body_bytes).expect("valid json");
        assert_eq!(payload["unchanged"], 1);
        assert_eq!(payload["added"], 1);
        assert_eq!(payload["removed"], 1);
        assert_eq!(payload["modified"], 0);
    }
}
