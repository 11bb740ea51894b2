use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::Error,
    pipeline::types::GenerationInput,
    store::models::{ListFilter, ReleaseRecord, ReleaseStatus},
};

#[derive(Debug, Serialize)]
struct CreateReleaseResponse {
    release_id: Uuid,
    status: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReleasePage {
    releases: Vec<ReleaseRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    status: ReleaseStatus,
    #[serde(default)]
    error: Option<String>,
}

/// Accepts a brief, persists the draft record and spawns the generation run.
///
/// The response returns before any stage has executed; callers follow the
/// event stream or poll the release for progress.
pub(crate) async fn create(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<GenerationInput>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    state.quota().enforce(org_id).await?;

    let release_id = Uuid::now_v7();
    let record = ReleaseRecord::new(org_id, release_id, payload.clone());
    state
        .dao()
        .create_release(&record)
        .await
        .map_err(Error::Storage)?;

    let orchestrator = state.orchestrator();
    let permits = state.run_permits();
    tokio::spawn(async move {
        // The permit bounds concurrent runs; acquire only fails when the
        // semaphore is closed, which never happens while the app is up.
        let Ok(_permit) = permits.acquire_owned().await else {
            return;
        };
        if let Err(error) = orchestrator.run(org_id, release_id, payload).await {
            error!(%org_id, %release_id, error = %error, "release generation run failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateReleaseResponse {
            release_id,
            status: "accepted",
        }),
    ))
}

pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path((org_id, release_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Json<ReleaseRecord>> {
    let record = state
        .dao()
        .get_release(org_id, release_id)
        .await
        .map_err(Error::Storage)?
        .ok_or_else(|| Error::not_found("release"))?;
    Ok(Json(record))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> crate::error::Result<Json<ReleasePage>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            ReleaseStatus::parse(raw)
                .ok_or_else(|| Error::validation(format!("unknown status filter: {raw}")))?,
        ),
        None => None,
    };
    let filter = ListFilter::new(status, query.limit, query.offset);
    let releases = state
        .dao()
        .list_releases(org_id, &filter)
        .await
        .map_err(Error::Storage)?;
    Ok(Json(ReleasePage { releases }))
}

/// Applies a manual status change, holding the same transition rules the
/// pipeline itself follows.
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path((org_id, release_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<StatusChangeRequest>,
) -> crate::error::Result<Json<ReleaseRecord>> {
    let record = state
        .dao()
        .get_release(org_id, release_id)
        .await
        .map_err(Error::Storage)?
        .ok_or_else(|| Error::not_found("release"))?;

    if !record.status.can_transition(payload.status) {
        return Err(Error::validation(format!(
            "cannot move release from {} to {}",
            record.status, payload.status
        )));
    }

    state
        .dao()
        .update_status(org_id, release_id, payload.status, payload.error.as_deref())
        .await
        .map_err(Error::Storage)?;

    let updated = state
        .dao()
        .get_release(org_id, release_id)
        .await
        .map_err(Error::Storage)?
        .ok_or_else(|| Error::not_found("release"))?;
    Ok(Json(updated))
}
