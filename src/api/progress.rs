use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;
use uuid::Uuid;

use crate::{app::AppState, error::Error, store::models::ReleaseStatus};

/// Streams progress events for one release as SSE.
///
/// The subscription is taken before the stored status is inspected, so a run
/// that finishes in between cannot strand the client on a channel nothing
/// will ever close.
pub(crate) async fn stream(
    State(state): State<AppState>,
    Path((org_id, release_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let record = state
        .dao()
        .get_release(org_id, release_id)
        .await
        .map_err(Error::Storage)?
        .ok_or_else(|| Error::not_found("release"))?;

    let receiver = state.hub().subscribe(release_id);
    if matches!(record.status, ReleaseStatus::Complete | ReleaseStatus::Error) {
        // Terminal releases get an immediately ended stream instead of an
        // open connection waiting on events that will never come.
        state.hub().close(release_id);
    }

    let stream = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
                Err(error) => {
                    warn!(error = %error, "failed to serialize progress event");
                    None
                }
            },
            // Lagged subscribers drop the missed events and pick up the next.
            Err(_) => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
