//! Per-release progress events and the hub that fans them out.
//!
//! Each release gets its own broadcast channel, created on first subscribe
//! and removed when the run reaches a terminal event. Publishing never
//! blocks; events published with no live subscriber are dropped, and late
//! subscribers see only what comes after they attach.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lifecycle events for a single release run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseEvent {
    Started {
        release_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    Progress {
        release_id: Uuid,
        step: String,
        percent: u8,
        timestamp: DateTime<Utc>,
    },
    Completed {
        release_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    Failed {
        release_id: Uuid,
        stage: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ReleaseEvent {
    #[must_use]
    pub fn started(release_id: Uuid) -> Self {
        Self::Started {
            release_id,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn progress(release_id: Uuid, step: &str, percent: u8) -> Self {
        Self::Progress {
            release_id,
            step: step.to_string(),
            percent,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn completed(release_id: Uuid) -> Self {
        Self::Completed {
            release_id,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed(release_id: Uuid, stage: &str, message: impl Into<String>) -> Self {
        Self::Failed {
            release_id,
            stage: stage.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Event type as sent on the wire, used for SSE event names.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            ReleaseEvent::Started { .. } => "started",
            ReleaseEvent::Progress { .. } => "progress",
            ReleaseEvent::Completed { .. } => "completed",
            ReleaseEvent::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub fn release_id(&self) -> Uuid {
        match self {
            ReleaseEvent::Started { release_id, .. }
            | ReleaseEvent::Progress { release_id, .. }
            | ReleaseEvent::Completed { release_id, .. }
            | ReleaseEvent::Failed { release_id, .. } => *release_id,
        }
    }

    /// Terminal events end the stream; the hub drops the channel after one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReleaseEvent::Completed { .. } | ReleaseEvent::Failed { .. }
        )
    }
}

/// Wire name of a release's event channel.
#[must_use]
pub fn channel_name(release_id: Uuid) -> String {
    format!("release:{release_id}")
}

/// Publish/subscribe hub keyed by release id.
pub struct ProgressHub {
    capacity: usize,
    channels: RwLock<FxHashMap<Uuid, broadcast::Sender<ReleaseEvent>>>,
}

impl ProgressHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(FxHashMap::default()),
        }
    }

    /// Subscribes to a release, creating its channel when absent.
    pub fn subscribe(&self, release_id: Uuid) -> broadcast::Receiver<ReleaseEvent> {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(release_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publishes to the event's release channel. Never blocks; with no
    /// channel or no live subscriber the event is dropped.
    pub fn publish(&self, event: &ReleaseEvent) {
        let channels = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = channels.get(&event.release_id()) {
            let _ = sender.send(event.clone());
        }
    }

    /// Removes the channel. Live receivers observe the stream closing.
    pub fn close(&self, release_id: Uuid) {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        channels.remove(&release_id);
    }

    /// Number of releases with an open channel.
    #[must_use]
    pub fn open_channels(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
