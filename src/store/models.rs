//! 永続化モデル。リリースの状態遷移と保存レコードを定義します。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::types::{Angle, Draft, GenerationInput, HeadlineVariant, SeoSummary};

/// Lifecycle of a stored release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Draft,
    Generating,
    Complete,
    Error,
}

impl ReleaseStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseStatus::Draft => "draft",
            ReleaseStatus::Generating => "generating",
            ReleaseStatus::Complete => "complete",
            ReleaseStatus::Error => "error",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ReleaseStatus::Draft),
            "generating" => Some(ReleaseStatus::Generating),
            "complete" => Some(ReleaseStatus::Complete),
            "error" => Some(ReleaseStatus::Error),
            _ => None,
        }
    }

    /// Allowed transitions: `draft → generating`, `generating → complete`
    /// and `generating → error`. Everything else is rejected.
    #[must_use]
    pub fn can_transition(self, next: ReleaseStatus) -> bool {
        matches!(
            (self, next),
            (ReleaseStatus::Draft, ReleaseStatus::Generating)
                | (ReleaseStatus::Generating, ReleaseStatus::Complete)
                | (ReleaseStatus::Generating, ReleaseStatus::Error)
        )
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline produced for a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    pub draft: Draft,
    pub seo: SeoSummary,
    pub angles: Vec<Angle>,
    pub headlines: Vec<HeadlineVariant>,
}

/// Stored release, keyed by `(org_id, release_id)`.
///
/// The angle and headline vectors keep the full candidate sets as an audit
/// trail of what the selection passed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub release_id: Uuid,
    pub org_id: Uuid,
    pub status: ReleaseStatus,
    pub input: GenerationInput,
    pub draft: Option<Draft>,
    pub seo: Option<SeoSummary>,
    #[serde(default)]
    pub angles: Vec<Angle>,
    #[serde(default)]
    pub headlines: Vec<HeadlineVariant>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReleaseRecord {
    /// Fresh record in `draft`, persisted before the run starts.
    #[must_use]
    pub fn new(org_id: Uuid, release_id: Uuid, input: GenerationInput) -> Self {
        let now = Utc::now();
        Self {
            release_id,
            org_id,
            status: ReleaseStatus::Draft,
            input,
            draft: None,
            seo: None,
            angles: Vec::new(),
            headlines: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing filter with clamped pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<ReleaseStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl ListFilter {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    #[must_use]
    pub fn new(status: Option<ReleaseStatus>, limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            status,
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}
