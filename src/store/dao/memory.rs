//! In-memory release store.
//!
//! Backs unit tests and standalone runs without a database. Same contract
//! as the Postgres DAO, including the quiet handling of missing rows on
//! updates.

use anyhow::bail;
use chrono::Utc;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use async_trait::async_trait;

use crate::store::dao::ReleaseDao;
use crate::store::models::{ListFilter, ReleaseArtifact, ReleaseRecord, ReleaseStatus};

#[derive(Default)]
pub struct MemoryReleaseDao {
    releases: RwLock<FxHashMap<(Uuid, Uuid), ReleaseRecord>>,
}

impl MemoryReleaseDao {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReleaseDao for MemoryReleaseDao {
    async fn create_release(&self, record: &ReleaseRecord) -> anyhow::Result<()> {
        let mut releases = self.releases.write().await;
        let key = (record.org_id, record.release_id);
        if releases.contains_key(&key) {
            bail!("release {} already exists", record.release_id);
        }
        releases.insert(key, record.clone());
        Ok(())
    }

    async fn get_release(
        &self,
        org_id: Uuid,
        release_id: Uuid,
    ) -> anyhow::Result<Option<ReleaseRecord>> {
        let releases = self.releases.read().await;
        Ok(releases.get(&(org_id, release_id)).cloned())
    }

    async fn list_releases(
        &self,
        org_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<ReleaseRecord>> {
        let releases = self.releases.read().await;
        let mut matching: Vec<ReleaseRecord> = releases
            .values()
            .filter(|record| record.org_id == org_id)
            .filter(|record| filter.status.is_none_or(|status| record.status == status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .collect())
    }

    async fn update_status(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        status: ReleaseStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut releases = self.releases.write().await;
        match releases.get_mut(&(org_id, release_id)) {
            Some(record) => {
                record.status = status;
                record.error = error.map(ToString::to_string);
                record.updated_at = Utc::now();
            }
            None => {
                tracing::warn!(%release_id, new_status = %status, "status update hit no release");
            }
        }
        Ok(())
    }

    async fn save_artifact(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        artifact: &ReleaseArtifact,
    ) -> anyhow::Result<()> {
        let mut releases = self.releases.write().await;
        match releases.get_mut(&(org_id, release_id)) {
            Some(record) => {
                record.draft = Some(artifact.draft.clone());
                record.seo = Some(artifact.seo.clone());
                record.angles = artifact.angles.clone();
                record.headlines = artifact.headlines.clone();
                record.updated_at = Utc::now();
            }
            None => {
                tracing::warn!(%release_id, "artifact save hit no release");
            }
        }
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
