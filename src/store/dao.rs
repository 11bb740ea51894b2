//! リリース保存層の抽象化。
//!
//! PostgreSQL実装とインメモリ実装の2つを提供します。後者は単体テストと
//! DSN未設定時のスタンドアロン起動に使われます。

use async_trait::async_trait;
use uuid::Uuid;

use crate::store::models::{ListFilter, ReleaseArtifact, ReleaseRecord, ReleaseStatus};

pub mod memory;
pub mod pg;

pub use memory::MemoryReleaseDao;
pub use pg::PgReleaseDao;

#[async_trait]
pub trait ReleaseDao: Send + Sync {
    /// Persists a fresh record. Fails when the `(org_id, release_id)` pair
    /// already exists.
    async fn create_release(&self, record: &ReleaseRecord) -> anyhow::Result<()>;

    async fn get_release(
        &self,
        org_id: Uuid,
        release_id: Uuid,
    ) -> anyhow::Result<Option<ReleaseRecord>>;

    /// Newest first, filtered and paginated per the caller's `ListFilter`.
    async fn list_releases(
        &self,
        org_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<ReleaseRecord>>;

    /// Writes the new status (and error detail for failed runs). Missing
    /// rows are logged, not errored, so crash-recovery paths stay quiet.
    async fn update_status(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        status: ReleaseStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()>;

    /// Stores the full generation output on the release row.
    async fn save_artifact(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        artifact: &ReleaseArtifact,
    ) -> anyhow::Result<()>;

    /// Cheap connectivity probe for the readiness endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
