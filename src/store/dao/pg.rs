//! Postgres 実装。リリースは `(org_id, release_id)` を主キーに 1 行で持ち、
//! 生成物は JSONB 列に載せる。

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::store::dao::ReleaseDao;
use crate::store::models::{ListFilter, ReleaseArtifact, ReleaseRecord, ReleaseStatus};

#[derive(Clone)]
pub struct PgReleaseDao {
    pool: PgPool,
}

impl PgReleaseDao {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `migrations/` の DDL を冪等に適用する。起動時に一度呼ぶ。
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../../../migrations/0001_create_releases.sql"))
            .execute(&self.pool)
            .await
            .context("failed to apply releases schema")?;
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Result<ReleaseRecord> {
    let status: String = row.try_get("status")?;
    let status = ReleaseStatus::parse(&status)
        .with_context(|| format!("unknown release status in row: {status}"))?;
    let input: Json<crate::pipeline::types::GenerationInput> = row.try_get("input")?;
    let draft: Option<Json<crate::pipeline::types::Draft>> = row.try_get("draft")?;
    let seo: Option<Json<crate::pipeline::types::SeoSummary>> = row.try_get("seo")?;
    let angles: Json<Vec<crate::pipeline::types::Angle>> = row.try_get("angles")?;
    let headlines: Json<Vec<crate::pipeline::types::HeadlineVariant>> = row.try_get("headlines")?;

    Ok(ReleaseRecord {
        release_id: row.try_get("release_id")?,
        org_id: row.try_get("org_id")?,
        status,
        input: input.0,
        draft: draft.map(|json| json.0),
        seo: seo.map(|json| json.0),
        angles: angles.0,
        headlines: headlines.0,
        error: row.try_get("error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ReleaseDao for PgReleaseDao {
    async fn create_release(&self, record: &ReleaseRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO releases (
                org_id, release_id, status, input, draft, seo,
                angles, headlines, error, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(record.org_id)
        .bind(record.release_id)
        .bind(record.status.as_str())
        .bind(Json(&record.input))
        .bind(record.draft.as_ref().map(Json))
        .bind(record.seo.as_ref().map(Json))
        .bind(Json(&record.angles))
        .bind(Json(&record.headlines))
        .bind(record.error.as_deref())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .context("failed to insert release")?;
        Ok(())
    }

    async fn get_release(
        &self,
        org_id: Uuid,
        release_id: Uuid,
    ) -> Result<Option<ReleaseRecord>> {
        let row = sqlx::query(
            r"
            SELECT org_id, release_id, status, input, draft, seo,
                   angles, headlines, error, created_at, updated_at
            FROM releases
            WHERE org_id = $1 AND release_id = $2
            ",
        )
        .bind(org_id)
        .bind(release_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load release")?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn list_releases(
        &self,
        org_id: Uuid,
        filter: &ListFilter,
    ) -> Result<Vec<ReleaseRecord>> {
        let rows = match filter.status {
            Some(status) => {
                sqlx::query(
                    r"
                    SELECT org_id, release_id, status, input, draft, seo,
                           angles, headlines, error, created_at, updated_at
                    FROM releases
                    WHERE org_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    ",
                )
                .bind(org_id)
                .bind(status.as_str())
                .bind(filter.limit)
                .bind(filter.offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT org_id, release_id, status, input, draft, seo,
                           angles, headlines, error, created_at, updated_at
                    FROM releases
                    WHERE org_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    ",
                )
                .bind(org_id)
                .bind(filter.limit)
                .bind(filter.offset)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("failed to list releases")?;

        rows.iter().map(row_to_record).collect()
    }

    async fn update_status(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        status: ReleaseStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE releases
            SET status = $3, error = $4, updated_at = NOW()
            WHERE org_id = $1 AND release_id = $2
            ",
        )
        .bind(org_id)
        .bind(release_id)
        .bind(status.as_str())
        .bind(error)
        .execute(&self.pool)
        .await
        .context("failed to update release status")?;

        if result.rows_affected() == 0 {
            tracing::warn!(%release_id, new_status = %status, "status update hit no release");
        }
        Ok(())
    }

    async fn save_artifact(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        artifact: &ReleaseArtifact,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE releases
            SET draft = $3, seo = $4, angles = $5, headlines = $6, updated_at = NOW()
            WHERE org_id = $1 AND release_id = $2
            ",
        )
        .bind(org_id)
        .bind(release_id)
        .bind(Json(&artifact.draft))
        .bind(Json(&artifact.seo))
        .bind(Json(&artifact.angles))
        .bind(Json(&artifact.headlines))
        .execute(&self.pool)
        .await
        .context("failed to save release artifact")?;

        if result.rows_affected() == 0 {
            tracing::warn!(%release_id, "artifact save hit no release");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query(r"SELECT 1")
            .execute(&self.pool)
            .await
            .context("release store ping failed")?;
        Ok(())
    }
}
