use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    clients::QuotaGate,
    error::Error,
    observability::metrics::Metrics,
    progress::{ProgressHub, ReleaseEvent},
    store::dao::ReleaseDao,
    store::models::{ReleaseArtifact, ReleaseStatus},
};

pub mod angle;
pub mod context;
pub mod diff;
pub mod draft;
pub mod headline;
pub mod seo;
pub mod tables;
pub mod types;

use angle::{AngleStage, DefaultAngleStage};
use context::{ContextStage, DefaultContextStage, NoopOrgDirectory, OrgDirectory};
use draft::{DefaultDraftStage, DraftStage};
use headline::{DefaultHeadlineStage, HeadlineStage};
use seo::{DefaultSeoStage, SeoStage};
use tables::ScoringTables;
use types::GenerationInput;

const CONTEXT_PERCENT: u8 = 15;
const ANGLE_PERCENT: u8 = 35;
const HEADLINE_PERCENT: u8 = 55;
const DRAFT_PERCENT: u8 = 75;
const SEO_PERCENT: u8 = 90;

pub struct PipelineOrchestrator {
    stages: PipelineStages,
    dao: Arc<dyn ReleaseDao>,
    quota: Arc<dyn QuotaGate>,
    hub: Arc<ProgressHub>,
    metrics: Arc<Metrics>,
}

struct PipelineStages {
    context: Arc<dyn ContextStage>,
    angle: Arc<dyn AngleStage>,
    headline: Arc<dyn HeadlineStage>,
    draft: Arc<dyn DraftStage>,
    seo: Arc<dyn SeoStage>,
}

pub(crate) struct PipelineBuilder {
    context: Option<Arc<dyn ContextStage>>,
    angle: Option<Arc<dyn AngleStage>>,
    headline: Option<Arc<dyn HeadlineStage>>,
    draft: Option<Arc<dyn DraftStage>>,
    seo: Option<Arc<dyn SeoStage>>,
}

impl PipelineOrchestrator {
    /// Wires the default stages against the given scoring tables.
    ///
    /// # Errors
    /// Fails when a stage cannot compile its phrase matchers.
    pub fn new(
        tables: Arc<ScoringTables>,
        dao: Arc<dyn ReleaseDao>,
        quota: Arc<dyn QuotaGate>,
        hub: Arc<ProgressHub>,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let directory: Arc<dyn OrgDirectory> = Arc::new(NoopOrgDirectory);
        Ok(PipelineBuilder::new()
            .with_context_stage(Arc::new(DefaultContextStage::new(
                Arc::clone(&tables),
                directory,
            )))
            .with_angle_stage(Arc::new(DefaultAngleStage::new(Arc::clone(&tables))?))
            .with_headline_stage(Arc::new(DefaultHeadlineStage::new(Arc::clone(&tables))?))
            .with_draft_stage(Arc::new(DefaultDraftStage))
            .with_seo_stage(Arc::new(DefaultSeoStage::new(tables)?))
            .build(dao, quota, hub, metrics))
    }

    #[cfg(test)]
    pub(crate) fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs the full generation sequence for one release.
    ///
    /// Validation failures happen before any status change or event. A
    /// quota denial also stops before any stage runs, but it marks the
    /// release `error` and emits a terminal `failed` event so a record
    /// persisted ahead of the gate is never stranded in `draft` with an
    /// open channel. Stage failures mark the release `error` and carry the
    /// failing stage name.
    ///
    /// # Errors
    /// Returns the first validation, quota, stage, or storage failure.
    pub async fn run(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        input: GenerationInput,
    ) -> crate::error::Result<()> {
        input.validate()?;
        if let Err(err) = self.quota.enforce(org_id).await {
            if matches!(err, Error::QuotaExceeded { .. }) {
                self.metrics.quota_rejections.inc();
            }
            let message = err.to_string();
            if let Err(update_err) = self
                .dao
                .update_status(org_id, release_id, ReleaseStatus::Error, Some(&message))
                .await
            {
                tracing::error!(%release_id, error = %update_err, "failed to mark quota-denied release errored");
            }
            self.publish(ReleaseEvent::failed(release_id, "quota", message));
            self.hub.close(release_id);
            return Err(err);
        }

        let started = Instant::now();
        self.metrics.active_runs.inc();
        let result = self.run_stages(org_id, release_id, &input).await;
        self.metrics.active_runs.dec();
        self.metrics
            .run_duration
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(()) => self.metrics.releases_completed.inc(),
            Err(err) => {
                tracing::error!(%release_id, error = %err, "release generation failed");
                self.metrics.releases_failed.inc();
            }
        }
        result
    }

    async fn run_stages(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        input: &GenerationInput,
    ) -> crate::error::Result<()> {
        // Nothing is announced until the record is visibly generating.
        self.dao
            .update_status(org_id, release_id, ReleaseStatus::Generating, None)
            .await
            .map_err(Error::Storage)?;
        self.publish(ReleaseEvent::started(release_id));
        self.metrics.releases_started.inc();
        tracing::info!(%release_id, news_type = input.news_type.as_str(), "release generation started");

        let outcome = self.generate_and_persist(org_id, release_id, input).await;
        match outcome {
            Ok(word_count) => {
                self.publish(ReleaseEvent::completed(release_id));
                self.hub.close(release_id);
                tracing::info!(%release_id, word_count, "release generation completed");
                Ok(())
            }
            Err(err) => {
                let stage = err.stage().unwrap_or("persist");
                let message = err.to_string();
                if let Err(update_err) = self
                    .dao
                    .update_status(org_id, release_id, ReleaseStatus::Error, Some(&message))
                    .await
                {
                    tracing::error!(%release_id, error = %update_err, "failed to mark release errored");
                }
                self.publish(ReleaseEvent::failed(release_id, stage, message));
                self.hub.close(release_id);
                Err(err)
            }
        }
    }

    async fn generate_and_persist(
        &self,
        org_id: Uuid,
        release_id: Uuid,
        input: &GenerationInput,
    ) -> crate::error::Result<usize> {
        let context = self
            .stages
            .context
            .assemble(org_id, input)
            .await
            .map_err(|err| Error::generation("context", err))?;
        self.publish(ReleaseEvent::progress(release_id, "context", CONTEXT_PERCENT));

        let angles = self
            .stages
            .angle
            .find(&context)
            .await
            .map_err(|err| Error::generation("angle", err))?;
        self.publish(ReleaseEvent::progress(release_id, "angle", ANGLE_PERCENT));

        let headlines = self
            .stages
            .headline
            .generate(&context, &angles.selected)
            .await
            .map_err(|err| Error::generation("headline", err))?;
        self.publish(ReleaseEvent::progress(
            release_id,
            "headline",
            HEADLINE_PERCENT,
        ));

        let run_date = Utc::now().date_naive();
        let draft = self
            .stages
            .draft
            .compose(&context, &angles.selected, &headlines.selected, run_date)
            .await
            .map_err(|err| Error::generation("draft", err))?;
        self.publish(ReleaseEvent::progress(release_id, "draft", DRAFT_PERCENT));

        let seo = self
            .stages
            .seo
            .score(&context, &draft)
            .await
            .map_err(|err| Error::generation("seo", err))?;
        self.publish(ReleaseEvent::progress(release_id, "seo", SEO_PERCENT));

        let word_count = draft.word_count;
        let artifact = ReleaseArtifact {
            draft,
            seo,
            angles: angles.angles,
            headlines: headlines.variants,
        };
        self.dao
            .save_artifact(org_id, release_id, &artifact)
            .await
            .map_err(Error::Storage)?;
        self.dao
            .update_status(org_id, release_id, ReleaseStatus::Complete, None)
            .await
            .map_err(Error::Storage)?;
        Ok(word_count)
    }

    fn publish(&self, event: ReleaseEvent) {
        self.hub.publish(&event);
        self.metrics.progress_events.inc();
    }
}

impl PipelineBuilder {
    pub(crate) fn new() -> Self {
        Self {
            context: None,
            angle: None,
            headline: None,
            draft: None,
            seo: None,
        }
    }

    pub(crate) fn with_context_stage(mut self, stage: Arc<dyn ContextStage>) -> Self {
        self.context = Some(stage);
        self
    }

    pub(crate) fn with_angle_stage(mut self, stage: Arc<dyn AngleStage>) -> Self {
        self.angle = Some(stage);
        self
    }

    pub(crate) fn with_headline_stage(mut self, stage: Arc<dyn HeadlineStage>) -> Self {
        self.headline = Some(stage);
        self
    }

    pub(crate) fn with_draft_stage(mut self, stage: Arc<dyn DraftStage>) -> Self {
        self.draft = Some(stage);
        self
    }

    pub(crate) fn with_seo_stage(mut self, stage: Arc<dyn SeoStage>) -> Self {
        self.seo = Some(stage);
        self
    }

    pub(crate) fn build(
        self,
        dao: Arc<dyn ReleaseDao>,
        quota: Arc<dyn QuotaGate>,
        hub: Arc<ProgressHub>,
        metrics: Arc<Metrics>,
    ) -> PipelineOrchestrator {
        let stages = PipelineStages {
            context: self
                .context
                .unwrap_or_else(|| panic!("context stage must be configured before build")),
            angle: self
                .angle
                .unwrap_or_else(|| panic!("angle stage must be configured before build")),
            headline: self
                .headline
                .unwrap_or_else(|| panic!("headline stage must be configured before build")),
            draft: self
                .draft
                .unwrap_or_else(|| panic!("draft stage must be configured before build")),
            seo: self
                .seo
                .unwrap_or_else(|| panic!("seo stage must be configured before build")),
        };

        PipelineOrchestrator {
            stages,
            dao,
            quota,
            hub,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::clients::UnmeteredQuota;
    use crate::pipeline::types::{
        Angle, AngleSelection, CompanyFootprint, Draft, GenerationContext, HeadlineSelection,
        HeadlineVariant, NewsType, SeoSummary,
    };
    use crate::store::dao::MemoryReleaseDao;
    use crate::store::models::ReleaseRecord;

    fn test_metrics() -> Arc<Metrics> {
        let registry = Arc::new(prometheus::Registry::new());
        Arc::new(Metrics::new(registry).expect("metrics should register"))
    }

    fn test_input() -> GenerationInput {
        GenerationInput {
            news_type: NewsType::ProductLaunch,
            announcement: "Acme shipped its new ledger product.".to_string(),
            company_name: "Acme".to_string(),
            company_description: None,
            headquarters: None,
            target_keywords: Vec::new(),
            spokesperson_name: None,
            spokesperson_title: None,
            secondary_spokesperson: None,
            secondary_spokesperson_title: None,
            preferred_angle: None,
        }
    }

    fn stub_context(input: &GenerationInput) -> GenerationContext {
        GenerationContext {
            input: input.clone(),
            footprint: CompanyFootprint {
                name: input.company_name.clone(),
                description: None,
                location: None,
            },
            seo_keywords: Vec::new(),
            industry_trends: vec!["automation".to_string()],
            personality: None,
            competitor_context: Vec::new(),
        }
    }

    fn stub_angle() -> Angle {
        Angle {
            angle_title: "Acme gains momentum".to_string(),
            newsworthiness_score: 60.0,
            uniqueness_score: 70.0,
            relevance_score: 50.0,
            total_score: 60.0,
            is_selected: true,
        }
    }

    fn stub_headline() -> HeadlineVariant {
        HeadlineVariant {
            headline: "Acme Announces Ledger".to_string(),
            seo_score: 50.0,
            virality_score: 50.0,
            readability_score: 90.0,
            score: 60.0,
            is_selected: true,
        }
    }

    fn stub_draft() -> Draft {
        let body = "Acme shipped its new ledger product.\n\nThe market noticed.".to_string();
        Draft {
            headline: "Acme Announces Ledger".to_string(),
            subheadline: "Acme gains momentum".to_string(),
            dateline: "[CITY], March 5, 2026".to_string(),
            word_count: crate::util::text::count_words(&body),
            paragraphs: vec![
                "Acme shipped its new ledger product.".to_string(),
                "The market noticed.".to_string(),
            ],
            body,
            quote1: "We are proud of this release.".to_string(),
            quote1_attribution: "a spokesperson for Acme".to_string(),
            quote2: None,
            quote2_attribution: None,
            boilerplate: "About Acme".to_string(),
        }
    }

    struct RecordingContext {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ContextStage for RecordingContext {
        async fn assemble(
            &self,
            _org_id: Uuid,
            input: &GenerationInput,
        ) -> anyhow::Result<GenerationContext> {
            self.order.lock().expect("order lock").push("context");
            Ok(stub_context(input))
        }
    }

    struct RecordingAngle {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl AngleStage for RecordingAngle {
        async fn find(&self, _context: &GenerationContext) -> anyhow::Result<AngleSelection> {
            self.order.lock().expect("order lock").push("angle");
            Ok(AngleSelection {
                angles: vec![stub_angle()],
                selected: stub_angle(),
            })
        }
    }

    struct RecordingHeadline {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl HeadlineStage for RecordingHeadline {
        async fn generate(
            &self,
            _context: &GenerationContext,
            _angle: &Angle,
        ) -> anyhow::Result<HeadlineSelection> {
            self.order.lock().expect("order lock").push("headline");
            Ok(HeadlineSelection {
                variants: vec![stub_headline()],
                selected: stub_headline(),
            })
        }
    }

    struct RecordingDraft {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl DraftStage for RecordingDraft {
        async fn compose(
            &self,
            _context: &GenerationContext,
            _angle: &Angle,
            _headline: &HeadlineVariant,
            _run_date: NaiveDate,
        ) -> anyhow::Result<Draft> {
            self.order.lock().expect("order lock").push("draft");
            Ok(stub_draft())
        }
    }

    struct RecordingSeo {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl SeoStage for RecordingSeo {
        async fn score(
            &self,
            _context: &GenerationContext,
            _draft: &Draft,
        ) -> anyhow::Result<SeoSummary> {
            self.order.lock().expect("order lock").push("seo");
            Ok(SeoSummary {
                keyword_density: std::collections::BTreeMap::new(),
                sentence_count: 2,
                avg_sentence_length: 5.0,
                readability_score: 80.0,
                readability_grade: "Easy".to_string(),
                suggestions: Vec::new(),
                passive_voice_count: 0,
            })
        }
    }

    struct FailingDraft;

    #[async_trait]
    impl DraftStage for FailingDraft {
        async fn compose(
            &self,
            _context: &GenerationContext,
            _angle: &Angle,
            _headline: &HeadlineVariant,
            _run_date: NaiveDate,
        ) -> anyhow::Result<Draft> {
            anyhow::bail!("dateline assembly fell over")
        }
    }

    struct DenyQuota;

    #[async_trait]
    impl QuotaGate for DenyQuota {
        async fn enforce(&self, org_id: Uuid) -> crate::error::Result<()> {
            Err(Error::QuotaExceeded { org_id })
        }
    }

    fn recording_orchestrator(
        order: &Arc<Mutex<Vec<&'static str>>>,
        dao: Arc<dyn ReleaseDao>,
        quota: Arc<dyn QuotaGate>,
        hub: Arc<ProgressHub>,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::builder()
            .with_context_stage(Arc::new(RecordingContext {
                order: Arc::clone(order),
            }))
            .with_angle_stage(Arc::new(RecordingAngle {
                order: Arc::clone(order),
            }))
            .with_headline_stage(Arc::new(RecordingHeadline {
                order: Arc::clone(order),
            }))
            .with_draft_stage(Arc::new(RecordingDraft {
                order: Arc::clone(order),
            }))
            .with_seo_stage(Arc::new(RecordingSeo {
                order: Arc::clone(order),
            }))
            .build(dao, quota, hub, test_metrics())
    }

    #[tokio::test]
    async fn orchestrator_runs_stages_in_order() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let dao = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let org_id = Uuid::now_v7();
        let input = test_input();
        let record = ReleaseRecord::new(org_id, Uuid::now_v7(), input.clone());
        dao.create_release(&record).await.expect("create release");

        let orchestrator = recording_orchestrator(
            &order,
            Arc::clone(&dao) as Arc<dyn ReleaseDao>,
            Arc::new(UnmeteredQuota),
            hub,
        );
        orchestrator
            .run(org_id, record.release_id, input)
            .await
            .expect("run should succeed");

        let stages = order.lock().expect("order lock").clone();
        assert_eq!(stages, vec!["context", "angle", "headline", "draft", "seo"]);

        let stored = dao
            .get_release(org_id, record.release_id)
            .await
            .expect("get release")
            .expect("release exists");
        assert_eq!(stored.status, ReleaseStatus::Complete);
        assert!(stored.draft.is_some());
        assert!(stored.seo.is_some());
        assert_eq!(stored.angles.len(), 1);
        assert_eq!(stored.headlines.len(), 1);
    }

    #[tokio::test]
    async fn subscriber_sees_full_event_sequence() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let dao = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let org_id = Uuid::now_v7();
        let input = test_input();
        let record = ReleaseRecord::new(org_id, Uuid::now_v7(), input.clone());
        dao.create_release(&record).await.expect("create release");

        let mut events = hub.subscribe(record.release_id);
        let orchestrator = recording_orchestrator(
            &order,
            Arc::clone(&dao) as Arc<dyn ReleaseDao>,
            Arc::new(UnmeteredQuota),
            Arc::clone(&hub),
        );
        orchestrator
            .run(org_id, record.release_id, input)
            .await
            .expect("run should succeed");

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        let kinds: Vec<&str> = seen.iter().map(ReleaseEvent::event_type).collect();
        assert_eq!(
            kinds,
            vec![
                "started", "progress", "progress", "progress", "progress", "progress", "completed"
            ]
        );
        let percents: Vec<u8> = seen
            .iter()
            .filter_map(|event| match event {
                ReleaseEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![15, 35, 55, 75, 90]);
        assert_eq!(hub.open_channels(), 0);
    }

    #[tokio::test]
    async fn quota_rejection_stops_before_any_stage() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let dao = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let org_id = Uuid::now_v7();
        let input = test_input();
        let record = ReleaseRecord::new(org_id, Uuid::now_v7(), input.clone());
        dao.create_release(&record).await.expect("create release");

        let mut events = hub.subscribe(record.release_id);
        let orchestrator = recording_orchestrator(
            &order,
            Arc::clone(&dao) as Arc<dyn ReleaseDao>,
            Arc::new(DenyQuota),
            Arc::clone(&hub),
        );
        let err = orchestrator
            .run(org_id, record.release_id, input)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert!(order.lock().expect("order lock").is_empty());

        // A record persisted before the gate flipped carries the denial as
        // a terminal error instead of sitting in draft.
        let stored = dao
            .get_release(org_id, record.release_id)
            .await
            .expect("get release")
            .expect("release exists");
        assert_eq!(stored.status, ReleaseStatus::Error);
        assert!(stored.error.as_deref().unwrap_or("").contains("quota"));

        let mut last = None;
        while let Ok(event) = events.try_recv() {
            last = Some(event);
        }
        match last {
            Some(ReleaseEvent::Failed { stage, .. }) => assert_eq!(stage, "quota"),
            other => panic!("expected failed event, got {other:?}"),
        }
        assert_eq!(hub.open_channels(), 0);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_quota() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let dao = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let mut input = test_input();
        input.announcement = "   ".to_string();

        let orchestrator = recording_orchestrator(
            &order,
            Arc::clone(&dao) as Arc<dyn ReleaseDao>,
            Arc::new(DenyQuota),
            hub,
        );
        let err = orchestrator
            .run(Uuid::now_v7(), Uuid::now_v7(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn stage_failure_marks_release_errored() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let dao = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let org_id = Uuid::now_v7();
        let input = test_input();
        let record = ReleaseRecord::new(org_id, Uuid::now_v7(), input.clone());
        dao.create_release(&record).await.expect("create release");

        let mut events = hub.subscribe(record.release_id);
        let orchestrator = PipelineOrchestrator::builder()
            .with_context_stage(Arc::new(RecordingContext {
                order: Arc::clone(&order),
            }))
            .with_angle_stage(Arc::new(RecordingAngle {
                order: Arc::clone(&order),
            }))
            .with_headline_stage(Arc::new(RecordingHeadline {
                order: Arc::clone(&order),
            }))
            .with_draft_stage(Arc::new(FailingDraft))
            .with_seo_stage(Arc::new(RecordingSeo {
                order: Arc::clone(&order),
            }))
            .build(
                Arc::clone(&dao) as Arc<dyn ReleaseDao>,
                Arc::new(UnmeteredQuota),
                Arc::clone(&hub),
                test_metrics(),
            );

        let err = orchestrator
            .run(org_id, record.release_id, input)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some("draft"));

        let stored = dao
            .get_release(org_id, record.release_id)
            .await
            .expect("get release")
            .expect("release exists");
        assert_eq!(stored.status, ReleaseStatus::Error);
        assert!(stored.error.as_deref().unwrap_or("").contains("draft"));
        assert!(stored.draft.is_none());

        let mut last = None;
        while let Ok(event) = events.try_recv() {
            last = Some(event);
        }
        match last {
            Some(ReleaseEvent::Failed { stage, .. }) => assert_eq!(stage, "draft"),
            other => panic!("expected failed event, got {other:?}"),
        }
        assert_eq!(hub.open_channels(), 0);
    }

    #[tokio::test]
    async fn default_stages_build_from_tables() {
        let tables = Arc::new(ScoringTables::builtin());
        let dao: Arc<dyn ReleaseDao> = Arc::new(MemoryReleaseDao::new());
        let hub = Arc::new(ProgressHub::new(16));
        let orchestrator = PipelineOrchestrator::new(
            tables,
            Arc::clone(&dao),
            Arc::new(UnmeteredQuota),
            hub,
            test_metrics(),
        )
        .expect("default stages should build");

        let org_id = Uuid::now_v7();
        let input = test_input();
        let record = ReleaseRecord::new(org_id, Uuid::now_v7(), input.clone());
        dao.create_release(&record).await.expect("create release");
        orchestrator
            .run(org_id, record.release_id, input)
            .await
            .expect("full default run should succeed");

        let stored = dao
            .get_release(org_id, record.release_id)
            .await
            .expect("get release")
            .expect("release exists");
        assert_eq!(stored.status, ReleaseStatus::Complete);
        let draft = stored.draft.expect("draft present");
        assert!(draft.paragraphs.len() >= 2);
        assert_eq!(draft.word_count, crate::util::text::count_words(&draft.body));
    }
}
