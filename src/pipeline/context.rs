//! Context assembly stage.
//!
//! Turns the raw brief into the `GenerationContext` every later stage reads:
//! sanitized copy, company footprint, deduplicated keywords, industry trends
//! for the news type and org-level brand data from the directory
//! collaborator.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::pipeline::tables::ScoringTables;
use crate::pipeline::types::{
    CompanyFootprint, GenerationContext, GenerationInput, TonePersonality,
};
use crate::util::sanitize::clean_brief;

#[async_trait]
pub trait ContextStage: Send + Sync {
    async fn assemble(
        &self,
        org_id: Uuid,
        input: &GenerationInput,
    ) -> anyhow::Result<GenerationContext>;
}

/// Source of org-level brand data. The worker runs standalone with the no-op
/// source; the host platform can wire in a directory-backed one.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    async fn personality(&self, org_id: Uuid) -> anyhow::Result<Option<TonePersonality>>;
    async fn competitor_context(&self, org_id: Uuid) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOrgDirectory;

#[async_trait]
impl OrgDirectory for NoopOrgDirectory {
    async fn personality(&self, _org_id: Uuid) -> anyhow::Result<Option<TonePersonality>> {
        Ok(None)
    }

    async fn competitor_context(&self, _org_id: Uuid) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct DefaultContextStage {
    tables: Arc<ScoringTables>,
    directory: Arc<dyn OrgDirectory>,
}

impl DefaultContextStage {
    pub fn new(tables: Arc<ScoringTables>, directory: Arc<dyn OrgDirectory>) -> Self {
        Self { tables, directory }
    }
}

#[async_trait]
impl ContextStage for DefaultContextStage {
    async fn assemble(
        &self,
        org_id: Uuid,
        input: &GenerationInput,
    ) -> anyhow::Result<GenerationContext> {
        let personality = self.directory.personality(org_id).await?;
        let competitors = self.directory.competitor_context(org_id).await?;
        Ok(assemble_context(&self.tables, input, personality, competitors))
    }
}

/// Pure assembly given already-resolved directory data. Identical arguments
/// produce structurally identical output.
#[must_use]
pub fn assemble_context(
    tables: &ScoringTables,
    input: &GenerationInput,
    personality: Option<TonePersonality>,
    competitor_context: Vec<String>,
) -> GenerationContext {
    let mut input = input.clone();
    input.announcement = clean_brief(&input.announcement);
    input.company_description = input
        .company_description
        .take()
        .map(|description| clean_brief(&description))
        .filter(|description| !description.is_empty());

    let footprint = CompanyFootprint {
        name: input.company_name.trim().to_string(),
        description: input.company_description.clone(),
        location: input
            .headquarters
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(String::from),
    };

    let seo_keywords = dedup_keywords(&input.target_keywords);
    let industry_trends = tables.industry_trends(input.news_type).to_vec();

    GenerationContext {
        input,
        footprint,
        seo_keywords,
        industry_trends,
        personality,
        competitor_context,
    }
}

/// Ordered dedup, case-insensitive, first casing wins.
fn dedup_keywords(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for keyword in raw {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            keywords.push(trimmed.to_string());
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::NewsType;

    fn brief() -> GenerationInput {
        GenerationInput {
            news_type: NewsType::Funding,
            announcement: "Acme raised $100M in Series C funding.".to_string(),
            company_name: "  Acme  ".to_string(),
            company_description: Some("<p>Workflow automation for finance teams.</p>".to_string()),
            headquarters: Some("   ".to_string()),
            target_keywords: vec![
                "workflow automation".to_string(),
                "  Workflow Automation ".to_string(),
                "fintech".to_string(),
                "".to_string(),
            ],
            spokesperson_name: None,
            spokesperson_title: None,
            secondary_spokesperson: None,
            secondary_spokesperson_title: None,
            preferred_angle: None,
        }
    }

    #[test]
    fn keywords_are_deduped_in_order() {
        let context =
            assemble_context(&ScoringTables::builtin(), &brief(), None, Vec::new());
        assert_eq!(context.seo_keywords, ["workflow automation", "fintech"]);
    }

    #[test]
    fn description_markup_is_stripped() {
        let context =
            assemble_context(&ScoringTables::builtin(), &brief(), None, Vec::new());
        assert_eq!(
            context.footprint.description.as_deref(),
            Some("Workflow automation for finance teams.")
        );
    }

    #[test]
    fn blank_headquarters_becomes_none() {
        let context =
            assemble_context(&ScoringTables::builtin(), &brief(), None, Vec::new());
        assert!(context.footprint.location.is_none());
        assert_eq!(context.footprint.name, "Acme");
    }

    #[test]
    fn trends_are_never_empty() {
        let mut input = brief();
        input.news_type = NewsType::Other;
        let context = assemble_context(&ScoringTables::builtin(), &input, None, Vec::new());
        assert!(!context.industry_trends.is_empty());
    }

    #[test]
    fn assembly_is_deterministic() {
        let tables = ScoringTables::builtin();
        let input = brief();
        let first = assemble_context(&tables, &input, None, vec!["Rival Inc".to_string()]);
        let second = assemble_context(&tables, &input, None, vec!["Rival Inc".to_string()]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stage_uses_directory_data() {
        let stage = DefaultContextStage::new(
            Arc::new(ScoringTables::builtin()),
            Arc::new(NoopOrgDirectory),
        );
        let context = stage.assemble(Uuid::nil(), &brief()).await.unwrap();
        assert!(context.personality.is_none());
        assert!(context.competitor_context.is_empty());
    }
}
