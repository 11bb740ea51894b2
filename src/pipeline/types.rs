//! Core type definitions for the release generation pipeline.
//!
//! Everything that moves between stages lives here: the announcement brief,
//! the assembled context, scored angle and headline candidates, the composed
//! draft and the SEO summary. All of it serializes, both for the HTTP
//! surface and for the JSONB artifact columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category of announcement. Drives trend lookup, angle archetypes and the
/// newsworthiness base score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsType {
    ProductLaunch,
    Funding,
    Partnership,
    Acquisition,
    ExecutiveHire,
    #[default]
    Other,
}

impl NewsType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NewsType::ProductLaunch => "product_launch",
            NewsType::Funding => "funding",
            NewsType::Partnership => "partnership",
            NewsType::Acquisition => "acquisition",
            NewsType::ExecutiveHire => "executive_hire",
            NewsType::Other => "other",
        }
    }
}

impl std::fmt::Display for NewsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NewsType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product_launch" => Ok(NewsType::ProductLaunch),
            "funding" => Ok(NewsType::Funding),
            "partnership" => Ok(NewsType::Partnership),
            "acquisition" => Ok(NewsType::Acquisition),
            "executive_hire" => Ok(NewsType::ExecutiveHire),
            "other" => Ok(NewsType::Other),
            _ => Err(format!("unknown news type: {s}")),
        }
    }
}

/// Announcement brief as submitted by the caller. Immutable for the duration
/// of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInput {
    #[serde(default)]
    pub news_type: NewsType,
    pub announcement: String,
    pub company_name: String,
    pub company_description: Option<String>,
    /// Dateline location. A placeholder is used when absent.
    pub headquarters: Option<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    pub spokesperson_name: Option<String>,
    pub spokesperson_title: Option<String>,
    pub secondary_spokesperson: Option<String>,
    pub secondary_spokesperson_title: Option<String>,
    /// Free-text hint; the first candidate angle containing it wins outright.
    pub preferred_angle: Option<String>,
}

impl GenerationInput {
    /// Checked before any stage runs. A brief with no announcement or no
    /// company name cannot produce a release.
    pub fn validate(&self) -> Result<()> {
        if self.announcement.trim().is_empty() {
            return Err(Error::validation("announcement must not be empty"));
        }
        if self.company_name.trim().is_empty() {
            return Err(Error::validation("company_name must not be empty"));
        }
        Ok(())
    }
}

/// Brand voice descriptor resolved from the org directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonePersonality {
    pub voice: String,
    #[serde(default)]
    pub descriptors: Vec<String>,
}

/// Company identity facts carried through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFootprint {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Everything downstream stages need, assembled once per run.
///
/// `seo_keywords` is an ordered dedup of the brief's target keywords.
/// `industry_trends` is never empty; unknown news types receive a generic
/// default set. `competitor_context` defaults to empty, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub input: GenerationInput,
    pub footprint: CompanyFootprint,
    pub seo_keywords: Vec<String>,
    pub industry_trends: Vec<String>,
    pub personality: Option<TonePersonality>,
    #[serde(default)]
    pub competitor_context: Vec<String>,
}

/// A candidate narrative angle with its component scores.
///
/// Scores are clamped to `0..=100`; `total_score` is a fixed weighted sum and
/// therefore monotonic in each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub angle_title: String,
    pub newsworthiness_score: f32,
    pub uniqueness_score: f32,
    pub relevance_score: f32,
    pub total_score: f32,
    pub is_selected: bool,
}

/// Angle stage output: every candidate plus a copy of the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSelection {
    pub angles: Vec<Angle>,
    pub selected: Angle,
}

/// A candidate headline with its component scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineVariant {
    pub headline: String,
    pub seo_score: f32,
    pub virality_score: f32,
    pub readability_score: f32,
    pub score: f32,
    pub is_selected: bool,
}

/// Headline stage output: every variant plus a copy of the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSelection {
    pub variants: Vec<HeadlineVariant>,
    pub selected: HeadlineVariant,
}

/// Composed press release.
///
/// `body` is `paragraphs` joined with blank lines and `word_count` always
/// equals `util::text::count_words(&body)`. Quotes are attributed to the
/// named spokesperson when one is given, otherwise to an unnamed company
/// spokesperson; a named individual is never invented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub headline: String,
    pub subheadline: String,
    pub dateline: String,
    pub body: String,
    pub paragraphs: Vec<String>,
    pub quote1: String,
    pub quote1_attribution: String,
    pub quote2: Option<String>,
    pub quote2_attribution: Option<String>,
    pub boilerplate: String,
    pub word_count: usize,
}

/// SEO and readability report over a draft body.
///
/// `keyword_density` uses a `BTreeMap` so serialized output has a stable
/// key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoSummary {
    pub keyword_density: BTreeMap<String, f32>,
    pub sentence_count: usize,
    pub avg_sentence_length: f32,
    pub readability_score: f32,
    pub readability_grade: String,
    pub suggestions: Vec<String>,
    pub passive_voice_count: usize,
}

/// Sentence-level comparison of two texts.
///
/// Counts satisfy `added + unchanged == rewritten sentences` and
/// `removed + unchanged == original sentences`. `modified` is reserved for
/// near-match detection and currently always 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}
