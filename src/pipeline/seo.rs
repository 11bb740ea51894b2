//! SEO and readability scoring stage.
//!
//! Reports keyword density, sentence statistics, a Flesch-style readability
//! score with a coarse grade, passive-voice usage and a fixed-order list of
//! actionable suggestions. Each failing check contributes exactly one
//! suggestion.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::pipeline::tables::{ReadabilityThresholds, ScoringTables};
use crate::pipeline::types::{Draft, GenerationContext, SeoSummary};
use crate::util::text::{average_word_length, count_phrase, count_words, split_into_sentences};

#[async_trait]
pub trait SeoStage: Send + Sync {
    async fn score(
        &self,
        context: &GenerationContext,
        draft: &Draft,
    ) -> anyhow::Result<SeoSummary>;
}

pub struct DefaultSeoStage {
    tables: Arc<ScoringTables>,
    passive: Regex,
}

impl DefaultSeoStage {
    pub fn new(tables: Arc<ScoringTables>) -> anyhow::Result<Self> {
        Ok(Self {
            tables,
            passive: Regex::new(r"(?i)\b(?:is|are|was|were|be|been|being)\s+\w+(?:ed|en)\b")?,
        })
    }

    /// Scores a body against the target keywords. Pure given its inputs.
    #[must_use]
    pub fn score_body(&self, body: &str, keywords: &[String]) -> SeoSummary {
        let thresholds = self.tables.readability();
        let total_words = count_words(body);
        let sentences = split_into_sentences(body);
        let sentence_count = sentences.len();

        let keyword_density = if total_words == 0 {
            BTreeMap::new()
        } else {
            keywords
                .iter()
                .map(|keyword| {
                    let key = keyword.trim().to_lowercase();
                    let density = count_phrase(body, keyword) as f32 / total_words as f32;
                    (key, density)
                })
                .collect()
        };

        let avg_sentence_length = if sentence_count == 0 {
            0.0
        } else {
            total_words as f32 / sentence_count as f32
        };

        let readability_score = if sentence_count == 0 {
            0.0
        } else {
            readability(avg_sentence_length, average_word_length(body))
        };

        SeoSummary {
            keyword_density,
            sentence_count,
            avg_sentence_length,
            readability_score,
            readability_grade: grade_for(readability_score, thresholds).to_string(),
            suggestions: suggestions(body, keywords, total_words, avg_sentence_length, thresholds),
            passive_voice_count: self.passive.find_iter(body).count(),
        }
    }
}

#[async_trait]
impl SeoStage for DefaultSeoStage {
    async fn score(
        &self,
        context: &GenerationContext,
        draft: &Draft,
    ) -> anyhow::Result<SeoSummary> {
        Ok(self.score_body(&draft.body, &context.seo_keywords))
    }
}

/// Flesch-style transform: long sentences and long words push the score
/// down. Average word length over three characters stands in for syllable
/// count. Clamped to `0..=100`.
#[must_use]
pub fn readability(avg_sentence_length: f32, avg_word_length: f32) -> f32 {
    let syllable_proxy = (avg_word_length / 3.0).max(1.0);
    (206.835 - 1.015 * avg_sentence_length - 84.6 * syllable_proxy).clamp(0.0, 100.0)
}

fn grade_for(score: f32, thresholds: ReadabilityThresholds) -> &'static str {
    if score >= thresholds.easy_min {
        "Easy"
    } else if score >= thresholds.standard_min {
        "Standard"
    } else {
        "Difficult"
    }
}

/// Fixed order: body length, missing keywords, sentence length.
fn suggestions(
    body: &str,
    keywords: &[String],
    total_words: usize,
    avg_sentence_length: f32,
    thresholds: ReadabilityThresholds,
) -> Vec<String> {
    let mut out = Vec::new();

    if total_words < thresholds.min_body_words {
        out.push(format!(
            "Body is {total_words} words; aim for at least {} to give the release enough substance.",
            thresholds.min_body_words
        ));
    }

    let missing: Vec<&str> = keywords
        .iter()
        .filter(|keyword| count_phrase(body, keyword) == 0)
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        out.push(format!(
            "Keywords missing from the body: {}. Work them into the lead or context paragraphs.",
            missing.join(", ")
        ));
    }

    if avg_sentence_length > thresholds.max_avg_sentence_words {
        out.push(format!(
            "Average sentence length is {avg_sentence_length:.1} words; tighten sentences to \
             under {:.0}.",
            thresholds.max_avg_sentence_words
        ));
    }

    out
}
