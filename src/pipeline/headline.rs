//! Headline variant stage.
//!
//! Expands the selected angle into deterministic headline variants and scores
//! each for SEO fitness, virality and readability. The combined score is a
//! fixed weighted sum; ties go to the earliest variant.

use std::sync::Arc;

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use regex::Regex;

use crate::pipeline::tables::ScoringTables;
use crate::pipeline::types::{
    Angle, GenerationContext, HeadlineSelection, HeadlineVariant, NewsType,
};
use crate::util::text::{average_word_length, contains_phrase, count_words, truncate_at_word};

const GIST_MAX_CHARS: usize = 60;

#[async_trait]
pub trait HeadlineStage: Send + Sync {
    async fn generate(
        &self,
        context: &GenerationContext,
        angle: &Angle,
    ) -> anyhow::Result<HeadlineSelection>;
}

pub struct DefaultHeadlineStage {
    tables: Arc<ScoringTables>,
    verb_matcher: AhoCorasick,
    figure: Regex,
}

impl DefaultHeadlineStage {
    pub fn new(tables: Arc<ScoringTables>) -> anyhow::Result<Self> {
        let verb_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(tables.power_verbs())?;
        Ok(Self {
            tables,
            verb_matcher,
            figure: Regex::new(r"\$\d[\d,.]*[A-Za-z]?|\d+(?:\.\d+)?%")?,
        })
    }

    /// Variant generation plus scoring. Pure given context and angle.
    #[must_use]
    pub fn generate_headlines(
        &self,
        context: &GenerationContext,
        angle: &Angle,
    ) -> HeadlineSelection {
        let weights = self.tables.headline_weights();
        let mut variants: Vec<HeadlineVariant> = self
            .candidate_headlines(context, angle)
            .into_iter()
            .map(|headline| {
                let seo = seo_score(context, &headline);
                let virality = self.virality_score(&headline);
                let readability = readability_score(&headline);
                let score = (weights.seo * seo
                    + weights.virality * virality
                    + weights.readability * readability)
                    .clamp(0.0, 100.0);
                HeadlineVariant {
                    headline,
                    seo_score: seo,
                    virality_score: virality,
                    readability_score: readability,
                    score,
                    is_selected: false,
                }
            })
            .collect();

        let scores: Vec<f32> = variants.iter().map(|v| v.score).collect();
        let winner = first_max_index(&scores);
        variants[winner].is_selected = true;

        HeadlineSelection {
            selected: variants[winner].clone(),
            variants,
        }
    }

    /// Six fixed-order variants. The fourth leads with the angle, the sixth
    /// with a concrete figure when the announcement carries one.
    fn candidate_headlines(&self, context: &GenerationContext, angle: &Angle) -> Vec<String> {
        let company = &context.footprint.name;
        let gist = headline_gist(context);
        let noun = type_noun(context.input.news_type);
        let verb = type_verb(context.input.news_type);
        let audience = context
            .seo_keywords
            .first()
            .map_or_else(|| "the Market".to_string(), |keyword| title_case(keyword));
        let keyword_lead = context
            .seo_keywords
            .first()
            .map(String::as_str)
            .or_else(|| context.industry_trends.first().map(String::as_str))
            .map_or_else(|| "In Focus".to_string(), title_case);
        let angle_lead = angle
            .angle_title
            .split(':')
            .next()
            .unwrap_or(&angle.angle_title)
            .trim()
            .to_string();

        let figure_variant = match self.figure.find(&context.input.announcement) {
            Some(figure) => format!(
                "{}: {company}'s {noun} by the Numbers",
                figure.as_str()
            ),
            None => format!("{company} Unveils {gist}"),
        };

        vec![
            format!("{company} Announces {gist}"),
            format!("{company} {verb} {gist}"),
            format!("{keyword_lead}: {gist}"),
            format!("{angle_lead}: {company}'s {noun}"),
            format!("What {company}'s {noun} Means for {audience}"),
            figure_variant,
        ]
    }

    /// Power verbs and concrete figures raise it; a readable word count
    /// keeps it up.
    fn virality_score(&self, headline: &str) -> f32 {
        let verb_hits = self.verb_matcher.find_iter(headline).count();
        let mut score = 30.0 + 12.0 * verb_hits as f32;
        score += match count_words(headline) {
            6..=12 => 20.0,
            13..=16 => 10.0,
            _ => 0.0,
        };
        if self.figure.is_match(headline) {
            score += 15.0;
        }
        score.clamp(0.0, 100.0)
    }
}

#[async_trait]
impl HeadlineStage for DefaultHeadlineStage {
    async fn generate(
        &self,
        context: &GenerationContext,
        angle: &Angle,
    ) -> anyhow::Result<HeadlineSelection> {
        Ok(self.generate_headlines(context, angle))
    }
}

/// Announcement gist for headline templates. A leading company name is
/// dropped so `"{company} Announces ..."` does not repeat it.
fn headline_gist(context: &GenerationContext) -> String {
    let announcement = &context.input.announcement;
    let rest = announcement
        .strip_prefix(context.footprint.name.as_str())
        .map(str::trim_start)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(announcement);
    capitalize_first(&truncate_at_word(rest, GIST_MAX_CHARS))
}

fn type_verb(news_type: NewsType) -> &'static str {
    match news_type {
        NewsType::ProductLaunch => "Launches",
        NewsType::Funding => "Secures",
        NewsType::Partnership => "Teams Up on",
        NewsType::Acquisition => "Acquires",
        NewsType::ExecutiveHire => "Welcomes",
        NewsType::Other => "Shares",
    }
}

fn type_noun(news_type: NewsType) -> &'static str {
    match news_type {
        NewsType::ProductLaunch => "launch",
        NewsType::Funding => "raise",
        NewsType::Partnership => "partnership",
        NewsType::Acquisition => "acquisition",
        NewsType::ExecutiveHire => "appointment",
        NewsType::Other => "announcement",
    }
}

/// Company presence, early keyword placement and search-friendly length.
fn seo_score(context: &GenerationContext, headline: &str) -> f32 {
    let mut score: f32 = 20.0;
    if contains_phrase(headline, &context.footprint.name) {
        score += 25.0;
    }
    if let Some(keyword) = context.seo_keywords.first() {
        let lowered = headline.to_lowercase();
        if let Some(position) = lowered.find(&keyword.to_lowercase()) {
            score += 25.0;
            if position < 30 {
                score += 10.0;
            }
        }
    }
    score += match headline.chars().count() {
        40..=70 => 20.0,
        30..=39 | 71..=90 => 10.0,
        _ => 0.0,
    };
    score.clamp(0.0, 100.0)
}

/// Penalizes overlong headlines, stacked clause punctuation and long words.
fn readability_score(headline: &str) -> f32 {
    let words = count_words(headline);
    let mut score = 100.0;
    if words > 14 {
        score -= 4.0 * (words - 14) as f32;
    }
    let punct = headline
        .chars()
        .filter(|c| matches!(c, ',' | ':' | ';'))
        .count();
    score -= 8.0 * punct.saturating_sub(1) as f32;
    if average_word_length(headline) > 7.0 {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0)
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strict `>` scan keeps the earliest index on ties.
fn first_max_index(scores: &[f32]) -> usize {
    let mut best = 0;
    for (idx, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = idx;
        }
    }
    best
}
