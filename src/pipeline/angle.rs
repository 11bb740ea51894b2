//! Angle discovery stage.
//!
//! Generates candidate narrative angles from archetype templates and scores
//! each on newsworthiness, uniqueness and relevance. Scoring is table-driven
//! and fully deterministic; ties on the weighted total go to the earliest
//! generated candidate.

use std::sync::Arc;

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use regex::Regex;

use crate::pipeline::tables::ScoringTables;
use crate::pipeline::types::{Angle, AngleSelection, GenerationContext, NewsType};
use crate::util::text::{contains_phrase, truncate_at_word};

/// Per-archetype score adjustments, indexed by generation slot.
const NEWSWORTHINESS_MOD: [f32; 5] = [0.0, 6.0, 2.0, 4.0, 8.0];
const UNIQUENESS_MOD: [f32; 5] = [0.0, 4.0, 6.0, 2.0, 8.0];

const GIST_MAX_CHARS: usize = 80;

#[async_trait]
pub trait AngleStage: Send + Sync {
    async fn find(&self, context: &GenerationContext) -> anyhow::Result<AngleSelection>;
}

pub struct DefaultAngleStage {
    tables: Arc<ScoringTables>,
    stock_matcher: AhoCorasick,
    currency: Regex,
    percent: Regex,
    magnitude: Regex,
    funding_round: Regex,
}

impl DefaultAngleStage {
    pub fn new(tables: Arc<ScoringTables>) -> anyhow::Result<Self> {
        let stock_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(tables.stock_phrases())?;
        Ok(Self {
            tables,
            stock_matcher,
            currency: Regex::new(r"\$\d[\d,.]*")?,
            percent: Regex::new(r"\d+(?:\.\d+)?%")?,
            magnitude: Regex::new(r"(?i)\b(?:million|billion|trillion)\b")?,
            funding_round: Regex::new(r"(?i)series\s+[a-g]\b")?,
        })
    }

    /// Candidate generation plus scoring. Pure given the context.
    #[must_use]
    pub fn find_angles(&self, context: &GenerationContext) -> AngleSelection {
        let titles = candidate_titles(context);
        let weights = self.tables.angle_weights();
        let base = self.tables.newsworthiness_base(context.input.news_type);
        let signal = self.announcement_signal(&context.input.announcement);

        let mut angles: Vec<Angle> = titles
            .iter()
            .enumerate()
            .map(|(slot, title)| {
                let newsworthiness = (base + signal + NEWSWORTHINESS_MOD[slot]).clamp(0.0, 100.0);
                let uniqueness = self.uniqueness(slot, title);
                let relevance = relevance(context, title);
                let total = (weights.newsworthiness * newsworthiness
                    + weights.uniqueness * uniqueness
                    + weights.relevance * relevance)
                    .clamp(0.0, 100.0);
                Angle {
                    angle_title: title.clone(),
                    newsworthiness_score: newsworthiness,
                    uniqueness_score: uniqueness,
                    relevance_score: relevance,
                    total_score: total,
                    is_selected: false,
                }
            })
            .collect();

        let winner = preferred_index(&titles, context.input.preferred_angle.as_deref())
            .unwrap_or_else(|| {
                let totals: Vec<f32> = angles.iter().map(|a| a.total_score).collect();
                first_max_index(&totals)
            });
        angles[winner].is_selected = true;

        AngleSelection {
            selected: angles[winner].clone(),
            angles,
        }
    }

    /// Concrete figures in the announcement raise newsworthiness.
    fn announcement_signal(&self, announcement: &str) -> f32 {
        let mut boost = 0.0;
        if self.currency.is_match(announcement) {
            boost += 12.0;
        }
        if self.percent.is_match(announcement) {
            boost += 6.0;
        }
        if self.magnitude.is_match(announcement) {
            boost += 8.0;
        }
        if self.funding_round.is_match(announcement) {
            boost += 6.0;
        }
        if announcement.chars().any(|c| c.is_ascii_digit()) {
            boost += 4.0;
        }
        boost
    }

    /// Starts high, loses ground per stock-phrase hit, gains it back for
    /// concrete digits surfaced in the title.
    fn uniqueness(&self, slot: usize, title: &str) -> f32 {
        let stock_hits = self.stock_matcher.find_iter(title).count();
        let mut score = 70.0 - 10.0 * stock_hits as f32;
        if title.chars().any(|c| c.is_ascii_digit()) {
            score += 10.0;
        }
        (score + UNIQUENESS_MOD[slot]).clamp(0.0, 100.0)
    }
}

#[async_trait]
impl AngleStage for DefaultAngleStage {
    async fn find(&self, context: &GenerationContext) -> anyhow::Result<AngleSelection> {
        Ok(self.find_angles(context))
    }
}

/// Five fixed-order archetypes; the last is specific to the news type.
fn candidate_titles(context: &GenerationContext) -> Vec<String> {
    let company = &context.footprint.name;
    let gist = truncate_at_word(&context.input.announcement, GIST_MAX_CHARS);
    let trend = context
        .industry_trends
        .first()
        .map_or("the market", String::as_str);

    let type_specific = match context.input.news_type {
        NewsType::Funding => format!("Fueling the next phase: {gist}"),
        NewsType::Acquisition => format!("Consolidation play: {gist}"),
        NewsType::ProductLaunch => format!("From roadmap to reality: {gist}"),
        NewsType::Partnership => format!("Stronger together: {gist}"),
        NewsType::ExecutiveHire => format!("New leadership, new direction: {gist}"),
        NewsType::Other => format!("Behind the announcement: {gist}"),
    };

    vec![
        format!("{company} gains momentum: {gist}"),
        format!("A turning point for {trend}: {gist}"),
        format!("What {gist} means for customers"),
        format!("{company} stakes its claim: {gist}"),
        type_specific,
    ]
}

/// Keyword overlap dominates; trend overlap tops it up. A brief without
/// keywords gets a neutral floor instead of zero.
fn relevance(context: &GenerationContext, title: &str) -> f32 {
    let keyword_part = if context.seo_keywords.is_empty() {
        35.0
    } else {
        let hits = context
            .seo_keywords
            .iter()
            .filter(|keyword| contains_phrase(title, keyword))
            .count();
        hits as f32 / context.seo_keywords.len() as f32 * 70.0
    };

    let trend_part = if context.industry_trends.is_empty() {
        0.0
    } else {
        let hits = context
            .industry_trends
            .iter()
            .filter(|trend| contains_phrase(title, trend))
            .count();
        hits as f32 / context.industry_trends.len() as f32 * 30.0
    };

    (keyword_part + trend_part).clamp(0.0, 100.0)
}

/// First candidate containing the caller's hint wins outright.
fn preferred_index(titles: &[String], hint: Option<&str>) -> Option<usize> {
    let hint = hint.map(str::trim).filter(|h| !h.is_empty())?;
    titles.iter().position(|title| contains_phrase(title, hint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::assemble_context;
    use crate::pipeline::types::GenerationInput;

    fn funding_context() -> GenerationContext {
        let input = GenerationInput {
            news_type: NewsType::Funding,
            announcement: "BigFundCo raised $100M in Series C funding to expand its platform."
                .to_string(),
            company_name: "BigFundCo".to_string(),
            company_description: None,
            headquarters: None,
            target_keywords: vec!["platform".to_string()],
            spokesperson_name: None,
            spokesperson_title: None,
            secondary_spokesperson: None,
            secondary_spokesperson_title: None,
            preferred_angle: None,
        };
        assemble_context(&ScoringTables::builtin(), &input, None, Vec::new())
    }

    fn stage() -> DefaultAngleStage {
        DefaultAngleStage::new(Arc::new(ScoringTables::builtin())).unwrap()
    }

    #[test]
    fn generates_at_least_three_candidates() {
        let selection = stage().find_angles(&funding_context());
        assert!(selection.angles.len() >= 3);
    }

    #[test]
    fn exactly_one_angle_is_selected() {
        let selection = stage().find_angles(&funding_context());
        let selected = selection.angles.iter().filter(|a| a.is_selected).count();
        assert_eq!(selected, 1);
        assert!(selection.selected.is_selected);
    }

    #[test]
    fn funding_round_announcement_scores_newsworthy() {
        let selection = stage().find_angles(&funding_context());
        let avg: f32 = selection
            .angles
            .iter()
            .map(|a| a.newsworthiness_score)
            .sum::<f32>()
            / selection.angles.len() as f32;
        assert!(avg >= 50.0, "average newsworthiness {avg} below 50");
    }

    #[test]
    fn scores_stay_in_range() {
        let selection = stage().find_angles(&funding_context());
        for angle in &selection.angles {
            for score in [
                angle.newsworthiness_score,
                angle.uniqueness_score,
                angle.relevance_score,
                angle.total_score,
            ] {
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }

    #[test]
    fn preferred_angle_hint_forces_selection() {
        let mut context = funding_context();
        context.input.preferred_angle = Some("stakes its claim".to_string());
        let selection = stage().find_angles(&context);
        assert!(selection.selected.angle_title.contains("stakes its claim"));
    }

    #[test]
    fn unmatched_hint_falls_back_to_score_winner() {
        let mut context = funding_context();
        context.input.preferred_angle = Some("quantum leap".to_string());
        let with_hint = stage().find_angles(&context);
        context.input.preferred_angle = None;
        let without_hint = stage().find_angles(&context);
        assert_eq!(with_hint.selected.angle_title, without_hint.selected.angle_title);
    }

    #[test]
    fn stock_phrases_reduce_uniqueness() {
        let mut cliched = funding_context();
        cliched.input.announcement =
            "BigFundCo raised a revolutionary game-changing industry-leading $100M round."
                .to_string();
        let plain = stage().find_angles(&funding_context());
        let noisy = stage().find_angles(&cliched);
        // same archetype slot, cliched announcement text embedded in the title
        assert!(noisy.angles[0].uniqueness_score < plain.angles[0].uniqueness_score);
    }

    #[test]
    fn selection_is_deterministic() {
        let first = stage().find_angles(&funding_context());
        let second = stage().find_angles(&funding_context());
        assert_eq!(first, second);
    }

    #[test]
    fn first_max_wins_ties() {
        assert_eq!(first_max_index(&[3.0, 3.0, 2.0]), 0);
        assert_eq!(first_max_index(&[1.0, 5.0, 5.0]), 1);
        assert_eq!(first_max_index(&[2.0]), 0);
    }
}
