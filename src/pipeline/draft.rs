//! Draft composition stage.
//!
//! Assembles the selected headline and angle into a full press-release
//! draft: dateline, body paragraphs, quotes and boilerplate. The run date is
//! injected by the orchestrator so composition stays a pure function.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::pipeline::types::{Angle, Draft, GenerationContext, HeadlineVariant, NewsType};
use crate::util::text::count_words;

/// Dateline location used when the brief names no headquarters.
const CITY_PLACEHOLDER: &str = "[CITY]";

#[async_trait]
pub trait DraftStage: Send + Sync {
    async fn compose(
        &self,
        context: &GenerationContext,
        angle: &Angle,
        headline: &HeadlineVariant,
        run_date: NaiveDate,
    ) -> anyhow::Result<Draft>;
}

#[derive(Debug, Clone, Copy)]
pub struct DefaultDraftStage;

impl DefaultDraftStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultDraftStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DraftStage for DefaultDraftStage {
    async fn compose(
        &self,
        context: &GenerationContext,
        angle: &Angle,
        headline: &HeadlineVariant,
        run_date: NaiveDate,
    ) -> anyhow::Result<Draft> {
        Ok(compose_draft(context, angle, headline, run_date))
    }
}

/// Pure draft assembly. The body is the joined paragraphs, quotes and
/// boilerplate are separate fields, and `word_count` is always the word
/// count of the body.
#[must_use]
pub fn compose_draft(
    context: &GenerationContext,
    angle: &Angle,
    headline: &HeadlineVariant,
    run_date: NaiveDate,
) -> Draft {
    let company = &context.footprint.name;

    let paragraphs = body_paragraphs(context);
    let body = paragraphs.join("\n\n");
    let word_count = count_words(&body);

    let (quote2, quote2_attribution) = secondary_quote(context);

    Draft {
        headline: headline.headline.clone(),
        subheadline: angle.angle_title.clone(),
        dateline: dateline(context, run_date),
        body,
        paragraphs,
        quote1: primary_quote(context),
        quote1_attribution: primary_attribution(context),
        quote2,
        quote2_attribution,
        boilerplate: boilerplate(company, context.footprint.description.as_deref()),
        word_count,
    }
}

/// `"{LOCATION}, {Month D, YYYY}"`, location uppercased per wire convention.
fn dateline(context: &GenerationContext, run_date: NaiveDate) -> String {
    let location = context
        .footprint
        .location
        .as_deref()
        .map_or_else(|| CITY_PLACEHOLDER.to_string(), |city| city.to_uppercase());
    format!("{location}, {}", run_date.format("%B %-d, %Y"))
}

/// Lead, context weave and an optional competitive paragraph. Always at
/// least two paragraphs.
fn body_paragraphs(context: &GenerationContext) -> Vec<String> {
    let company = &context.footprint.name;
    let announcement = ensure_terminated(context.input.announcement.clone());

    let frame = match context.input.news_type {
        NewsType::Funding => {
            format!("The new capital positions {company} to accelerate its roadmap.")
        }
        NewsType::Acquisition => {
            format!("The acquisition broadens {company}'s reach in its core market.")
        }
        NewsType::ProductLaunch => {
            format!("The launch extends {company}'s product line into day-to-day operations.")
        }
        NewsType::Partnership => {
            format!("The partnership pairs {company}'s platform with a wider delivery network.")
        }
        NewsType::ExecutiveHire => {
            format!("The appointment strengthens {company}'s leadership bench.")
        }
        NewsType::Other => format!("The move signals continued momentum at {company}."),
    };
    let lead = format!("{announcement} {frame}");

    let mut weave = format!(
        "The announcement lands amid {}.",
        join_leading_pair(&context.industry_trends)
    );
    if !context.seo_keywords.is_empty() {
        weave.push_str(&format!(
            " For teams tracking {}, the timing underscores where the category is heading.",
            join_leading_pair(&context.seo_keywords)
        ));
    }

    let mut paragraphs = vec![lead, weave];

    if !context.competitor_context.is_empty() {
        paragraphs.push(format!(
            "{company} positions the move against {}. Buyers comparing the options will see \
             the differences most clearly in execution speed.",
            join_leading_pair(&context.competitor_context)
        ));
    }

    paragraphs
}

fn primary_quote(context: &GenerationContext) -> String {
    let opening = match context.input.news_type {
        NewsType::Funding => "This round is a vote of confidence in the team and the roadmap.",
        NewsType::Acquisition => {
            "Joining forces lets us deliver on a scale neither side could alone."
        }
        NewsType::ProductLaunch => "We built this to remove real friction from our customers' day.",
        NewsType::Partnership => "Our customers get the best of both platforms from day one.",
        NewsType::ExecutiveHire => "The opportunity here is to build on strong foundations.",
        NewsType::Other => "This step reflects where our customers are taking us.",
    };
    let follow = match context.seo_keywords.first() {
        Some(keyword) => format!("Expect rapid progress on {keyword} in the months ahead."),
        None => "Expect rapid progress in the months ahead.".to_string(),
    };
    format!("{opening} {follow}")
}

/// Named spokesperson when the brief provides one; otherwise an unnamed
/// company spokesperson. A named individual is never invented.
fn primary_attribution(context: &GenerationContext) -> String {
    let company = &context.footprint.name;
    match (
        context.input.spokesperson_name.as_deref(),
        context.input.spokesperson_title.as_deref(),
    ) {
        (Some(name), Some(title)) => format!("{name}, {title}"),
        (Some(name), None) => format!("{name} of {company}"),
        (None, _) => format!("a spokesperson for {company}"),
    }
}

fn secondary_quote(context: &GenerationContext) -> (Option<String>, Option<String>) {
    let Some(name) = context.input.secondary_spokesperson.as_deref() else {
        return (None, None);
    };
    let company = &context.footprint.name;
    let quote = "We held this to one test: does it make the people who rely on us faster? \
                 It does."
        .to_string();
    let attribution = match context.input.secondary_spokesperson_title.as_deref() {
        Some(title) => format!("{name}, {title}"),
        None => format!("{name} of {company}"),
    };
    (Some(quote), Some(attribution))
}

fn boilerplate(company: &str, description: Option<&str>) -> String {
    let about = description.map_or_else(
        || format!("{company} builds software for modern operations teams."),
        |text| ensure_terminated(text.to_string()),
    );
    format!("About {company}\n{about}")
}

fn join_leading_pair(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second, ..] => format!("{first} and {second}"),
    }
}

fn ensure_terminated(mut text: String) -> String {
    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}
