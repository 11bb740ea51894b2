//! スコアリングテーブル定義。
//!
//! 重み・業界トレンド・定型句などの採点データをコードから分離し、
//! バージョン付きで保持します。YAMLオーバーレイで部分差し替えが可能です。

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pipeline::types::NewsType;

/// Weights for combining angle sub-scores. Always positive, so the total
/// stays monotonic in every component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleWeights {
    pub newsworthiness: f32,
    pub uniqueness: f32,
    pub relevance: f32,
}

impl Default for AngleWeights {
    fn default() -> Self {
        Self {
            newsworthiness: 0.40,
            uniqueness: 0.30,
            relevance: 0.30,
        }
    }
}

/// Weights for combining headline sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadlineWeights {
    pub seo: f32,
    pub virality: f32,
    pub readability: f32,
}

impl Default for HeadlineWeights {
    fn default() -> Self {
        Self {
            seo: 0.40,
            virality: 0.30,
            readability: 0.30,
        }
    }
}

/// Readability thresholds used by the SEO stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityThresholds {
    /// Scores at or above this grade as "Easy".
    pub easy_min: f32,
    /// Scores at or above this (but below `easy_min`) grade as "Standard".
    pub standard_min: f32,
    /// Bodies shorter than this trigger the length suggestion.
    pub min_body_words: usize,
    /// Average sentence lengths above this trigger the long-sentence
    /// suggestion.
    pub max_avg_sentence_words: f32,
}

impl Default for ReadabilityThresholds {
    fn default() -> Self {
        Self {
            easy_min: 70.0,
            standard_min: 50.0,
            min_body_words: 150,
            max_avg_sentence_words: 22.0,
        }
    }
}

/// 採点テーブル一式。
#[derive(Debug, Clone)]
pub struct ScoringTables {
    version: u32,
    industry_trends: HashMap<NewsType, Vec<String>>,
    generic_trends: Vec<String>,
    power_verbs: Vec<String>,
    stock_phrases: Vec<String>,
    newsworthiness_base: HashMap<NewsType, f32>,
    angle_weights: AngleWeights,
    headline_weights: HeadlineWeights,
    readability: ReadabilityThresholds,
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScoringTables {
    /// 既定テーブルを構築する。
    #[must_use]
    pub fn builtin() -> Self {
        let mut industry_trends = HashMap::new();
        industry_trends.insert(
            NewsType::ProductLaunch,
            vec![
                "AI-assisted product development",
                "composable platform strategies",
                "customer-led roadmaps",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        industry_trends.insert(
            NewsType::Funding,
            vec![
                "late-stage capital discipline",
                "efficient growth",
                "operator-led venture rounds",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        industry_trends.insert(
            NewsType::Partnership,
            vec![
                "ecosystem go-to-market motions",
                "co-selling alliances",
                "open integration standards",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        industry_trends.insert(
            NewsType::Acquisition,
            vec![
                "market consolidation",
                "build-versus-buy platform plays",
                "talent-driven acquisitions",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );
        industry_trends.insert(
            NewsType::ExecutiveHire,
            vec![
                "operator experience over pedigree",
                "revenue-focused leadership",
                "distributed executive teams",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        let generic_trends: Vec<String> = vec![
            "digital transformation",
            "operational efficiency",
            "customer experience investment",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let power_verbs: Vec<String> = vec![
            "launches",
            "unveils",
            "secures",
            "accelerates",
            "transforms",
            "doubles",
            "expands",
            "lands",
            "debuts",
            "surpasses",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let stock_phrases: Vec<String> = vec![
            "industry-leading",
            "cutting-edge",
            "revolutionary",
            "game-changing",
            "best-in-class",
            "world-class",
            "state-of-the-art",
            "next-generation",
            "seamless",
            "synergy",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mut newsworthiness_base = HashMap::new();
        newsworthiness_base.insert(NewsType::Funding, 70.0);
        newsworthiness_base.insert(NewsType::Acquisition, 72.0);
        newsworthiness_base.insert(NewsType::ProductLaunch, 60.0);
        newsworthiness_base.insert(NewsType::Partnership, 55.0);
        newsworthiness_base.insert(NewsType::ExecutiveHire, 50.0);
        newsworthiness_base.insert(NewsType::Other, 40.0);

        Self {
            version: 1,
            industry_trends,
            generic_trends,
            power_verbs,
            stock_phrases,
            newsworthiness_base,
            angle_weights: AngleWeights::default(),
            headline_weights: HeadlineWeights::default(),
            readability: ReadabilityThresholds::default(),
        }
    }

    /// Built-in tables, optionally overlaid from a YAML file.
    pub fn load(overlay_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut tables = Self::builtin();
        if let Some(path) = overlay_path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading scoring tables overlay {}", path.display()))?;
            let overlay: TablesOverlay = serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing scoring tables overlay {}", path.display()))?;
            tables.apply(overlay)?;
        }
        tables.validate()?;
        Ok(tables)
    }

    fn apply(&mut self, overlay: TablesOverlay) -> anyhow::Result<()> {
        if let Some(version) = overlay.version {
            self.version = version;
        }
        if let Some(trends) = overlay.industry_trends {
            for (news_type, list) in trends {
                self.industry_trends.insert(news_type, list);
            }
        }
        if let Some(generic) = overlay.generic_trends {
            self.generic_trends = generic;
        }
        if let Some(verbs) = overlay.power_verbs {
            self.power_verbs = verbs;
        }
        if let Some(phrases) = overlay.stock_phrases {
            self.stock_phrases = phrases;
        }
        if let Some(base) = overlay.newsworthiness_base {
            for (news_type, score) in base {
                self.newsworthiness_base.insert(news_type, score);
            }
        }
        if let Some(weights) = overlay.angle_weights {
            self.angle_weights = weights;
        }
        if let Some(weights) = overlay.headline_weights {
            self.headline_weights = weights;
        }
        if let Some(readability) = overlay.readability {
            self.readability = readability;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.generic_trends.is_empty() {
            anyhow::bail!("generic industry trends must not be empty");
        }
        for (news_type, trends) in &self.industry_trends {
            if trends.is_empty() {
                anyhow::bail!("industry trends for {news_type} must not be empty");
            }
        }
        let AngleWeights {
            newsworthiness,
            uniqueness,
            relevance,
        } = self.angle_weights;
        if newsworthiness <= 0.0 || uniqueness <= 0.0 || relevance <= 0.0 {
            anyhow::bail!("angle weights must all be positive");
        }
        let HeadlineWeights {
            seo,
            virality,
            readability,
        } = self.headline_weights;
        if seo <= 0.0 || virality <= 0.0 || readability <= 0.0 {
            anyhow::bail!("headline weights must all be positive");
        }
        Ok(())
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// ニュース種別ごとのトレンド。未登録の種別は汎用トレンドに倒す。
    #[must_use]
    pub fn industry_trends(&self, news_type: NewsType) -> &[String] {
        match self.industry_trends.get(&news_type) {
            Some(trends) if !trends.is_empty() => trends,
            _ => &self.generic_trends,
        }
    }

    #[must_use]
    pub fn power_verbs(&self) -> &[String] {
        &self.power_verbs
    }

    #[must_use]
    pub fn stock_phrases(&self) -> &[String] {
        &self.stock_phrases
    }

    #[must_use]
    pub fn newsworthiness_base(&self, news_type: NewsType) -> f32 {
        self.newsworthiness_base
            .get(&news_type)
            .copied()
            .unwrap_or_else(|| {
                self.newsworthiness_base
                    .get(&NewsType::Other)
                    .copied()
                    .unwrap_or(40.0)
            })
    }

    #[must_use]
    pub fn angle_weights(&self) -> AngleWeights {
        self.angle_weights
    }

    #[must_use]
    pub fn headline_weights(&self) -> HeadlineWeights {
        self.headline_weights
    }

    #[must_use]
    pub fn readability(&self) -> ReadabilityThresholds {
        self.readability
    }
}

/// Partial override parsed from YAML. Missing sections keep their built-in
/// values; trend and base maps merge per key.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesOverlay {
    version: Option<u32>,
    industry_trends: Option<HashMap<NewsType, Vec<String>>>,
    generic_trends: Option<Vec<String>>,
    power_verbs: Option<Vec<String>>,
    stock_phrases: Option<Vec<String>>,
    newsworthiness_base: Option<HashMap<NewsType, f32>>,
    angle_weights: Option<AngleWeights>,
    headline_weights: Option<HeadlineWeights>,
    readability: Option<ReadabilityThresholds>,
}
