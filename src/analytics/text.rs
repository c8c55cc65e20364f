//! Meeting Text Analyzer
//!
//! Lightweight lexical analysis of subjects and bodies: keyword ranking,
//! topic categorization through an ordered rule table, naming hygiene, and
//! a keyword-based sentiment indicator. Everything here is heuristic and
//! table-driven; there is no model and no tokenizer beyond a word regex.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AnalyticsConfig, TextConfig};
use crate::types::error::{OrgLensError, Result};
use crate::types::EnrichedEvent;

// =============================================================================
// Result Types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentIndicator {
    Positive,
    UrgentNegative,
    Neutral,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub urgent_negative: usize,
    pub neutral: usize,
    /// Subjects that tripped the urgent list, sorted and deduplicated.
    pub urgent_subjects: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NamingInsights {
    pub vague_count: usize,
    pub vague_share: f64,
    /// Distinct offending subjects, sorted.
    pub vague_subjects: Vec<String>,
    /// Recurring series whose instance subjects disagree once trailing
    /// dates and counters are stripped.
    pub inconsistent_series: Vec<SeriesFinding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesFinding {
    pub series_id: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextInsights {
    /// Top keywords by frequency, descending, word tie-break.
    pub keywords: Vec<KeywordCount>,
    /// Meeting count per topic category; unmatched subjects count as "other".
    pub topics: BTreeMap<String, usize>,
    pub naming: NamingInsights,
    pub sentiment: SentimentCounts,
}

// =============================================================================
// Analyzer
// =============================================================================

struct CompiledCategory {
    name: String,
    pattern: Regex,
}

pub struct TextAnalyzer<'a> {
    config: &'a TextConfig,
    categories: Vec<CompiledCategory>,
    word: Regex,
    /// Trailing dates and counters, e.g. " - 3/14" or " #12".
    series_suffix: Regex,
}

impl<'a> TextAnalyzer<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Result<Self> {
        let text = &config.text;
        let categories = text
            .categories
            .iter()
            .map(|rule| {
                Ok(CompiledCategory {
                    name: rule.name.clone(),
                    pattern: Regex::new(&rule.pattern).map_err(|e| {
                        OrgLensError::config(format!(
                            "invalid pattern for category '{}': {e}",
                            rule.name
                        ))
                    })?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let word = Regex::new(r"[a-z][a-z0-9'\-]*")
            .map_err(|e| OrgLensError::config(format!("word pattern: {e}")))?;
        let series_suffix = Regex::new(r"(?:\s*[-–:#(]*\s*[\w/\.]*\d[\w/\.]*\)?)+\s*$")
            .map_err(|e| OrgLensError::config(format!("series pattern: {e}")))?;
        Ok(Self {
            config: text,
            categories,
            word,
            series_suffix,
        })
    }

    pub fn analyze(&self, events: &[EnrichedEvent]) -> TextInsights {
        let mut insights = TextInsights::default();
        if events.is_empty() {
            return insights;
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut vague: BTreeMap<String, ()> = BTreeMap::new();
        let mut urgent: BTreeMap<String, ()> = BTreeMap::new();
        let mut series: BTreeMap<String, BTreeMap<String, ()>> = BTreeMap::new();

        for event in events {
            let subject = event.event.subject.as_str();
            let body = event.event.body.as_deref().unwrap_or("");
            let text = format!("{subject} {body}").to_lowercase();

            for token in self.word.find_iter(&text) {
                let token = token.as_str();
                if token.len() <= 2 || self.config.stop_words.iter().any(|s| s == token) {
                    continue;
                }
                *counts.entry(token.to_string()).or_default() += 1;
            }

            let topic = self
                .categories
                .iter()
                .find(|c| c.pattern.is_match(subject))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "other".to_string());
            *insights.topics.entry(topic).or_default() += 1;

            if self.is_vague(subject) {
                insights.naming.vague_count += 1;
                vague.insert(subject.to_string(), ());
            }

            match self.sentiment(&text) {
                SentimentIndicator::Positive => insights.sentiment.positive += 1,
                SentimentIndicator::UrgentNegative => {
                    insights.sentiment.urgent_negative += 1;
                    urgent.insert(subject.to_string(), ());
                }
                SentimentIndicator::Neutral => insights.sentiment.neutral += 1,
            }

            if let Some(series_id) = &event.event.series_id {
                series
                    .entry(series_id.clone())
                    .or_default()
                    .insert(self.series_stem(subject), ());
            }
        }

        insights.naming.vague_share = insights.naming.vague_count as f64 / events.len() as f64;
        insights.naming.vague_subjects = vague.into_keys().collect();
        insights.sentiment.urgent_subjects = urgent.into_keys().collect();
        insights.naming.inconsistent_series = series
            .into_iter()
            .filter(|(_, variants)| variants.len() > 1)
            .map(|(series_id, variants)| SeriesFinding {
                series_id,
                variants: variants.into_keys().collect(),
            })
            .collect();

        let mut keywords: Vec<KeywordCount> = counts
            .into_iter()
            .map(|(word, count)| KeywordCount { word, count })
            .collect();
        keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        keywords.truncate(self.config.top_keywords);
        insights.keywords = keywords;

        insights
    }

    /// A subject is vague when it is a known generic title or has too few
    /// words to say what the meeting is for.
    fn is_vague(&self, subject: &str) -> bool {
        let trimmed = subject.trim().to_lowercase();
        if trimmed.is_empty() {
            return true;
        }
        if self.config.generic_titles.iter().any(|g| *g == trimmed) {
            return true;
        }
        trimmed.split_whitespace().count() < self.config.min_title_words
    }

    /// Urgent keywords dominate positive ones when both appear.
    fn sentiment(&self, lowercased: &str) -> SentimentIndicator {
        if self
            .config
            .sentiment
            .urgent_negative
            .iter()
            .any(|k| lowercased.contains(k.as_str()))
        {
            SentimentIndicator::UrgentNegative
        } else if self
            .config
            .sentiment
            .positive
            .iter()
            .any(|k| lowercased.contains(k.as_str()))
        {
            SentimentIndicator::Positive
        } else {
            SentimentIndicator::Neutral
        }
    }

    /// Subject with trailing dates and counters removed, lowercased, so
    /// "Sprint Review 3/14" and "Sprint Review 3/21" compare equal.
    fn series_stem(&self, subject: &str) -> String {
        self.series_suffix
            .replace(subject.trim(), "")
            .trim()
            .to_lowercase()
    }
}
