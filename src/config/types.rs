//! Configuration Types
//!
//! Every threshold, weight, and rule table the analyzers consume, as
//! explicit structs with documented serde defaults. There is no ambient
//! configuration: the engine receives one `AnalyticsConfig` and validates
//! it before any computation runs, so a bad boundary can never produce
//! silently wrong aggregates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::error::{OrgLensError, Result};
use crate::types::{JobFunction, JobLevel};

/// Root analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub buckets: BucketConfig,
    pub meeting: MeetingConfig,
    pub fragmentation: FragmentationConfig,
    pub rates: RateTable,
    pub manager: ManagerConfig,
    pub cross_functional: CrossFunctionalConfig,
    pub text: TextConfig,
    pub recommendations: RecommendationTable,
}

impl AnalyticsConfig {
    /// Validate all sections. Called by the engine before analysis starts.
    pub fn validate(&self) -> Result<()> {
        self.buckets.validate()?;
        self.meeting.validate()?;
        self.fragmentation.validate()?;
        self.manager.validate()?;
        self.cross_functional.validate()?;
        self.text.validate()?;
        Ok(())
    }
}

// =============================================================================
// Size / Duration Buckets
// =============================================================================

/// Bucket boundaries for the size-duration matrix. Boundaries are
/// inclusive upper bounds, so a value exactly on a boundary lands in the
/// smaller bucket (30 min -> short, 2 attendees -> small).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Attendee count up to which a meeting is "small" (default 2).
    pub size_small_max: usize,
    /// Attendee count up to which a meeting is "medium" (default 5).
    pub size_medium_max: usize,
    /// Minutes up to which a meeting is "short" (default 30).
    pub duration_short_max: i64,
    /// Minutes up to which a meeting is "medium" (default 60).
    pub duration_medium_max: i64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            size_small_max: 2,
            size_medium_max: 5,
            duration_short_max: 30,
            duration_medium_max: 60,
        }
    }
}

impl BucketConfig {
    fn validate(&self) -> Result<()> {
        if self.size_small_max == 0 || self.size_small_max >= self.size_medium_max {
            return Err(OrgLensError::config(format!(
                "size bucket boundaries must be monotonic: small_max={} medium_max={}",
                self.size_small_max, self.size_medium_max
            )));
        }
        if self.duration_short_max <= 0 || self.duration_short_max >= self.duration_medium_max {
            return Err(OrgLensError::config(format!(
                "duration bucket boundaries must be monotonic: short_max={} medium_max={}",
                self.duration_short_max, self.duration_medium_max
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Meeting Analyzer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Upper attendee bound for small-team meetings (default 8).
    pub small_team_max: usize,
    /// Upper attendee bound for large-team meetings (default 20);
    /// above this is all-hands.
    pub large_team_max: usize,
    /// Subject substrings that mark a meeting as all-hands regardless of size.
    pub all_hands_patterns: Vec<String>,
    /// Canonical scheduling default, for the adoption hygiene signal
    /// (30 or 60; default 60).
    pub default_duration_minutes: i64,
    /// Functions whose external-meeting share is surfaced separately.
    pub customer_facing_functions: Vec<JobFunction>,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            small_team_max: 8,
            large_team_max: 20,
            all_hands_patterns: ["all hands", "all-hands", "town hall", "townhall"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_duration_minutes: 60,
            customer_facing_functions: vec![JobFunction::Sales, JobFunction::CustomerSuccess],
        }
    }
}

impl MeetingConfig {
    fn validate(&self) -> Result<()> {
        if self.small_team_max < 3 || self.small_team_max >= self.large_team_max {
            return Err(OrgLensError::config(format!(
                "meeting type boundaries must be monotonic: small_team_max={} large_team_max={}",
                self.small_team_max, self.large_team_max
            )));
        }
        if self.default_duration_minutes <= 0 {
            return Err(OrgLensError::config(
                "default_duration_minutes must be positive",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Fragmentation
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentationConfig {
    /// Gaps shorter than this are too small to focus in (default 30 min).
    pub focus_block_minutes: i64,
    /// Gap at or below this counts as back-to-back (default 0 min).
    pub back_to_back_buffer_minutes: i64,
    /// Working day start hour, UTC (default 9).
    pub work_start_hour: u32,
    /// Working day end hour, UTC (default 18).
    pub work_end_hour: u32,
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        Self {
            focus_block_minutes: 30,
            back_to_back_buffer_minutes: 0,
            work_start_hour: 9,
            work_end_hour: 18,
        }
    }
}

impl FragmentationConfig {
    fn validate(&self) -> Result<()> {
        if self.focus_block_minutes <= 0 {
            return Err(OrgLensError::config("focus_block_minutes must be positive"));
        }
        if self.back_to_back_buffer_minutes < 0 {
            return Err(OrgLensError::config(
                "back_to_back_buffer_minutes must not be negative",
            ));
        }
        if self.work_start_hour >= self.work_end_hour || self.work_end_hour > 24 {
            return Err(OrgLensError::config(format!(
                "working day must be a valid hour range: {}..{}",
                self.work_start_hour, self.work_end_hour
            )));
        }
        Ok(())
    }

    /// Working-day span in minutes.
    pub fn work_span_minutes(&self) -> i64 {
        i64::from(self.work_end_hour - self.work_start_hour) * 60
    }
}

// =============================================================================
// Hourly Rate Table
// =============================================================================

/// Estimated hourly rate per job level, for meeting cost estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub by_level: BTreeMap<JobLevel, f64>,
    /// Rate applied to external or unresolved attendees.
    pub fallback: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        let by_level = [
            (JobLevel::Ic, 60.0),
            (JobLevel::SeniorIc, 75.0),
            (JobLevel::Lead, 85.0),
            (JobLevel::Manager, 90.0),
            (JobLevel::SeniorManager, 105.0),
            (JobLevel::Director, 120.0),
            (JobLevel::Vp, 150.0),
            (JobLevel::CLevel, 200.0),
            (JobLevel::Unknown, 75.0),
        ]
        .into_iter()
        .collect();
        Self {
            by_level,
            fallback: 75.0,
        }
    }
}

impl RateTable {
    pub fn rate_for(&self, level: Option<JobLevel>) -> f64 {
        level
            .and_then(|l| self.by_level.get(&l).copied())
            .unwrap_or(self.fallback)
    }
}

// =============================================================================
// Manager Analytics
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// A pair is at risk after this many days without a 1:1 (default 21).
    pub at_risk_window_days: i64,
    /// Expected days between 1:1s, for the cadence sub-signal (default 14).
    pub expected_cadence_days: f64,
    pub monitoring: MonitoringWeights,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            at_risk_window_days: 21,
            expected_cadence_days: 14.0,
            monitoring: MonitoringWeights::default(),
        }
    }
}

impl ManagerConfig {
    fn validate(&self) -> Result<()> {
        if self.at_risk_window_days < 1 {
            return Err(OrgLensError::config("at_risk_window_days must be >= 1"));
        }
        if self.expected_cadence_days <= 0.0 {
            return Err(OrgLensError::config("expected_cadence_days must be positive"));
        }
        self.monitoring.validate()
    }
}

/// Weights for the three monitoring-indicator sub-signals. Each sub-signal
/// is normalized to [0,1]; the indicator is 10 × the weighted sum. Weights
/// must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringWeights {
    /// 1:1 frequency above the expected cadence (default 0.4).
    pub cadence: f64,
    /// Manager attendance rate in the report's team meetings (default 0.3).
    pub team_attendance: f64,
    /// Manager-initiated vs report-initiated 1:1 ratio (default 0.3).
    pub initiation: f64,
}

impl Default for MonitoringWeights {
    fn default() -> Self {
        Self {
            cadence: 0.4,
            team_attendance: 0.3,
            initiation: 0.3,
        }
    }
}

impl MonitoringWeights {
    fn validate(&self) -> Result<()> {
        validate_weight_sum(
            "monitoring weights",
            &[self.cadence, self.team_attendance, self.initiation],
        )
    }
}

// =============================================================================
// Cross-Functional Analyzer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossFunctionalConfig {
    pub health: HealthWeights,
    /// Function pairs expected to interact, as `"A:B"` with names sorted
    /// lexicographically. Empty = all pairs of active functions.
    pub expected_pairs: Vec<String>,
    /// Trailing window for the recency component, days (default 14).
    pub recency_window_days: i64,
    /// A function is a silo when its cross-group weight is below this
    /// percentile of all pairwise weights (default 25 = bottom quartile).
    pub silo_percentile: f64,
    /// Boundary spanners are employees above this percentile of
    /// distinct-function reach (default 90 = top decile).
    pub spanner_percentile: f64,
    /// Per-function hour cap in the spanning score, so one dominant
    /// pairing cannot inflate rank (default 10 h).
    pub spanner_hour_cap: f64,
}

impl Default for CrossFunctionalConfig {
    fn default() -> Self {
        Self {
            health: HealthWeights::default(),
            expected_pairs: Vec::new(),
            recency_window_days: 14,
            silo_percentile: 25.0,
            spanner_percentile: 90.0,
            spanner_hour_cap: 10.0,
        }
    }
}

impl CrossFunctionalConfig {
    fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("silo_percentile", self.silo_percentile),
            ("spanner_percentile", self.spanner_percentile),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(OrgLensError::config(format!(
                    "{name} must be within 0-100, got {pct}"
                )));
            }
        }
        if self.spanner_hour_cap <= 0.0 {
            return Err(OrgLensError::config("spanner_hour_cap must be positive"));
        }
        if self.recency_window_days < 1 {
            return Err(OrgLensError::config("recency_window_days must be >= 1"));
        }
        self.health.validate()
    }
}

/// Weights for the collaboration health score (0-100 = 100 × weighted
/// sum of the two [0,1] components). Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    /// Graph density over expected function pairs (default 0.6).
    pub density: f64,
    /// Interactions inside the trailing window vs total (default 0.4).
    pub recency: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            density: 0.6,
            recency: 0.4,
        }
    }
}

impl HealthWeights {
    fn validate(&self) -> Result<()> {
        validate_weight_sum("health weights", &[self.density, self.recency])
    }
}

// =============================================================================
// Text Analyzer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Tokens excluded from keyword ranking.
    pub stop_words: Vec<String>,
    /// Number of top keywords to report (default 25).
    pub top_keywords: usize,
    /// Ordered topic rules; first matching pattern wins. Subjects that
    /// match nothing fall through to "other".
    pub categories: Vec<CategoryRule>,
    /// Exact (lowercased, trimmed) subjects considered vague.
    pub generic_titles: Vec<String>,
    /// Subjects with fewer words than this are vague (default 2).
    pub min_title_words: usize,
    pub sentiment: SentimentLists,
}

impl Default for TextConfig {
    fn default() -> Self {
        let stop_words = [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
            "by", "from", "about", "into", "through", "during", "before", "after", "between",
            "then", "once", "here", "there", "when", "where", "why", "how", "all", "each",
            "few", "more", "most", "other", "some", "such", "not", "only", "own", "same", "so",
            "than", "too", "very", "can", "will", "just", "now", "re", "vs", "w",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let categories = vec![
            CategoryRule::new("1:1", r"(?i)\b(1:1|1-1|one[ -]on[ -]one)\b"),
            CategoryRule::new(
                "status/sync",
                r"(?i)\b(status|standup|stand-up|sync|check-?in|daily|weekly update)\b",
            ),
            CategoryRule::new(
                "planning",
                r"(?i)\b(plan|planning|roadmap|sprint|backlog|quarterly|okr|kickoff)\b",
            ),
            CategoryRule::new(
                "review",
                r"(?i)\b(review|retro|retrospective|post-?mortem|feedback|demo)\b",
            ),
            CategoryRule::new(
                "interview",
                r"(?i)\b(interview|hiring|candidate|debrief|recruiting)\b",
            ),
            CategoryRule::new(
                "social",
                r"(?i)\b(lunch|coffee|happy hour|team building|celebration|birthday|social)\b",
            ),
        ];

        Self {
            stop_words,
            top_keywords: 25,
            categories,
            generic_titles: [
                "meeting",
                "call",
                "sync",
                "chat",
                "catch up",
                "check in",
                "check-in",
                "touch base",
                "touchbase",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_title_words: 2,
            sentiment: SentimentLists::default(),
        }
    }
}

impl TextConfig {
    fn validate(&self) -> Result<()> {
        if self.min_title_words == 0 {
            return Err(OrgLensError::config("min_title_words must be >= 1"));
        }
        for rule in &self.categories {
            regex::Regex::new(&rule.pattern).map_err(|e| {
                OrgLensError::config(format!(
                    "invalid pattern for category '{}': {e}",
                    rule.name
                ))
            })?;
        }
        Ok(())
    }
}

/// One topic categorization rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub pattern: String,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Keyword lists for the heuristic sentiment indicator. This is keyword
/// presence only, not a trained classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentLists {
    pub positive: Vec<String>,
    pub urgent_negative: Vec<String>,
}

impl Default for SentimentLists {
    fn default() -> Self {
        Self {
            positive: [
                "celebrate", "congrats", "congratulations", "success", "win", "launch",
                "welcome", "kudos", "milestone",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            urgent_negative: [
                "urgent", "asap", "emergency", "critical", "incident", "outage",
                "escalation", "blocked", "postmortem", "sev1", "sev2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

// =============================================================================
// Recommendation Rules
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Positive,
}

/// Metric extracted from the merged insights that a rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    AvgDailyMeetingHours,
    AvgMeetingDurationMinutes,
    AvgFragmentationScore,
    RequiredResponseRate,
    RecurringShare,
    DefaultDurationShare,
    VagueTitleShare,
    OneOnOneShare,
    CollaborationHealthScore,
    ExternalShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    Below,
}

/// One threshold rule. Rules are data, evaluated independently and in
/// order; several may fire and none suppresses another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub id: String,
    pub metric: MetricKey,
    pub comparison: Comparison,
    pub threshold: f64,
    pub priority: Priority,
    pub issue: String,
    pub advice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationTable {
    pub rules: Vec<RecommendationRule>,
}

impl Default for RecommendationTable {
    fn default() -> Self {
        let rule = |id: &str,
                    metric: MetricKey,
                    comparison: Comparison,
                    threshold: f64,
                    priority: Priority,
                    issue: &str,
                    advice: &str| RecommendationRule {
            id: id.to_string(),
            metric,
            comparison,
            threshold,
            priority,
            issue: issue.to_string(),
            advice: advice.to_string(),
        };

        Self {
            rules: vec![
                rule(
                    "excessive-meeting-time",
                    MetricKey::AvgDailyMeetingHours,
                    Comparison::Above,
                    6.0,
                    Priority::High,
                    "Excessive meeting time",
                    "Average daily meeting load is above 6 hours. Reduce to 4-5 hours and move status updates to async channels.",
                ),
                rule(
                    "hour-long-default",
                    MetricKey::AvgMeetingDurationMinutes,
                    Comparison::Above,
                    50.0,
                    Priority::High,
                    "Meetings default to an hour",
                    "Most discussions fit in 25 or 50 minutes. Shorten the default slot to create buffers between meetings.",
                ),
                rule(
                    "fragmented-calendars",
                    MetricKey::AvgFragmentationScore,
                    Comparison::Above,
                    0.4,
                    Priority::High,
                    "High calendar fragmentation",
                    "Free time is broken into sub-focus-block gaps. Cluster meetings and protect meeting-free mornings.",
                ),
                rule(
                    "low-response-rate",
                    MetricKey::RequiredResponseRate,
                    Comparison::Below,
                    0.7,
                    Priority::Medium,
                    "Low meeting response rates",
                    "Required invitees are not responding. Send invites earlier and include clear agendas.",
                ),
                rule(
                    "recurring-load",
                    MetricKey::RecurringShare,
                    Comparison::Above,
                    0.7,
                    Priority::Medium,
                    "High recurring meeting share",
                    "Most meetings are recurring. Review recurring series quarterly and cancel low-value ones.",
                ),
                rule(
                    "default-duration-adoption",
                    MetricKey::DefaultDurationShare,
                    Comparison::Above,
                    0.6,
                    Priority::Medium,
                    "Default durations dominate",
                    "A majority of meetings use the calendar default length, a sign durations are not being chosen deliberately.",
                ),
                rule(
                    "vague-names",
                    MetricKey::VagueTitleShare,
                    Comparison::Above,
                    0.15,
                    Priority::Medium,
                    "Vague meeting names",
                    "Generic titles like 'Sync' hide the purpose. Use descriptive names with action verbs.",
                ),
                rule(
                    "healthy-one-on-ones",
                    MetricKey::OneOnOneShare,
                    Comparison::Above,
                    0.15,
                    Priority::Positive,
                    "Healthy 1:1 ratio",
                    "A solid share of meetings are 1:1s, which supports coaching and feedback.",
                ),
                rule(
                    "good-collaboration",
                    MetricKey::CollaborationHealthScore,
                    Comparison::Above,
                    60.0,
                    Priority::Positive,
                    "Good cross-functional collaboration",
                    "Functions are interacting broadly and recently. Keep investing in joint initiatives.",
                ),
            ],
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_weight_sum(name: &str, weights: &[f64]) -> Result<()> {
    for w in weights {
        if !(0.0..=1.0).contains(w) {
            return Err(OrgLensError::config(format!(
                "{name} must each be within 0-1, got {w}"
            )));
        }
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(OrgLensError::config(format!(
            "{name} must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AnalyticsConfig::default().validate().unwrap();
    }

    #[test]
    fn test_non_monotonic_buckets_rejected() {
        let mut config = AnalyticsConfig::default();
        config.buckets.duration_short_max = 90;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("monotonic"));
    }

    #[test]
    fn test_bad_weights_rejected() {
        let mut config = AnalyticsConfig::default();
        config.manager.monitoring.cadence = 0.9;
        assert!(config.validate().is_err());

        let mut config = AnalyticsConfig::default();
        config.cross_functional.health.density = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_percentile_rejected() {
        let mut config = AnalyticsConfig::default();
        config.cross_functional.silo_percentile = 140.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_category_pattern_rejected() {
        let mut config = AnalyticsConfig::default();
        config.text.categories.push(CategoryRule::new("broken", "(unclosed"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_lookup_falls_back() {
        let rates = RateTable::default();
        assert_eq!(rates.rate_for(Some(JobLevel::CLevel)), 200.0);
        assert_eq!(rates.rate_for(None), rates.fallback);
    }
}
