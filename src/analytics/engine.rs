//! Insights Engine
//!
//! Orchestrates the four analyzers over one enriched event set and merges
//! their outputs into a single report, then evaluates the recommendation
//! rule table against the merged metrics.
//!
//! The analyzers are pure CPU work over shared immutable inputs, so they
//! run on blocking threads in parallel and their outputs are merged in a
//! fixed order. Events are sorted before analysis; combined with the
//! ordered aggregation inside each analyzer, the same input always
//! produces a byte-identical report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{AnalyticsConfig, Comparison, MetricKey, Priority};
use crate::types::error::{OrgLensError, Result};
use crate::types::{CalendarEvent, EnrichedEvent, JobFunction, JobLevel, Organization};

use super::cross_functional::{CrossFunctionalAnalyzer, CrossFunctionalInsights};
use super::manager::{ManagerAnalyzer, ManagerInsights};
use super::meeting::{MeetingAnalyzer, MeetingInsights};
use super::text::{TextAnalyzer, TextInsights};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub company_name: String,
    pub employee_count: usize,
    pub analyzed_events: usize,
    /// Excluded events tallied by reason.
    pub skipped_events: BTreeMap<String, usize>,
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// A fired recommendation rule, with the observed value that tripped it.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub priority: Priority,
    pub issue: String,
    pub advice: String,
    pub metric: MetricKey,
    pub observed: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightsReport {
    pub summary: ReportSummary,
    pub meeting: MeetingInsights,
    pub manager: ManagerInsights,
    pub cross_functional: CrossFunctionalInsights,
    pub text: TextInsights,
    pub recommendations: Vec<Recommendation>,
}

/// Per-person view over the same event set. The events are filtered to
/// those the person organizes or attends, then run through the same
/// analyzers as the organizational report.
#[derive(Debug, Clone, Serialize)]
pub struct IndividualReport {
    pub email: String,
    pub name: String,
    pub function: JobFunction,
    pub level: JobLevel,
    pub meeting_count: usize,
    pub total_hours: f64,
    pub organized_count: usize,
    pub one_on_one_count: usize,
    pub external_meetings: usize,
    pub avg_daily_hours: f64,
    pub fragmentation_score: f64,
    /// Most frequent internal co-attendees, descending, email tie-break.
    pub top_collaborators: Vec<Collaborator>,
    /// Full meeting-pattern view (matrix, type mix, timing, fragmentation)
    /// over just this person's events.
    pub meeting: MeetingInsights,
    pub text: TextInsights,
}

#[derive(Debug, Clone, Serialize)]
pub struct Collaborator {
    pub email: String,
    pub shared_meetings: usize,
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug)]
pub struct InsightsEngine {
    org: Arc<Organization>,
    config: Arc<AnalyticsConfig>,
}

impl InsightsEngine {
    /// Configuration is validated here, before any event is touched.
    pub fn new(org: Arc<Organization>, config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            org,
            config: Arc::new(config),
        })
    }

    pub fn organization(&self) -> &Organization {
        &self.org
    }

    /// Run the full organizational analysis.
    pub async fn analyze(&self, events: Vec<CalendarEvent>) -> Result<InsightsReport> {
        let (enriched, summary) = self.prepare(events);
        info!(
            events = enriched.len(),
            skipped = summary.skipped_events.values().sum::<usize>(),
            "starting analysis"
        );

        let events = Arc::new(enriched);

        let (meeting, manager, cross_functional, text) = tokio::join!(
            self.spawn({
                let (org, config, events) = self.shares(&events);
                move || Ok(MeetingAnalyzer::new(&org, &config).analyze(&events))
            }),
            self.spawn({
                let (org, config, events) = self.shares(&events);
                move || Ok(ManagerAnalyzer::new(&org, &config).analyze(&events))
            }),
            self.spawn({
                let (org, config, events) = self.shares(&events);
                move || Ok(CrossFunctionalAnalyzer::new(&org, &config).analyze(&events))
            }),
            self.spawn({
                let (_, config, events) = self.shares(&events);
                move || Ok(TextAnalyzer::new(&config)?.analyze(&events))
            }),
        );
        let (meeting, manager, cross_functional, text) =
            (meeting?, manager?, cross_functional?, text?);

        let recommendations = if events.is_empty() {
            Vec::new()
        } else {
            self.evaluate_rules(&meeting, &cross_functional, &text)
        };

        Ok(InsightsReport {
            summary,
            meeting,
            manager,
            cross_functional,
            text,
            recommendations,
        })
    }

    /// Per-person analysis over the events this employee organizes or attends.
    pub async fn analyze_individual(
        &self,
        email: &str,
        events: Vec<CalendarEvent>,
    ) -> Result<IndividualReport> {
        let key = email.to_lowercase();
        let employee = self
            .org
            .employee(&key)
            .ok_or_else(|| OrgLensError::UnknownEmployee(key.clone()))?
            .clone();

        let (enriched, _) = self.prepare(events);
        let mine: Vec<EnrichedEvent> = enriched
            .into_iter()
            .filter(|e| e.is_attendee(&key) || e.is_organized_by(&key))
            .collect();
        debug!(email = %key, events = mine.len(), "individual analysis");

        let total_hours: f64 = mine.iter().map(|e| e.duration_hours()).sum();
        let organized_count = mine.iter().filter(|e| e.is_organized_by(&key)).count();
        let one_on_one_count = mine.iter().filter(|e| e.is_one_on_one()).count();
        let external_meetings = mine.iter().filter(|e| e.has_external()).count();

        let days: std::collections::HashSet<_> = mine
            .iter()
            .filter(|e| !e.event.all_day)
            .map(|e| e.start_date())
            .collect();
        let avg_daily_hours = if days.is_empty() {
            0.0
        } else {
            total_hours / days.len() as f64
        };

        let meeting = MeetingAnalyzer::new(&self.org, &self.config).analyze(&mine);
        let text = TextAnalyzer::new(&self.config)?.analyze(&mine);
        let fragmentation_score = meeting
            .fragmentation
            .by_employee
            .get(&key)
            .copied()
            .unwrap_or(0.0);

        let mut shared: BTreeMap<String, usize> = BTreeMap::new();
        for event in &mine {
            for attendee in &event.attendees {
                if attendee.email != key && self.org.employee(&attendee.email).is_some() {
                    *shared.entry(attendee.email.clone()).or_default() += 1;
                }
            }
        }
        let mut top_collaborators: Vec<Collaborator> = shared
            .into_iter()
            .map(|(email, shared_meetings)| Collaborator {
                email,
                shared_meetings,
            })
            .collect();
        top_collaborators.sort_by(|a, b| {
            b.shared_meetings
                .cmp(&a.shared_meetings)
                .then_with(|| a.email.cmp(&b.email))
        });
        top_collaborators.truncate(5);

        Ok(IndividualReport {
            email: key,
            name: employee.name,
            function: employee.function,
            level: employee.level,
            meeting_count: mine.len(),
            total_hours,
            organized_count,
            one_on_one_count,
            external_meetings,
            avg_daily_hours,
            fragmentation_score,
            top_collaborators,
            meeting,
            text,
        })
    }

    /// Enrich and sort the raw events, producing the report summary shell.
    fn prepare(&self, mut events: Vec<CalendarEvent>) -> (Vec<EnrichedEvent>, ReportSummary) {
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        let outcome = crate::types::enrich_events(events, &self.org);

        let mut skipped: BTreeMap<String, usize> = BTreeMap::new();
        for skip in &outcome.skipped {
            *skipped.entry(skip.reason.to_string()).or_default() += 1;
        }

        let date_range = match (
            outcome.events.iter().map(|e| e.event.start).min(),
            outcome.events.iter().map(|e| e.event.end).max(),
        ) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        };

        let summary = ReportSummary {
            company_name: self.org.company_name.clone(),
            employee_count: self.org.employee_count(),
            analyzed_events: outcome.events.len(),
            skipped_events: skipped,
            date_range,
        };
        (outcome.events, summary)
    }

    fn shares(
        &self,
        events: &Arc<Vec<EnrichedEvent>>,
    ) -> (Arc<Organization>, Arc<AnalyticsConfig>, Arc<Vec<EnrichedEvent>>) {
        (
            Arc::clone(&self.org),
            Arc::clone(&self.config),
            Arc::clone(events),
        )
    }

    async fn spawn<T: Send + 'static>(
        &self,
        work: impl FnOnce() -> Result<T> + Send + 'static,
    ) -> Result<T> {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| OrgLensError::Report(format!("analysis task failed: {e}")))?
    }

    fn evaluate_rules(
        &self,
        meeting: &MeetingInsights,
        cross_functional: &CrossFunctionalInsights,
        text: &TextInsights,
    ) -> Vec<Recommendation> {
        let mut fired = Vec::new();
        for rule in &self.config.recommendations.rules {
            let observed = match rule.metric {
                MetricKey::AvgDailyMeetingHours => Some(meeting.avg_daily_meeting_hours),
                MetricKey::AvgMeetingDurationMinutes => Some(meeting.avg_duration_minutes),
                MetricKey::AvgFragmentationScore => Some(meeting.fragmentation.avg_score),
                MetricKey::RequiredResponseRate => Some(meeting.responses.response_rate),
                MetricKey::RecurringShare => Some(meeting.recurrence.recurring_share),
                MetricKey::DefaultDurationShare => Some(meeting.default_duration_share),
                MetricKey::VagueTitleShare => Some(text.naming.vague_share),
                MetricKey::OneOnOneShare => Some(meeting.one_on_one_share()),
                MetricKey::CollaborationHealthScore => {
                    cross_functional.health.as_ref().map(|h| h.score)
                }
                MetricKey::ExternalShare => Some(meeting.audience.external_share),
            };
            let Some(observed) = observed else { continue };
            let tripped = match rule.comparison {
                Comparison::Above => observed > rule.threshold,
                Comparison::Below => observed < rule.threshold,
            };
            if tripped {
                fired.push(Recommendation {
                    id: rule.id.clone(),
                    priority: rule.priority,
                    issue: rule.issue.clone(),
                    advice: rule.advice.clone(),
                    metric: rule.metric,
                    observed,
                    threshold: rule.threshold,
                });
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::tests::{event_at, test_org};

    fn engine() -> InsightsEngine {
        InsightsEngine::new(Arc::new(test_org()), AnalyticsConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_yields_zeroed_report() {
        let report = engine().analyze(vec![]).await.unwrap();
        assert_eq!(report.summary.analyzed_events, 0);
        assert!(report.summary.date_range.is_none());
        assert_eq!(report.meeting.total_meetings, 0);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_skipped_events_are_tallied_not_fatal() {
        let good = event_at("ok", "a@acme.com", &["b@acme.com"], 9, 30);
        let mut bad = event_at("bad", "a@acme.com", &["b@acme.com"], 10, 30);
        bad.end = bad.start - chrono::Duration::minutes(5);

        let report = engine().analyze(vec![good, bad]).await.unwrap();
        assert_eq!(report.summary.analyzed_events, 1);
        assert_eq!(report.summary.skipped_events["end before start"], 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_analysis() {
        let mut config = AnalyticsConfig::default();
        config.cross_functional.health.density = 0.9;
        let err = InsightsEngine::new(Arc::new(test_org()), config).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[tokio::test]
    async fn test_individual_unknown_employee_errors() {
        let err = engine()
            .analyze_individual("ghost@acme.com", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, OrgLensError::UnknownEmployee(_)));
    }

    #[tokio::test]
    async fn test_individual_report_counts() {
        let events = vec![
            event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30),
            event_at("e2", "b@acme.com", &["c@acme.com"], 10, 60),
            event_at("e3", "b@acme.com", &["x@vendor.io"], 12, 30),
        ];
        let report = engine()
            .analyze_individual("B@acme.com", events)
            .await
            .unwrap();
        assert_eq!(report.email, "b@acme.com");
        assert_eq!(report.meeting_count, 3);
        assert_eq!(report.organized_count, 2);
        assert_eq!(report.one_on_one_count, 2);
        assert_eq!(report.external_meetings, 1);
        assert_eq!(report.top_collaborators[0].email, "a@acme.com");
        // The same analyzer views exist for the filtered set
        assert_eq!(report.meeting.matrix.total_count(), 3);
        assert_eq!(report.meeting.type_mix.one_on_one, 2);
        // All three events fall on the same Monday
        assert_eq!(report.meeting.timing.by_weekday[0], 3);
        assert_eq!(report.text.topics.values().sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn test_report_is_deterministic() {
        let events = vec![
            event_at("e1", "a@acme.com", &["b@acme.com", "c@acme.com"], 9, 45),
            event_at("e2", "c@acme.com", &["b@acme.com"], 11, 30),
        ];
        let first = engine().analyze(events.clone()).await.unwrap();
        let second = engine().analyze(events).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rules_fire_on_thresholds() {
        // A single vague ad-hoc meeting: vague share 1.0 trips the naming
        // rule, response rate 1.0 keeps the response rule quiet
        let mut event = event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30);
        event.subject = "Sync".to_string();
        let report = engine().analyze(vec![event]).await.unwrap();
        assert!(report.recommendations.iter().any(|r| r.id == "vague-names"));
        assert!(
            !report
                .recommendations
                .iter()
                .any(|r| r.id == "low-response-rate")
        );
    }
}
