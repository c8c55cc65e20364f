//! Manager Analytics
//!
//! Per-pair 1:1 statistics for every manager and direct report, skip-level
//! exposure, the monitoring indicator, and at-risk relationship detection.
//!
//! Recency is always measured against the end of the latest event in the
//! data set, never the wall clock, so re-running over the same export
//! yields the same report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::types::{EnrichedEvent, Organization, ResponseStatus};

// =============================================================================
// Result Types
// =============================================================================

/// The three monitoring sub-signals, each in [0,1], and the weighted
/// 0-10 indicator they combine into. The breakdown is reported so a high
/// score is always explainable.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MonitoringIndicator {
    pub score: f64,
    /// 1:1 frequency relative to the expected cadence.
    pub cadence_signal: f64,
    /// Share of the report's team meetings the manager also attends.
    pub attendance_signal: f64,
    /// Share of the pair's 1:1s the manager organized.
    pub initiation_signal: f64,
}

/// 1:1 statistics for one manager-report pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairStats {
    pub manager: String,
    pub report: String,
    pub one_on_one_count: usize,
    pub total_hours: f64,
    /// Mean days between consecutive 1:1s; needs at least two.
    pub avg_cadence_days: Option<f64>,
    pub last_one_on_one: Option<DateTime<Utc>>,
    pub manager_initiated: usize,
    pub report_initiated: usize,
    pub monitoring: MonitoringIndicator,
}

/// Where a manager's meeting hours go. Buckets describe independent
/// properties of the same events, so they overlap and do not sum to
/// `total_hours`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TimeAllocation {
    /// Hours across every meeting the manager attends.
    pub total_hours: f64,
    pub one_on_one_hours: f64,
    /// Internal meetings of three or more that include a direct report.
    pub team_meeting_hours: f64,
    /// Meetings with at least one external attendee.
    pub external_hours: f64,
    /// Internal meetings whose resolved attendees span more than one
    /// function.
    pub cross_functional_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerSummary {
    pub email: String,
    pub name: String,
    pub direct_report_count: usize,
    /// One entry per direct report, sorted by report email.
    pub pairs: Vec<PairStats>,
    /// Hours in meetings with skip-level reports where the connecting
    /// direct manager is absent.
    pub skip_level_hours: f64,
    pub allocation: TimeAllocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtRiskReason {
    /// No 1:1 inside the trailing window (or ever).
    NoRecentOneOnOne,
    /// 1:1s happened but thinned out over the observed period.
    DecliningCadence,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtRiskPair {
    pub manager: String,
    pub report: String,
    pub reason: AtRiskReason,
    pub detail: String,
    pub days_since_last: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ManagerInsights {
    /// One summary per manager, sorted by email.
    pub managers: Vec<ManagerSummary>,
    /// Ranked worst-first: missing 1:1s before declining ones, then by
    /// manager and report email.
    pub at_risk: Vec<AtRiskPair>,
    pub total_one_on_ones: usize,
    /// Mean cadence across pairs that have one.
    pub avg_cadence_days: f64,
}

// =============================================================================
// Analyzer
// =============================================================================

pub struct ManagerAnalyzer<'a> {
    org: &'a Organization,
    config: &'a AnalyticsConfig,
}

impl<'a> ManagerAnalyzer<'a> {
    pub fn new(org: &'a Organization, config: &'a AnalyticsConfig) -> Self {
        Self { org, config }
    }

    pub fn analyze(&self, events: &[EnrichedEvent]) -> ManagerInsights {
        let mut insights = ManagerInsights::default();
        let Some(now) = events.iter().map(|e| e.event.end).max() else {
            return insights;
        };
        let earliest = events
            .iter()
            .map(|e| e.event.start)
            .min()
            .unwrap_or(now);
        let midpoint = earliest + (now - earliest) / 2;

        let mut cadences: Vec<f64> = Vec::new();

        for manager in self.org.managers() {
            let reports = self.org.direct_reports(&manager.email);
            let mut pairs = Vec::with_capacity(reports.len());

            for report in reports {
                let pair = self.pair_stats(&manager.email, report, events);
                insights.total_one_on_ones += pair.one_on_one_count;
                if let Some(cadence) = pair.avg_cadence_days {
                    cadences.push(cadence);
                }
                if let Some(at_risk) = self.assess_risk(&pair, events, now, midpoint) {
                    insights.at_risk.push(at_risk);
                }
                pairs.push(pair);
            }

            insights.managers.push(ManagerSummary {
                email: manager.email.clone(),
                name: manager.name.clone(),
                direct_report_count: reports.len(),
                pairs,
                skip_level_hours: self.skip_level_hours(&manager.email, events),
                allocation: self.time_allocation(&manager.email, reports, events),
            });
        }

        if !cadences.is_empty() {
            insights.avg_cadence_days = cadences.iter().sum::<f64>() / cadences.len() as f64;
        }
        insights.at_risk.sort_by(|a, b| {
            a.reason
                .cmp(&b.reason)
                .then_with(|| a.manager.cmp(&b.manager))
                .then_with(|| a.report.cmp(&b.report))
        });
        insights
    }

    fn pair_stats(&self, manager: &str, report: &str, events: &[EnrichedEvent]) -> PairStats {
        let mut one_on_ones: Vec<&EnrichedEvent> = events
            .iter()
            .filter(|e| e.is_one_on_one() && e.is_attendee(manager) && e.is_attendee(report))
            .collect();
        one_on_ones.sort_by_key(|e| e.event.start);

        let total_hours: f64 = one_on_ones.iter().map(|e| e.duration_hours()).sum();
        let manager_initiated = one_on_ones
            .iter()
            .filter(|e| e.is_organized_by(manager))
            .count();
        let report_initiated = one_on_ones.len() - manager_initiated;

        let avg_cadence_days = if one_on_ones.len() >= 2 {
            let gaps: Vec<f64> = one_on_ones
                .windows(2)
                .map(|pair| {
                    (pair[1].event.start - pair[0].event.start).num_minutes() as f64
                        / (24.0 * 60.0)
                })
                .collect();
            Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
        } else {
            None
        };

        let monitoring = self.monitoring_indicator(
            manager,
            report,
            &one_on_ones,
            avg_cadence_days,
            events,
        );

        PairStats {
            manager: manager.to_string(),
            report: report.to_string(),
            one_on_one_count: one_on_ones.len(),
            total_hours,
            avg_cadence_days,
            last_one_on_one: one_on_ones.last().map(|e| e.event.start),
            manager_initiated,
            report_initiated,
            monitoring,
        }
    }

    fn monitoring_indicator(
        &self,
        manager: &str,
        report: &str,
        one_on_ones: &[&EnrichedEvent],
        avg_cadence_days: Option<f64>,
        events: &[EnrichedEvent],
    ) -> MonitoringIndicator {
        let cadence_signal = match avg_cadence_days {
            Some(days) if days > 0.0 => {
                (self.config.manager.expected_cadence_days / days).clamp(0.0, 1.0)
            }
            Some(_) => 1.0,
            // A single observed 1:1 says nothing about frequency
            None if one_on_ones.len() == 1 => 0.5,
            None => 0.0,
        };

        let (mut team_meetings, mut with_manager) = (0usize, 0usize);
        for event in events {
            if event.attendee_count() < 3 || !attends(event, report) {
                continue;
            }
            team_meetings += 1;
            if attends(event, manager) {
                with_manager += 1;
            }
        }
        let attendance_signal = if team_meetings == 0 {
            0.0
        } else {
            with_manager as f64 / team_meetings as f64
        };

        let initiation_signal = if one_on_ones.is_empty() {
            0.0
        } else {
            one_on_ones
                .iter()
                .filter(|e| e.is_organized_by(manager))
                .count() as f64
                / one_on_ones.len() as f64
        };

        let weights = &self.config.manager.monitoring;
        let score = 10.0
            * (weights.cadence * cadence_signal
                + weights.team_attendance * attendance_signal
                + weights.initiation * initiation_signal);

        MonitoringIndicator {
            score: score.clamp(0.0, 10.0),
            cadence_signal,
            attendance_signal,
            initiation_signal,
        }
    }

    fn assess_risk(
        &self,
        pair: &PairStats,
        events: &[EnrichedEvent],
        now: DateTime<Utc>,
        midpoint: DateTime<Utc>,
    ) -> Option<AtRiskPair> {
        let window = chrono::Duration::days(self.config.manager.at_risk_window_days);

        let days_since_last = pair
            .last_one_on_one
            .map(|last| (now - last).num_days());

        match days_since_last {
            None => Some(AtRiskPair {
                manager: pair.manager.clone(),
                report: pair.report.clone(),
                reason: AtRiskReason::NoRecentOneOnOne,
                detail: "no 1:1 in the observed period".to_string(),
                days_since_last: None,
            }),
            Some(days) if days > window.num_days() => Some(AtRiskPair {
                manager: pair.manager.clone(),
                report: pair.report.clone(),
                reason: AtRiskReason::NoRecentOneOnOne,
                detail: format!("last 1:1 was {days} days ago"),
                days_since_last: Some(days),
            }),
            Some(days) => {
                // Recent enough; check for a thinning cadence instead
                let (first_half, second_half) = events
                    .iter()
                    .filter(|e| {
                        e.is_one_on_one()
                            && e.is_attendee(&pair.manager)
                            && e.is_attendee(&pair.report)
                    })
                    .fold((0usize, 0usize), |(first, second), e| {
                        if e.event.start < midpoint {
                            (first + 1, second)
                        } else {
                            (first, second + 1)
                        }
                    });
                if first_half >= 2 && second_half * 2 < first_half {
                    Some(AtRiskPair {
                        manager: pair.manager.clone(),
                        report: pair.report.clone(),
                        reason: AtRiskReason::DecliningCadence,
                        detail: format!(
                            "1:1s dropped from {first_half} to {second_half} across the observed period"
                        ),
                        days_since_last: Some(days),
                    })
                } else {
                    None
                }
            }
        }
    }

    fn time_allocation(
        &self,
        manager: &str,
        reports: &[String],
        events: &[EnrichedEvent],
    ) -> TimeAllocation {
        let mut out = TimeAllocation::default();
        for event in events {
            if !attends(event, manager) {
                continue;
            }
            let hours = event.duration_hours();
            out.total_hours += hours;
            if event.is_one_on_one() {
                out.one_on_one_hours += hours;
            }
            if event.has_external() {
                out.external_hours += hours;
                continue;
            }
            if event.attendee_count() >= 3 && reports.iter().any(|r| attends(event, r)) {
                out.team_meeting_hours += hours;
            }
            let mut functions = event
                .attendees
                .iter()
                .filter_map(|a| self.org.employee(&a.email).map(|e| e.function));
            if let Some(first) = functions.next() {
                if functions.any(|f| f != first) {
                    out.cross_functional_hours += hours;
                }
            }
        }
        out
    }

    fn skip_level_hours(&self, manager: &str, events: &[EnrichedEvent]) -> f64 {
        let skip_reports = self.org.skip_level_reports(manager);
        if skip_reports.is_empty() {
            return 0.0;
        }
        events
            .iter()
            .filter(|event| {
                if !attends(event, manager) {
                    return false;
                }
                skip_reports.iter().any(|skip| {
                    if !attends(event, skip) {
                        return false;
                    }
                    // A skip-level touch only counts when the connecting
                    // direct manager is not in the room
                    let direct_manager = self
                        .org
                        .employee(skip)
                        .and_then(|e| e.manager_email.as_deref());
                    direct_manager.is_none_or(|dm| !attends(event, dm))
                })
            })
            .map(|event| event.duration_hours())
            .sum()
    }
}

fn attends(event: &EnrichedEvent, email: &str) -> bool {
    event
        .attendee(email)
        .is_some_and(|a| a.response != ResponseStatus::Declined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::tests::event_at;
    use crate::types::{CalendarEvent, Employee, JobFunction, JobLevel};
    use chrono::Duration;

    fn org_with_manager() -> Organization {
        let mk = |email: &str, manager: Option<&str>, is_manager: bool| Employee {
            id: email.to_string(),
            email: email.to_string(),
            name: email.to_string(),
            job_title: String::new(),
            level: if is_manager {
                JobLevel::Manager
            } else {
                JobLevel::Ic
            },
            function: JobFunction::Engineering,
            department: String::new(),
            team: String::new(),
            manager_email: manager.map(|m| m.to_string()),
            location: String::new(),
            is_manager,
        };
        Organization::build(
            "Acme",
            "acme.com",
            vec![
                mk("a@acme.com", None, true),
                mk("b@acme.com", Some("a@acme.com"), true),
                mk("c@acme.com", Some("a@acme.com"), false),
                mk("d@acme.com", Some("b@acme.com"), false),
            ],
        )
    }

    fn weekly_one_on_ones(manager: &str, report: &str, weeks: usize) -> Vec<CalendarEvent> {
        (0..weeks)
            .map(|week| {
                let mut e = event_at(&format!("oo-{report}-{week}"), manager, &[report], 10, 30);
                e.start += Duration::weeks(week as i64);
                e.end += Duration::weeks(week as i64);
                e
            })
            .collect()
    }

    fn analyze(events: Vec<CalendarEvent>) -> ManagerInsights {
        let org = org_with_manager();
        let config = AnalyticsConfig::default();
        let enriched = crate::types::enrich_events(events, &org).events;
        ManagerAnalyzer::new(&org, &config).analyze(&enriched)
    }

    #[test]
    fn test_neglected_report_flagged_and_healthy_pair_not() {
        let insights = analyze(weekly_one_on_ones("a@acme.com", "b@acme.com", 10));

        // (a, c) had no 1:1s at all
        assert!(insights.at_risk.iter().any(|p| {
            p.manager == "a@acme.com"
                && p.report == "c@acme.com"
                && p.reason == AtRiskReason::NoRecentOneOnOne
        }));
        // (a, b) meets weekly and is healthy
        assert!(
            !insights
                .at_risk
                .iter()
                .any(|p| p.manager == "a@acme.com" && p.report == "b@acme.com")
        );

        let a = insights
            .managers
            .iter()
            .find(|m| m.email == "a@acme.com")
            .unwrap();
        let pair = a.pairs.iter().find(|p| p.report == "b@acme.com").unwrap();
        assert_eq!(pair.one_on_one_count, 10);
        let cadence = pair.avg_cadence_days.unwrap();
        assert!((cadence - 7.0).abs() < 0.01, "cadence was {cadence}");
    }

    #[test]
    fn test_stale_one_on_one_flagged() {
        // One early 1:1, then two months of other meetings
        let mut events = weekly_one_on_ones("a@acme.com", "b@acme.com", 1);
        let mut filler = event_at("f", "c@acme.com", &["d@acme.com"], 9, 30);
        filler.start += Duration::days(60);
        filler.end += Duration::days(60);
        events.push(filler);

        let insights = analyze(events);
        let flagged = insights
            .at_risk
            .iter()
            .find(|p| p.manager == "a@acme.com" && p.report == "b@acme.com")
            .unwrap();
        assert_eq!(flagged.reason, AtRiskReason::NoRecentOneOnOne);
        assert!(flagged.days_since_last.unwrap() > 21);
    }

    #[test]
    fn test_declining_cadence_flagged() {
        // Four 1:1s in the first month, then a single one much later
        let mut events = weekly_one_on_ones("a@acme.com", "b@acme.com", 4);
        let mut late = event_at("late", "a@acme.com", &["b@acme.com"], 10, 30);
        late.start += Duration::days(80);
        late.end += Duration::days(80);
        events.push(late);

        let insights = analyze(events);
        let flagged = insights
            .at_risk
            .iter()
            .find(|p| p.manager == "a@acme.com" && p.report == "b@acme.com")
            .unwrap();
        assert_eq!(flagged.reason, AtRiskReason::DecliningCadence);
    }

    #[test]
    fn test_monitoring_indicator_in_range_and_explained() {
        let mut events = weekly_one_on_ones("a@acme.com", "b@acme.com", 6);
        // Manager sits in on every team meeting the report has
        for i in 0..4 {
            let mut team = event_at(
                &format!("team-{i}"),
                "b@acme.com",
                &["a@acme.com", "c@acme.com", "d@acme.com"],
                14,
                60,
            );
            team.start += Duration::days(i);
            team.end += Duration::days(i);
            events.push(team);
        }

        let insights = analyze(events);
        let a = insights
            .managers
            .iter()
            .find(|m| m.email == "a@acme.com")
            .unwrap();
        let pair = a.pairs.iter().find(|p| p.report == "b@acme.com").unwrap();
        let m = &pair.monitoring;
        assert!((0.0..=10.0).contains(&m.score));
        // Weekly beats the biweekly expectation, so the cadence signal pegs
        assert!((m.cadence_signal - 1.0).abs() < 1e-9);
        assert!((m.attendance_signal - 1.0).abs() < 1e-9);
        assert!((m.initiation_signal - 1.0).abs() < 1e-9);
        assert!((m.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_skip_level_hours_exclude_connecting_manager() {
        // a -> b -> d: d is a's skip-level report
        let with_b = event_at("e1", "a@acme.com", &["b@acme.com", "d@acme.com"], 9, 60);
        let without_b = event_at("e2", "a@acme.com", &["c@acme.com", "d@acme.com"], 11, 60);
        let insights = analyze(vec![with_b, without_b]);
        let a = insights
            .managers
            .iter()
            .find(|m| m.email == "a@acme.com")
            .unwrap();
        assert!((a.skip_level_hours - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_allocation_buckets_manager_hours() {
        let one_on_one = event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30);
        let team = event_at(
            "e2",
            "a@acme.com",
            &["b@acme.com", "c@acme.com", "d@acme.com"],
            10,
            60,
        );
        let external = event_at("e3", "a@acme.com", &["x@vendor.io"], 14, 60);
        let insights = analyze(vec![one_on_one, team, external]);
        let a = insights
            .managers
            .iter()
            .find(|m| m.email == "a@acme.com")
            .unwrap();
        let alloc = &a.allocation;
        assert!((alloc.total_hours - 2.5).abs() < 1e-9);
        assert!((alloc.one_on_one_hours - 0.5).abs() < 1e-9);
        assert!((alloc.team_meeting_hours - 1.0).abs() < 1e-9);
        assert!((alloc.external_hours - 1.0).abs() < 1e-9);
        // Everyone here is Engineering, so nothing crosses a function
        assert_eq!(alloc.cross_functional_hours, 0.0);
    }

    #[test]
    fn test_empty_input_is_empty() {
        let insights = analyze(vec![]);
        assert!(insights.managers.is_empty());
        assert!(insights.at_risk.is_empty());
        assert_eq!(insights.total_one_on_ones, 0);
    }
}
