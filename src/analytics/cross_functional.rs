//! Cross-Functional Collaboration Analyzer
//!
//! Builds the function-pair interaction graph from shared meetings, scores
//! overall collaboration health, and surfaces the two ends of the
//! distribution: functions that barely interact across their boundary
//! (silos) and individuals who bridge unusually many functions (boundary
//! spanners).
//!
//! Thresholds are percentiles over the observed distribution, not absolute
//! numbers, so the analyzer adapts to organizations of any size.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::AnalyticsConfig;
use crate::types::{EnrichedEvent, JobFunction, Organization, ResponseStatus};

// =============================================================================
// Result Types
// =============================================================================

/// One edge in the function interaction graph.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionPairEdge {
    pub a: JobFunction,
    pub b: JobFunction,
    pub meetings: usize,
    pub shared_hours: f64,
    /// Shared hours normalized by the combined headcount of both
    /// functions, so large functions do not dominate by volume alone.
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthScore {
    /// 0-100 weighted combination of density and recency.
    pub score: f64,
    /// Share of expected function pairs with any interaction.
    pub density: f64,
    /// Share of cross-functional meetings inside the trailing window.
    pub recency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiloFinding {
    pub function: JobFunction,
    pub members: usize,
    /// Sum of normalized edge weights across this function's boundary.
    pub cross_weight: f64,
    /// The strongest partner function, if any interaction exists at all.
    pub strongest_partner: Option<JobFunction>,
    /// Members who meet the most inside the function's own walls, by
    /// hours in meetings that never leave the function.
    pub top_internal_collaborators: Vec<InternalCollaborator>,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InternalCollaborator {
    pub email: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundarySpanner {
    pub email: String,
    pub function: JobFunction,
    /// Distinct other functions this person shares meetings with.
    pub reach: usize,
    /// Σ per-partner-function hours, each capped so one heavy pairing
    /// cannot carry the rank.
    pub score: f64,
    pub hours_by_function: BTreeMap<JobFunction, f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossFunctionalInsights {
    /// All interacting pairs, sorted by function names.
    pub edges: Vec<FunctionPairEdge>,
    pub health: Option<HealthScore>,
    pub silos: Vec<SiloFinding>,
    /// Sorted by score descending, email tie-break.
    pub spanners: Vec<BoundarySpanner>,
    pub cross_functional_meetings: usize,
}

// =============================================================================
// Analyzer
// =============================================================================

pub struct CrossFunctionalAnalyzer<'a> {
    org: &'a Organization,
    config: &'a AnalyticsConfig,
}

impl<'a> CrossFunctionalAnalyzer<'a> {
    pub fn new(org: &'a Organization, config: &'a AnalyticsConfig) -> Self {
        Self { org, config }
    }

    pub fn analyze(&self, events: &[EnrichedEvent]) -> CrossFunctionalInsights {
        let mut insights = CrossFunctionalInsights::default();
        let Some(now) = events.iter().map(|e| e.event.end).max() else {
            return insights;
        };

        let mut edges: BTreeMap<(JobFunction, JobFunction), (usize, f64)> = BTreeMap::new();
        let mut recent_cross = 0usize;
        let window = chrono::Duration::days(self.config.cross_functional.recency_window_days);

        for event in events {
            let functions = self.functions_present(event);
            if functions.len() < 2 {
                continue;
            }
            insights.cross_functional_meetings += 1;
            if now - event.event.end <= window {
                recent_cross += 1;
            }
            let list: Vec<JobFunction> = functions.into_iter().collect();
            for (i, &fa) in list.iter().enumerate() {
                for &fb in &list[i + 1..] {
                    let key = order_pair(fa, fb);
                    let entry = edges.entry(key).or_insert((0, 0.0));
                    entry.0 += 1;
                    entry.1 += event.duration_hours();
                }
            }
        }

        insights.edges = edges
            .into_iter()
            .map(|((a, b), (meetings, shared_hours))| {
                let headcount = self.org.function_members(a).len()
                    + self.org.function_members(b).len();
                let weight = if headcount == 0 {
                    0.0
                } else {
                    shared_hours / headcount as f64
                };
                FunctionPairEdge {
                    a,
                    b,
                    meetings,
                    shared_hours,
                    weight,
                }
            })
            .collect();

        insights.health = self.score_health(&insights.edges, insights.cross_functional_meetings, recent_cross);
        insights.silos = self.detect_silos(&insights.edges, events);
        insights.spanners = self.find_spanners(events);
        insights
    }

    /// Functions of the internal, non-declined attendees of this event.
    fn functions_present(&self, event: &EnrichedEvent) -> BTreeSet<JobFunction> {
        event
            .attendees
            .iter()
            .filter(|a| a.response != ResponseStatus::Declined)
            .filter_map(|a| self.org.employee(&a.email).map(|e| e.function))
            .collect()
    }

    fn expected_pair_count(&self) -> usize {
        let configured = &self.config.cross_functional.expected_pairs;
        if !configured.is_empty() {
            return configured.len();
        }
        let n = self.org.active_functions().len();
        n * n.saturating_sub(1) / 2
    }

    fn score_health(
        &self,
        edges: &[FunctionPairEdge],
        cross_meetings: usize,
        recent_cross: usize,
    ) -> Option<HealthScore> {
        let expected = self.expected_pair_count();
        if expected == 0 {
            return None;
        }
        let observed = edges.iter().filter(|e| e.weight > 0.0).count();
        let density = (observed as f64 / expected as f64).clamp(0.0, 1.0);
        let recency = if cross_meetings == 0 {
            0.0
        } else {
            recent_cross as f64 / cross_meetings as f64
        };
        let weights = &self.config.cross_functional.health;
        let score = 100.0 * (weights.density * density + weights.recency * recency);
        Some(HealthScore {
            score: score.clamp(0.0, 100.0),
            density,
            recency,
        })
    }

    fn detect_silos(
        &self,
        edges: &[FunctionPairEdge],
        events: &[EnrichedEvent],
    ) -> Vec<SiloFinding> {
        let mut nonzero: Vec<f64> = edges
            .iter()
            .map(|e| e.weight)
            .filter(|w| *w > 0.0)
            .collect();
        if nonzero.is_empty() {
            // With no interaction at all, every populated function is siloed
            return self
                .org
                .active_functions()
                .into_iter()
                .map(|function| SiloFinding {
                    members: self.org.function_members(function).len(),
                    function,
                    cross_weight: 0.0,
                    strongest_partner: None,
                    top_internal_collaborators: self.internal_collaborators(function, events),
                    detail: "no cross-functional meetings observed".to_string(),
                })
                .collect();
        }
        nonzero.sort_by(f64::total_cmp);
        let threshold = percentile(&nonzero, self.config.cross_functional.silo_percentile);

        let mut findings = Vec::new();
        for function in self.org.active_functions() {
            let mut cross_weight = 0.0;
            let mut strongest: Option<(JobFunction, f64)> = None;
            for edge in edges {
                let partner = if edge.a == function {
                    edge.b
                } else if edge.b == function {
                    edge.a
                } else {
                    continue;
                };
                cross_weight += edge.weight;
                if strongest.is_none_or(|(_, w)| edge.weight > w) {
                    strongest = Some((partner, edge.weight));
                }
            }
            if cross_weight < threshold {
                findings.push(SiloFinding {
                    members: self.org.function_members(function).len(),
                    function,
                    cross_weight,
                    strongest_partner: strongest.map(|(p, _)| p),
                    top_internal_collaborators: self.internal_collaborators(function, events),
                    detail: format!(
                        "cross-boundary weight {cross_weight:.3} is below the bottom-quartile threshold {threshold:.3}"
                    ),
                });
            }
        }
        findings
    }

    /// Who a siloed function spends its time with instead: members ranked
    /// by hours in meetings whose attendees all sit inside the function.
    fn internal_collaborators(
        &self,
        function: JobFunction,
        events: &[EnrichedEvent],
    ) -> Vec<InternalCollaborator> {
        let mut hours: BTreeMap<String, f64> = BTreeMap::new();
        for event in events {
            if event.has_external() {
                continue;
            }
            let present = self.functions_present(event);
            if present.len() != 1 || !present.contains(&function) {
                continue;
            }
            for attendee in &event.attendees {
                if attendee.response == ResponseStatus::Declined {
                    continue;
                }
                if self
                    .org
                    .employee(&attendee.email)
                    .is_some_and(|e| e.function == function)
                {
                    *hours.entry(attendee.email.clone()).or_default() +=
                        event.duration_hours();
                }
            }
        }
        let mut out: Vec<InternalCollaborator> = hours
            .into_iter()
            .map(|(email, hours)| InternalCollaborator { email, hours })
            .collect();
        out.sort_by(|a, b| {
            b.hours
                .total_cmp(&a.hours)
                .then_with(|| a.email.cmp(&b.email))
        });
        out.truncate(3);
        out
    }

    fn find_spanners(&self, events: &[EnrichedEvent]) -> Vec<BoundarySpanner> {
        // Per employee: hours shared with each *other* function
        let mut by_employee: BTreeMap<String, BTreeMap<JobFunction, f64>> = BTreeMap::new();

        for event in events {
            let present = self.functions_present(event);
            if present.len() < 2 {
                continue;
            }
            for attendee in &event.attendees {
                if attendee.response == ResponseStatus::Declined {
                    continue;
                }
                let Some(employee) = self.org.employee(&attendee.email) else {
                    continue;
                };
                let entry = by_employee.entry(employee.email.clone()).or_default();
                for &function in &present {
                    if function != employee.function {
                        *entry.entry(function).or_default() += event.duration_hours();
                    }
                }
            }
        }
        if by_employee.is_empty() {
            return Vec::new();
        }

        let mut reaches: Vec<f64> = by_employee.values().map(|m| m.len() as f64).collect();
        reaches.sort_by(f64::total_cmp);
        let threshold = percentile(&reaches, self.config.cross_functional.spanner_percentile);

        let cap = self.config.cross_functional.spanner_hour_cap;
        let mut spanners: Vec<BoundarySpanner> = by_employee
            .into_iter()
            .filter(|(_, hours)| hours.len() as f64 >= threshold && hours.len() >= 2)
            .filter_map(|(email, hours_by_function)| {
                let employee = self.org.employee(&email)?;
                let score = hours_by_function.values().map(|h| h.min(cap)).sum();
                Some(BoundarySpanner {
                    email,
                    function: employee.function,
                    reach: hours_by_function.len(),
                    score,
                    hours_by_function,
                })
            })
            .collect();

        spanners.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.email.cmp(&b.email))
        });
        spanners
    }
}

fn order_pair(a: JobFunction, b: JobFunction) -> (JobFunction, JobFunction) {
    if a.as_str() <= b.as_str() { (a, b) } else { (b, a) }
}

/// Nearest-rank percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::tests::event_at;
    use crate::types::{CalendarEvent, Employee, JobLevel};

    fn org() -> Organization {
        let mk = |email: &str, function: JobFunction| Employee {
            id: email.to_string(),
            email: email.to_string(),
            name: email.to_string(),
            job_title: String::new(),
            level: JobLevel::Ic,
            function,
            department: String::new(),
            team: String::new(),
            manager_email: None,
            location: String::new(),
            is_manager: false,
        };
        Organization::build(
            "Acme",
            "acme.com",
            vec![
                mk("eng1@acme.com", JobFunction::Engineering),
                mk("eng2@acme.com", JobFunction::Engineering),
                mk("pm1@acme.com", JobFunction::Product),
                mk("des1@acme.com", JobFunction::Design),
                mk("sales1@acme.com", JobFunction::Sales),
            ],
        )
    }

    fn analyze(events: Vec<CalendarEvent>) -> CrossFunctionalInsights {
        let org = org();
        let config = AnalyticsConfig::default();
        let enriched = crate::types::enrich_events(events, &org).events;
        CrossFunctionalAnalyzer::new(&org, &config).analyze(&enriched)
    }

    #[test]
    fn test_edge_weight_normalized_by_headcount() {
        // One hour shared between Engineering (2 people) and Product (1)
        let event = event_at("e1", "eng1@acme.com", &["pm1@acme.com"], 9, 60);
        let insights = analyze(vec![event]);
        assert_eq!(insights.edges.len(), 1);
        let edge = &insights.edges[0];
        assert_eq!(edge.a, JobFunction::Engineering);
        assert_eq!(edge.b, JobFunction::Product);
        assert_eq!(edge.meetings, 1);
        assert!((edge.weight - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_function_meetings_build_no_edges() {
        let event = event_at("e1", "eng1@acme.com", &["eng2@acme.com"], 9, 60);
        let insights = analyze(vec![event]);
        assert!(insights.edges.is_empty());
        assert_eq!(insights.cross_functional_meetings, 0);
    }

    #[test]
    fn test_health_reflects_density_and_recency() {
        // 4 active functions, 6 expected pairs; only Eng-Product observed,
        // and it is the latest event so recency is full
        let event = event_at("e1", "eng1@acme.com", &["pm1@acme.com"], 9, 60);
        let insights = analyze(vec![event]);
        let health = insights.health.unwrap();
        assert!((health.density - 1.0 / 6.0).abs() < 1e-9);
        assert!((health.recency - 1.0).abs() < 1e-9);
        let expected = 100.0 * (0.6 / 6.0 + 0.4);
        assert!((health.score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_isolated_function_reported_as_silo() {
        // Sales never meets anyone else; the other three interact heavily
        let mut events = Vec::new();
        for i in 0..6 {
            let mut e = event_at(
                &format!("x{i}"),
                "eng1@acme.com",
                &["pm1@acme.com", "des1@acme.com"],
                9,
                60,
            );
            e.start += chrono::Duration::days(i);
            e.end += chrono::Duration::days(i);
            events.push(e);
        }
        let insights = analyze(events);
        assert!(
            insights
                .silos
                .iter()
                .any(|s| s.function == JobFunction::Sales && s.cross_weight == 0.0)
        );
    }

    #[test]
    fn test_silo_lists_its_internal_collaborators() {
        // Engineering only meets itself; the other three interact
        let mut events = vec![event_at(
            "eng-standup",
            "eng1@acme.com",
            &["eng2@acme.com"],
            9,
            120,
        )];
        for i in 0..6 {
            let mut e = event_at(
                &format!("x{i}"),
                "pm1@acme.com",
                &["des1@acme.com", "sales1@acme.com"],
                10,
                60,
            );
            e.start += chrono::Duration::days(i);
            e.end += chrono::Duration::days(i);
            events.push(e);
        }
        let insights = analyze(events);
        let silo = insights
            .silos
            .iter()
            .find(|s| s.function == JobFunction::Engineering)
            .unwrap();
        assert_eq!(silo.cross_weight, 0.0);
        let top: Vec<&str> = silo
            .top_internal_collaborators
            .iter()
            .map(|c| c.email.as_str())
            .collect();
        assert_eq!(top, ["eng1@acme.com", "eng2@acme.com"]);
        assert!((silo.top_internal_collaborators[0].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_spanner_outranks_single_pair_colleague() {
        // eng1 meets Product, Design, and Sales; eng2 only Product
        let events = vec![
            event_at("s1", "eng1@acme.com", &["pm1@acme.com"], 9, 60),
            event_at("s2", "eng1@acme.com", &["des1@acme.com"], 10, 60),
            event_at("s3", "eng1@acme.com", &["sales1@acme.com"], 11, 60),
            event_at("s4", "eng2@acme.com", &["pm1@acme.com"], 12, 60),
        ];
        let insights = analyze(events);
        assert!(!insights.spanners.is_empty());
        assert_eq!(insights.spanners[0].email, "eng1@acme.com");
        assert_eq!(insights.spanners[0].reach, 3);
        assert!((insights.spanners[0].score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_spanner_score_caps_heavy_pairings() {
        // 30 hours with Product alone must not outrank broad reach
        let org = org();
        let mut config = AnalyticsConfig::default();
        config.cross_functional.spanner_percentile = 0.0;
        let mut events = Vec::new();
        for i in 0..30 {
            let mut e = event_at(&format!("h{i}"), "eng2@acme.com", &["pm1@acme.com"], 9, 60);
            e.start += chrono::Duration::days(i);
            e.end += chrono::Duration::days(i);
            events.push(e);
        }
        events.push(event_at("b1", "eng1@acme.com", &["pm1@acme.com"], 10, 60));
        events.push(event_at("b2", "eng1@acme.com", &["des1@acme.com"], 11, 60));
        let enriched = crate::types::enrich_events(events, &org).events;
        let insights = CrossFunctionalAnalyzer::new(&org, &config).analyze(&enriched);

        let eng2 = insights
            .spanners
            .iter()
            .find(|s| s.email == "eng2@acme.com");
        // eng2 only reaches one function and is not a spanner at all
        assert!(eng2.is_none());
        let eng1 = insights
            .spanners
            .iter()
            .find(|s| s.email == "eng1@acme.com")
            .unwrap();
        assert!((eng1.score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let events = vec![
            event_at("s1", "eng1@acme.com", &["pm1@acme.com", "des1@acme.com"], 9, 45),
            event_at("s2", "des1@acme.com", &["sales1@acme.com"], 11, 30),
            event_at("s3", "eng2@acme.com", &["pm1@acme.com"], 13, 60),
        ];
        let first = serde_json::to_string(&analyze(events.clone())).unwrap();
        let second = serde_json::to_string(&analyze(events)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_is_empty() {
        let insights = analyze(vec![]);
        assert!(insights.edges.is_empty());
        assert!(insights.health.is_none());
        assert!(insights.silos.is_empty());
        assert!(insights.spanners.is_empty());
    }
}
