//! Meeting Pattern Analyzer
//!
//! Aggregate meeting statistics over the enriched event set: the
//! size-duration matrix, meeting type mix, recurrence breakdown, response
//! behavior, cost estimates, audience mix, timing distribution, and
//! per-employee calendar fragmentation.
//!
//! All aggregation happens in a single pass over immutable inputs, with
//! `BTreeMap` keys wherever iteration order reaches the output, so the
//! same inputs always produce the identical report.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::config::AnalyticsConfig;
use crate::types::{
    EnrichedEvent, JobFunction, JobLevel, Organization, ResponseStatus,
};

// =============================================================================
// Buckets
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    Short,
    Medium,
    Long,
}

impl SizeBucket {
    /// Bucket an attendee count. Boundaries are inclusive, so a count on
    /// the boundary lands in the smaller bucket.
    pub fn classify(attendees: usize, config: &AnalyticsConfig) -> Self {
        if attendees <= config.buckets.size_small_max {
            SizeBucket::Small
        } else if attendees <= config.buckets.size_medium_max {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        }
    }

    fn index(self) -> usize {
        match self {
            SizeBucket::Small => 0,
            SizeBucket::Medium => 1,
            SizeBucket::Large => 2,
        }
    }
}

impl DurationBucket {
    pub fn classify(minutes: i64, config: &AnalyticsConfig) -> Self {
        if minutes <= config.buckets.duration_short_max {
            DurationBucket::Short
        } else if minutes <= config.buckets.duration_medium_max {
            DurationBucket::Medium
        } else {
            DurationBucket::Long
        }
    }

    fn index(self) -> usize {
        match self {
            DurationBucket::Short => 0,
            DurationBucket::Medium => 1,
            DurationBucket::Long => 2,
        }
    }
}

/// One cell of the size-duration matrix.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MatrixCell {
    pub count: usize,
    pub person_hours: f64,
}

/// 3×3 size-by-duration matrix. Rows are size buckets (small, medium,
/// large), columns duration buckets (short, medium, long).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeDurationMatrix {
    pub cells: [[MatrixCell; 3]; 3],
}

impl SizeDurationMatrix {
    fn record(&mut self, size: SizeBucket, duration: DurationBucket, person_hours: f64) {
        let cell = &mut self.cells[size.index()][duration.index()];
        cell.count += 1;
        cell.person_hours += person_hours;
    }

    pub fn cell(&self, size: SizeBucket, duration: DurationBucket) -> MatrixCell {
        self.cells[size.index()][duration.index()]
    }

    pub fn total_count(&self) -> usize {
        self.cells.iter().flatten().map(|c| c.count).sum()
    }

    pub fn total_person_hours(&self) -> f64 {
        self.cells.iter().flatten().map(|c| c.person_hours).sum()
    }
}

// =============================================================================
// Meeting Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    OneOnOne,
    SmallTeam,
    LargeTeam,
    AllHands,
}

impl MeetingType {
    pub fn classify(event: &EnrichedEvent, config: &AnalyticsConfig) -> Self {
        if event.is_one_on_one() {
            return MeetingType::OneOnOne;
        }
        let subject = event.event.subject.to_lowercase();
        let named_all_hands = config
            .meeting
            .all_hands_patterns
            .iter()
            .any(|p| subject.contains(p.as_str()));
        let count = event.attendee_count();
        if named_all_hands || count > config.meeting.large_team_max {
            MeetingType::AllHands
        } else if count <= config.meeting.small_team_max {
            MeetingType::SmallTeam
        } else {
            MeetingType::LargeTeam
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeMix {
    pub one_on_one: usize,
    pub small_team: usize,
    pub large_team: usize,
    pub all_hands: usize,
}

impl TypeMix {
    fn record(&mut self, meeting_type: MeetingType) {
        match meeting_type {
            MeetingType::OneOnOne => self.one_on_one += 1,
            MeetingType::SmallTeam => self.small_team += 1,
            MeetingType::LargeTeam => self.large_team += 1,
            MeetingType::AllHands => self.all_hands += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.one_on_one + self.small_team + self.large_team + self.all_hands
    }
}

// =============================================================================
// Result Types
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecurrenceBreakdown {
    pub recurring: usize,
    pub ad_hoc: usize,
    pub recurring_share: f64,
    pub recurring_person_hours: f64,
    pub ad_hoc_person_hours: f64,
    /// Recurring vs ad-hoc counts keyed by the organizer's job level;
    /// external or unresolved organizers land under `Unknown`.
    pub by_organizer_level: BTreeMap<JobLevel, LevelRecurrence>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LevelRecurrence {
    pub recurring: usize,
    pub ad_hoc: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseStats {
    /// Required, non-organizer, internal invitations across all events.
    pub required_invitations: usize,
    pub accepted: usize,
    pub declined: usize,
    pub tentative: usize,
    pub no_response: usize,
    /// Any response at all (accepted, declined, or tentative) over invitations.
    pub response_rate: f64,
    pub acceptance_rate: f64,
    pub by_employee: BTreeMap<String, EmployeeResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeResponse {
    pub invited: usize,
    pub accepted: usize,
    pub responded: usize,
    pub response_rate: f64,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CostEstimate {
    /// Σ over events of duration × per-attendee hourly rate.
    pub total_cost: f64,
    pub avg_cost_per_meeting: f64,
    /// Top meetings by estimated cost, descending, subject tie-break.
    pub most_expensive: Vec<ExpensiveMeeting>,
    /// Each resolved attendee's cost share, keyed by their function.
    /// External attendees have no function and are excluded here.
    pub by_function: BTreeMap<JobFunction, f64>,
    /// Each resolved attendee's cost share, keyed by their team.
    pub by_team: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpensiveMeeting {
    pub subject: String,
    pub cost: f64,
    pub attendees: usize,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudienceMix {
    pub internal_only: usize,
    pub with_external: usize,
    pub external_share: f64,
    /// External-meeting share for each customer-facing function.
    pub customer_facing: Vec<CustomerFacingShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerFacingShare {
    pub function: JobFunction,
    pub meetings: usize,
    pub external_share: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingAnalysis {
    /// Monday..Sunday.
    pub by_weekday: [usize; 7],
    pub by_start_hour: [usize; 24],
    /// Starts before the working day.
    pub early_morning: usize,
    /// Ends after the working day.
    pub after_hours: usize,
    /// Overlaps the 12:00-13:00 hour.
    pub lunchtime: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FragmentationInsights {
    /// Mean daily fragmentation per internal employee, averaged over the
    /// days on which they have meetings.
    pub by_employee: BTreeMap<String, f64>,
    pub avg_score: f64,
    pub back_to_back_count: usize,
    /// Runs of three or more consecutive back-to-back meetings.
    pub chain_count: usize,
    pub longest_chain: usize,
}

/// Full output of the meeting pattern analyzer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetingInsights {
    pub total_meetings: usize,
    pub total_person_hours: f64,
    pub avg_duration_minutes: f64,
    /// Mean across internal employees of (attended hours / days with meetings).
    pub avg_daily_meeting_hours: f64,
    /// Share of meetings at exactly the canonical default duration.
    pub default_duration_share: f64,
    pub matrix: SizeDurationMatrix,
    pub type_mix: TypeMix,
    pub recurrence: RecurrenceBreakdown,
    pub responses: ResponseStats,
    pub cost: CostEstimate,
    pub audience: AudienceMix,
    pub timing: TimingAnalysis,
    pub fragmentation: FragmentationInsights,
}

impl MeetingInsights {
    pub fn one_on_one_share(&self) -> f64 {
        if self.total_meetings == 0 {
            0.0
        } else {
            self.type_mix.one_on_one as f64 / self.total_meetings as f64
        }
    }
}

// =============================================================================
// Analyzer
// =============================================================================

pub struct MeetingAnalyzer<'a> {
    org: &'a Organization,
    config: &'a AnalyticsConfig,
}

impl<'a> MeetingAnalyzer<'a> {
    pub fn new(org: &'a Organization, config: &'a AnalyticsConfig) -> Self {
        Self { org, config }
    }

    pub fn analyze(&self, events: &[EnrichedEvent]) -> MeetingInsights {
        let mut insights = MeetingInsights {
            total_meetings: events.len(),
            ..Default::default()
        };
        if events.is_empty() {
            return insights;
        }

        let mut total_minutes: i64 = 0;
        let mut default_duration_count = 0usize;

        for event in events {
            total_minutes += event.duration_minutes;
            let person_hours = event.person_hours();
            insights.total_person_hours += person_hours;

            let size = SizeBucket::classify(event.attendee_count(), self.config);
            let duration = DurationBucket::classify(event.duration_minutes, self.config);
            insights.matrix.record(size, duration, person_hours);

            insights
                .type_mix
                .record(MeetingType::classify(event, self.config));

            if event.duration_minutes == self.config.meeting.default_duration_minutes {
                default_duration_count += 1;
            }

            self.record_recurrence(event, &mut insights.recurrence);
            self.record_responses(event, &mut insights.responses);
            self.record_timing(event, &mut insights.timing);

            if event.has_external() {
                insights.audience.with_external += 1;
            } else {
                insights.audience.internal_only += 1;
            }
        }

        let total = events.len() as f64;
        insights.avg_duration_minutes = total_minutes as f64 / total;
        insights.default_duration_share = default_duration_count as f64 / total;
        insights.audience.external_share = insights.audience.with_external as f64 / total;
        insights.recurrence.recurring_share = insights.recurrence.recurring as f64 / total;

        finalize_responses(&mut insights.responses);
        insights.audience.customer_facing = self.customer_facing_shares(events);
        insights.cost = self.estimate_cost(events);
        insights.fragmentation = self.analyze_fragmentation(events);
        insights.avg_daily_meeting_hours = self.avg_daily_hours(events);

        insights
    }

    fn record_recurrence(&self, event: &EnrichedEvent, out: &mut RecurrenceBreakdown) {
        let level = self
            .org
            .employee(&event.event.organizer_email)
            .map(|e| e.level)
            .unwrap_or(JobLevel::Unknown);
        let entry = out.by_organizer_level.entry(level).or_default();
        if event.event.is_recurring() {
            out.recurring += 1;
            out.recurring_person_hours += event.person_hours();
            entry.recurring += 1;
        } else {
            out.ad_hoc += 1;
            out.ad_hoc_person_hours += event.person_hours();
            entry.ad_hoc += 1;
        }
    }

    fn record_responses(&self, event: &EnrichedEvent, out: &mut ResponseStats) {
        for attendee in &event.attendees {
            if attendee.is_organizer
                || !attendee.internal
                || attendee.role != crate::types::AttendeeRole::Required
            {
                continue;
            }
            out.required_invitations += 1;
            let per = out.by_employee.entry(attendee.email.clone()).or_default();
            per.invited += 1;
            match attendee.response {
                ResponseStatus::Accepted => {
                    out.accepted += 1;
                    per.accepted += 1;
                    per.responded += 1;
                }
                ResponseStatus::Declined => {
                    out.declined += 1;
                    per.responded += 1;
                }
                ResponseStatus::Tentative => {
                    out.tentative += 1;
                    per.responded += 1;
                }
                ResponseStatus::NoResponse => out.no_response += 1,
            }
        }
    }

    fn record_timing(&self, event: &EnrichedEvent, out: &mut TimingAnalysis) {
        if event.event.all_day {
            return;
        }
        let start = &event.event.start;
        let end = &event.event.end;
        out.by_weekday[start.weekday().num_days_from_monday() as usize] += 1;
        out.by_start_hour[start.hour() as usize] += 1;

        let work = &self.config.fragmentation;
        if start.hour() < work.work_start_hour {
            out.early_morning += 1;
        }
        if end.hour() > work.work_end_hour
            || (end.hour() == work.work_end_hour && end.minute() > 0)
            || end.date_naive() > start.date_naive()
        {
            out.after_hours += 1;
        }
        // Overlaps 12:00-13:00 on the start date
        let noon = start.date_naive().and_hms_opt(12, 0, 0);
        let one_pm = start.date_naive().and_hms_opt(13, 0, 0);
        if let (Some(noon), Some(one_pm)) = (noon, one_pm) {
            let noon = noon.and_utc();
            let one_pm = one_pm.and_utc();
            if start < &one_pm && end > &noon {
                out.lunchtime += 1;
            }
        }
    }

    fn customer_facing_shares(&self, events: &[EnrichedEvent]) -> Vec<CustomerFacingShare> {
        let mut shares = Vec::new();
        for &function in &self.config.meeting.customer_facing_functions {
            let mut meetings = 0usize;
            let mut external = 0usize;
            for event in events {
                let involves = event.attendees.iter().any(|a| {
                    self.org
                        .employee(&a.email)
                        .is_some_and(|e| e.function == function)
                });
                if involves {
                    meetings += 1;
                    if event.has_external() {
                        external += 1;
                    }
                }
            }
            let external_share = if meetings == 0 {
                0.0
            } else {
                external as f64 / meetings as f64
            };
            shares.push(CustomerFacingShare {
                function,
                meetings,
                external_share,
            });
        }
        shares
    }

    fn estimate_cost(&self, events: &[EnrichedEvent]) -> CostEstimate {
        let mut by_function: BTreeMap<JobFunction, f64> = BTreeMap::new();
        let mut by_team: BTreeMap<String, f64> = BTreeMap::new();
        let mut costed: Vec<ExpensiveMeeting> = events
            .iter()
            .map(|event| {
                let cost: f64 = event
                    .attendees
                    .iter()
                    .map(|a| {
                        let employee = self.org.employee(&a.email);
                        let share = self.config.rates.rate_for(employee.map(|e| e.level))
                            * event.duration_hours();
                        if let Some(e) = employee {
                            *by_function.entry(e.function).or_default() += share;
                            if !e.team.is_empty() {
                                *by_team.entry(e.team.clone()).or_default() += share;
                            }
                        }
                        share
                    })
                    .sum();
                ExpensiveMeeting {
                    subject: event.event.subject.clone(),
                    cost,
                    attendees: event.attendee_count(),
                    duration_minutes: event.duration_minutes,
                }
            })
            .collect();

        let total_cost: f64 = costed.iter().map(|m| m.cost).sum();
        let avg_cost_per_meeting = if costed.is_empty() {
            0.0
        } else {
            total_cost / costed.len() as f64
        };

        costed.sort_by(|a, b| {
            b.cost
                .total_cmp(&a.cost)
                .then_with(|| a.subject.cmp(&b.subject))
        });
        costed.truncate(5);

        CostEstimate {
            total_cost,
            avg_cost_per_meeting,
            most_expensive: costed,
            by_function,
            by_team,
        }
    }

    /// Busy intervals per (employee, day) for every internal employee who
    /// attends, declined invitations and all-day events excluded.
    fn daily_intervals(
        &self,
        events: &[EnrichedEvent],
    ) -> HashMap<(String, NaiveDate), Vec<(i64, i64)>> {
        let mut by_day: HashMap<(String, NaiveDate), Vec<(i64, i64)>> = HashMap::new();
        for event in events {
            if event.event.all_day {
                continue;
            }
            let start = event.event.start.timestamp() / 60;
            let end = event.event.end.timestamp() / 60;
            for attendee in &event.attendees {
                if !attendee.internal
                    || attendee.response == ResponseStatus::Declined
                    || self.org.employee(&attendee.email).is_none()
                {
                    continue;
                }
                by_day
                    .entry((attendee.email.clone(), event.start_date()))
                    .or_default()
                    .push((start, end));
            }
        }
        by_day
    }

    fn analyze_fragmentation(&self, events: &[EnrichedEvent]) -> FragmentationInsights {
        let work = &self.config.fragmentation;
        let work_span = work.work_span_minutes() as f64;

        let mut out = FragmentationInsights::default();
        let mut per_employee: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        for ((email, _day), mut intervals) in self.daily_intervals(events) {
            intervals.sort_unstable();

            // Back-to-back detection runs over the raw sorted intervals.
            // A negative gap is a double-booking and still counts.
            let mut chain = 1usize;
            for pair in intervals.windows(2) {
                let gap = pair[1].0 - pair[0].1;
                if gap <= work.back_to_back_buffer_minutes {
                    out.back_to_back_count += 1;
                    chain += 1;
                } else {
                    if chain >= 3 {
                        out.chain_count += 1;
                    }
                    out.longest_chain = out.longest_chain.max(chain);
                    chain = 1;
                }
            }
            if chain >= 3 {
                out.chain_count += 1;
            }
            out.longest_chain = out.longest_chain.max(chain);

            // Fragmentation runs over merged intervals, so overlapping
            // bookings do not create phantom gaps
            let merged = merge_intervals(&intervals);
            let mut wasted: i64 = 0;
            for pair in merged.windows(2) {
                let gap = pair[1].0 - pair[0].1;
                if gap > 0 && gap < work.focus_block_minutes {
                    wasted += gap;
                }
            }
            let score = (wasted as f64 / work_span).clamp(0.0, 1.0);
            per_employee.entry(email).or_default().push(score);
        }

        for (email, scores) in per_employee {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            out.by_employee.insert(email, mean);
        }
        if !out.by_employee.is_empty() {
            out.avg_score =
                out.by_employee.values().sum::<f64>() / out.by_employee.len() as f64;
        }
        out
    }

    fn avg_daily_hours(&self, events: &[EnrichedEvent]) -> f64 {
        let mut hours: HashMap<String, f64> = HashMap::new();
        let mut days: HashMap<String, std::collections::HashSet<NaiveDate>> = HashMap::new();
        for event in events {
            if event.event.all_day {
                continue;
            }
            for attendee in &event.attendees {
                if !attendee.internal
                    || attendee.response == ResponseStatus::Declined
                    || self.org.employee(&attendee.email).is_none()
                {
                    continue;
                }
                *hours.entry(attendee.email.clone()).or_default() += event.duration_hours();
                days.entry(attendee.email.clone())
                    .or_default()
                    .insert(event.start_date());
            }
        }
        if hours.is_empty() {
            return 0.0;
        }
        let per_person: Vec<f64> = hours
            .iter()
            .map(|(email, total)| total / days[email].len() as f64)
            .collect();
        per_person.iter().sum::<f64>() / per_person.len() as f64
    }
}

fn finalize_responses(out: &mut ResponseStats) {
    if out.required_invitations > 0 {
        let total = out.required_invitations as f64;
        out.response_rate = (out.accepted + out.declined + out.tentative) as f64 / total;
        out.acceptance_rate = out.accepted as f64 / total;
    }
    for per in out.by_employee.values_mut() {
        if per.invited > 0 {
            per.response_rate = per.responded as f64 / per.invited as f64;
            per.acceptance_rate = per.accepted as f64 / per.invited as f64;
        }
    }
}

fn merge_intervals(sorted: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(sorted.len());
    for &(start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
