//! Calendar Event Domain Model
//!
//! Raw normalized events as produced by the external loaders, plus the
//! enriched form the analytics engine actually consumes. Enrichment
//! resolves attendees against the organization, deduplicates emails
//! case-insensitively, and computes the whole-minute duration. The engine
//! never re-derives these fields; an event that cannot be enriched is
//! skipped with a reason and tallied, never a fatal error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::employee::Organization;

// =============================================================================
// Raw Event
// =============================================================================

/// Attendee response status from the calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    #[default]
    #[serde(rename = "none")]
    NoResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeRole {
    #[default]
    Required,
    Optional,
}

/// Recurrence pattern type. Absent on an event = ad-hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub response: ResponseStatus,
    #[serde(default)]
    pub role: AttendeeRole,
}

/// A normalized calendar event. Timestamps are timezone-aware and already
/// normalized to UTC by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub cancelled: bool,
    pub organizer_email: String,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub recurrence: Option<RecurrencePattern>,
    /// Identifier shared by all instances of a recurring series.
    #[serde(default)]
    pub series_id: Option<String>,
}

impl CalendarEvent {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

// =============================================================================
// Enrichment
// =============================================================================

/// Why an event was excluded from analysis. Surfaced in the result as a
/// skipped tally; exclusion is never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Record did not deserialize (missing start/end or similar).
    Malformed,
    /// `end` earlier than `start`.
    EndBeforeStart,
    /// No attendees beyond the organizer.
    NoAttendees,
    /// Organizer email missing or empty.
    MissingOrganizer,
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::Malformed => "malformed record",
            SkipReason::EndBeforeStart => "end before start",
            SkipReason::NoAttendees => "no attendees",
            SkipReason::MissingOrganizer => "missing organizer",
            SkipReason::Cancelled => "cancelled",
        };
        write!(f, "{}", text)
    }
}

/// An excluded event, kept for the skipped tally in the report.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEvent {
    pub id: String,
    pub subject: String,
    pub reason: SkipReason,
}

/// An attendee resolved against the organization. Internal means the email
/// domain matches the organization; the resolved `Employee` is looked up
/// through the shared `Organization` by email when an analyzer needs it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAttendee {
    /// Lowercased email, unique within the event.
    pub email: String,
    pub name: String,
    pub response: ResponseStatus,
    pub role: AttendeeRole,
    pub internal: bool,
    pub is_organizer: bool,
}

/// Engine input: a raw event plus the enrichment fields every analyzer
/// reads. Attendees are deduplicated case-insensitively and include the
/// organizer.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEvent {
    pub event: CalendarEvent,
    /// end − start, rounded to whole minutes.
    pub duration_minutes: i64,
    pub attendees: Vec<ResolvedAttendee>,
    pub organizer_internal: bool,
}

impl EnrichedEvent {
    /// Enrich a raw event, or say why it must be skipped.
    pub fn try_enrich(
        event: CalendarEvent,
        org: &Organization,
    ) -> std::result::Result<Self, SkipReason> {
        if event.cancelled {
            return Err(SkipReason::Cancelled);
        }
        if event.organizer_email.trim().is_empty() {
            return Err(SkipReason::MissingOrganizer);
        }
        if event.end < event.start {
            return Err(SkipReason::EndBeforeStart);
        }
        if event.attendees.is_empty() {
            return Err(SkipReason::NoAttendees);
        }

        let duration_minutes =
            ((event.end - event.start).num_seconds() as f64 / 60.0).round() as i64;

        let organizer_key = event.organizer_email.to_lowercase();
        let mut seen: HashSet<String> = HashSet::new();
        let mut attendees: Vec<ResolvedAttendee> = Vec::new();

        // Organizer is always the first resolved attendee
        attendees.push(ResolvedAttendee {
            email: organizer_key.clone(),
            name: org
                .employee(&organizer_key)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            response: ResponseStatus::Accepted,
            role: AttendeeRole::Required,
            internal: org.is_internal(&organizer_key),
            is_organizer: true,
        });
        seen.insert(organizer_key.clone());

        for attendee in &event.attendees {
            let key = attendee.email.to_lowercase();
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            attendees.push(ResolvedAttendee {
                internal: org.is_internal(&key),
                email: key,
                name: attendee.name.clone(),
                response: attendee.response,
                role: attendee.role,
                is_organizer: false,
            });
        }

        let organizer_internal = org.is_internal(&organizer_key);

        Ok(Self {
            event,
            duration_minutes,
            attendees,
            organizer_internal,
        })
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }

    /// Unique resolved attendee count, organizer included.
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    pub fn internal_count(&self) -> usize {
        self.attendees.iter().filter(|a| a.internal).count()
    }

    pub fn has_external(&self) -> bool {
        self.attendees.iter().any(|a| !a.internal)
    }

    /// Person-hours this event consumes: duration × attendee count.
    pub fn person_hours(&self) -> f64 {
        self.duration_hours() * self.attendee_count() as f64
    }

    pub fn is_attendee(&self, email: &str) -> bool {
        let key = email.to_lowercase();
        self.attendees.iter().any(|a| a.email == key)
    }

    pub fn attendee(&self, email: &str) -> Option<&ResolvedAttendee> {
        let key = email.to_lowercase();
        self.attendees.iter().find(|a| a.email == key)
    }

    pub fn is_organized_by(&self, email: &str) -> bool {
        self.event.organizer_email.eq_ignore_ascii_case(email)
    }

    /// A 1:1 has exactly two unique resolved internal attendees, is not
    /// all-day, and was not declined by everyone invited.
    pub fn is_one_on_one(&self) -> bool {
        self.internal_count() == 2
            && self.attendee_count() == 2
            && !self.event.all_day
            && !self.is_declined_only()
    }

    /// Every non-organizer attendee declined.
    pub fn is_declined_only(&self) -> bool {
        let invited: Vec<&ResolvedAttendee> =
            self.attendees.iter().filter(|a| !a.is_organizer).collect();
        !invited.is_empty()
            && invited
                .iter()
                .all(|a| a.response == ResponseStatus::Declined)
    }

    /// Events spanning midnight are attributed to their start date.
    pub fn start_date(&self) -> NaiveDate {
        self.event.start.date_naive()
    }
}

/// Result of running enrichment over a loaded event set.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    pub events: Vec<EnrichedEvent>,
    pub skipped: Vec<SkippedEvent>,
}

/// Enrich all events, collecting skipped ones instead of failing.
pub fn enrich_events(events: Vec<CalendarEvent>, org: &Organization) -> EnrichmentOutcome {
    let mut outcome = EnrichmentOutcome::default();
    for event in events {
        let id = event.id.clone();
        let subject = event.subject.clone();
        match EnrichedEvent::try_enrich(event, org) {
            Ok(enriched) => outcome.events.push(enriched),
            Err(reason) => {
                tracing::debug!(event = %id, %reason, "skipping event");
                outcome.skipped.push(SkippedEvent {
                    id,
                    subject,
                    reason,
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::employee::{Employee, JobFunction, JobLevel};
    use chrono::TimeZone;

    pub(crate) fn test_org() -> Organization {
        let mk = |email: &str| Employee {
            id: email.to_string(),
            email: email.to_string(),
            name: email.to_string(),
            job_title: String::new(),
            level: JobLevel::Ic,
            function: JobFunction::Engineering,
            department: String::new(),
            team: String::new(),
            manager_email: None,
            location: String::new(),
            is_manager: false,
        };
        Organization::build(
            "Acme",
            "acme.com",
            vec![mk("a@acme.com"), mk("b@acme.com"), mk("c@acme.com")],
        )
    }

    pub(crate) fn event_at(
        id: &str,
        organizer: &str,
        attendees: &[&str],
        start_hour: u32,
        minutes: i64,
    ) -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, start_hour, 0, 0).unwrap();
        CalendarEvent {
            id: id.to_string(),
            subject: "Planning".to_string(),
            body: None,
            start,
            end: start + chrono::Duration::minutes(minutes),
            all_day: false,
            cancelled: false,
            organizer_email: organizer.to_string(),
            attendees: attendees
                .iter()
                .map(|e| Attendee {
                    email: e.to_string(),
                    name: String::new(),
                    response: ResponseStatus::Accepted,
                    role: AttendeeRole::Required,
                })
                .collect(),
            recurrence: None,
            series_id: None,
        }
    }

    #[test]
    fn test_enrich_dedups_case_insensitively() {
        let org = test_org();
        let event = event_at(
            "e1",
            "a@acme.com",
            &["B@ACME.COM", "b@acme.com", "a@acme.com"],
            9,
            30,
        );
        let enriched = EnrichedEvent::try_enrich(event, &org).unwrap();
        assert_eq!(enriched.attendee_count(), 2);
        assert_eq!(enriched.duration_minutes, 30);
        assert!(enriched.is_one_on_one());
    }

    #[test]
    fn test_enrich_marks_external() {
        let org = test_org();
        let event = event_at("e1", "a@acme.com", &["x@vendor.io"], 9, 60);
        let enriched = EnrichedEvent::try_enrich(event, &org).unwrap();
        assert!(enriched.has_external());
        assert_eq!(enriched.internal_count(), 1);
        // Two attendees but only one internal: not a 1:1
        assert!(!enriched.is_one_on_one());
    }

    #[test]
    fn test_end_before_start_is_skipped() {
        let org = test_org();
        let mut event = event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30);
        event.end = event.start - chrono::Duration::minutes(5);
        assert_eq!(
            EnrichedEvent::try_enrich(event, &org).unwrap_err(),
            SkipReason::EndBeforeStart
        );
    }

    #[test]
    fn test_zero_attendees_is_skipped() {
        let org = test_org();
        let event = event_at("e1", "a@acme.com", &[], 9, 30);
        assert_eq!(
            EnrichedEvent::try_enrich(event, &org).unwrap_err(),
            SkipReason::NoAttendees
        );
    }

    #[test]
    fn test_declined_only_is_not_one_on_one() {
        let org = test_org();
        let mut event = event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30);
        event.attendees[0].response = ResponseStatus::Declined;
        let enriched = EnrichedEvent::try_enrich(event, &org).unwrap();
        assert!(enriched.is_declined_only());
        assert!(!enriched.is_one_on_one());
    }

    #[test]
    fn test_all_day_is_not_one_on_one() {
        let org = test_org();
        let mut event = event_at("e1", "a@acme.com", &["b@acme.com"], 0, 1440);
        event.all_day = true;
        let enriched = EnrichedEvent::try_enrich(event, &org).unwrap();
        assert!(!enriched.is_one_on_one());
    }

    #[test]
    fn test_enrich_events_tallies_skipped() {
        let org = test_org();
        let good = event_at("ok", "a@acme.com", &["b@acme.com"], 9, 30);
        let mut cancelled = event_at("gone", "a@acme.com", &["b@acme.com"], 10, 30);
        cancelled.cancelled = true;
        let outcome = enrich_events(vec![good, cancelled], &org);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::Cancelled);
    }

    #[test]
    fn test_person_hours() {
        let org = test_org();
        let event = event_at("e1", "a@acme.com", &["b@acme.com", "c@acme.com"], 9, 60);
        let enriched = EnrichedEvent::try_enrich(event, &org).unwrap();
        assert!((enriched.person_hours() - 3.0).abs() < f64::EPSILON);
    }
}
