pub mod employee;
pub mod error;
pub mod event;

pub use employee::{Employee, JobFunction, JobLevel, Organization};
pub use error::{OrgLensError, Result};
pub use event::{
    Attendee, AttendeeRole, CalendarEvent, EnrichedEvent, EnrichmentOutcome, RecurrencePattern,
    ResolvedAttendee, ResponseStatus, SkipReason, SkippedEvent, enrich_events,
};
