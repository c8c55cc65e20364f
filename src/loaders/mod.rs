//! Input Loaders
//!
//! File-level ingestion: HRIS directory exports and calendar exports.
//! Semantic enrichment (attendee resolution, skip policy) lives in
//! `types::event`; these modules only get records off disk.

pub mod calendar;
pub mod hris;

pub use calendar::{CalendarLoad, load_events};
pub use hris::load_organization;
