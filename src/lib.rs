//! # OrgLens
//!
//! Organizational meeting analytics from calendar and HRIS data.
//!
//! OrgLens ingests an employee directory and a calendar export, resolves
//! attendees against the reporting structure, and runs four analyzers in
//! parallel over the enriched events:
//!
//! - **Meeting patterns**: size-duration matrix, type mix, recurrence,
//!   responses, cost, timing, and calendar fragmentation
//! - **Manager analytics**: 1:1 cadence per pair, skip-level exposure,
//!   the monitoring indicator, and at-risk relationships
//! - **Cross-functional**: the function interaction graph, health score,
//!   silos, and boundary spanners
//! - **Text**: keywords, topics, naming hygiene, and sentiment
//!
//! The merged report is deterministic: recency is measured against the
//! latest event in the data, aggregation is ordered, and ties break
//! lexicographically.
//!
//! ```no_run
//! use orglens::analytics::InsightsEngine;
//! use orglens::config::AnalyticsConfig;
//! use orglens::loaders;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> orglens::Result<()> {
//! let org = loaders::load_organization(Path::new("hris.json"))?;
//! let load = loaders::load_events(Path::new("events.json"))?;
//! let engine = InsightsEngine::new(Arc::new(org), AnalyticsConfig::default())?;
//! let report = engine.analyze(load.events).await?;
//! println!("{} meetings analyzed", report.meeting.total_meetings);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod cli;
pub mod config;
pub mod loaders;
pub mod report;
pub mod sample;
pub mod types;

pub use analytics::{IndividualReport, InsightsEngine, InsightsReport};
pub use config::AnalyticsConfig;
pub use types::error::{OrgLensError, Result};
pub use types::{CalendarEvent, Employee, Organization};
