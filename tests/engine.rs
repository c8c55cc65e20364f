//! End-to-end pipeline tests: generated sample data through the loaders
//! and the full engine, checking the structural properties the report
//! guarantees rather than exact numbers.

use std::sync::Arc;

use orglens::analytics::InsightsEngine;
use orglens::config::AnalyticsConfig;
use orglens::sample::{self, SampleSpec};
use orglens::types::Organization;
use orglens::{loaders, report};

fn sample_engine(seed: u64) -> (InsightsEngine, Vec<orglens::CalendarEvent>) {
    let data = sample::generate(SampleSpec {
        employees: 30,
        weeks: 6,
        seed,
    });
    let org = Organization::build(
        &data.hris.company_name,
        &data.hris.domain,
        data.hris.employees,
    );
    let engine = InsightsEngine::new(Arc::new(org), AnalyticsConfig::default()).unwrap();
    (engine, data.events)
}

#[tokio::test]
async fn full_analysis_over_sample_data() {
    let (engine, events) = sample_engine(42);
    let total = events.len();
    let report = engine.analyze(events).await.unwrap();

    // Every loaded event is either analyzed or tallied as skipped
    let skipped: usize = report.summary.skipped_events.values().sum();
    assert_eq!(report.summary.analyzed_events + skipped, total);
    assert_eq!(report.meeting.total_meetings, report.summary.analyzed_events);

    // The matrix partitions the analyzed events exactly
    assert_eq!(report.meeting.matrix.total_count(), report.meeting.total_meetings);
    assert!(
        (report.meeting.matrix.total_person_hours() - report.meeting.total_person_hours).abs()
            < 1e-6
    );

    // The type mix does too
    assert_eq!(report.meeting.type_mix.total(), report.meeting.total_meetings);

    // Sample data always contains 1:1s, an all-hands, and external calls
    assert!(report.meeting.type_mix.one_on_one > 0);
    assert!(report.meeting.type_mix.all_hands > 0);
    assert!(report.meeting.audience.with_external > 0);

    // Every manager deliberately neglects one report, so at-risk pairs exist
    assert!(!report.manager.at_risk.is_empty());

    // Cross-functional planning meetings build edges and a health score
    assert!(!report.cross_functional.edges.is_empty());
    let health = report.cross_functional.health.as_ref().unwrap();
    assert!((0.0..=100.0).contains(&health.score));

    // Monitoring indicators stay in range with their breakdown attached
    for manager in &report.manager.managers {
        for pair in &manager.pairs {
            let m = &pair.monitoring;
            assert!((0.0..=10.0).contains(&m.score));
            for signal in [m.cadence_signal, m.attendance_signal, m.initiation_signal] {
                assert!((0.0..=1.0).contains(&signal));
            }
        }
    }

    // The planted "Sync" meetings show up in naming hygiene
    assert!(report.text.naming.vague_count > 0);
}

#[tokio::test]
async fn report_is_identical_across_runs() {
    let (engine_a, events_a) = sample_engine(7);
    let (engine_b, events_b) = sample_engine(7);
    let first = engine_a.analyze(events_a).await.unwrap();
    let second = engine_b.analyze(events_b).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let data = sample::generate(SampleSpec {
        employees: 20,
        weeks: 4,
        seed: 11,
    });
    data.write_to(dir.path()).unwrap();

    let org = loaders::load_organization(&dir.path().join("hris.json")).unwrap();
    let load = loaders::load_events(&dir.path().join("events.json")).unwrap();
    assert!(load.malformed.is_empty());

    let engine = InsightsEngine::new(Arc::new(org), AnalyticsConfig::default()).unwrap();
    let report = engine.analyze(load.events).await.unwrap();
    assert!(report.summary.analyzed_events > 0);

    let markdown = report::render_markdown(&report).unwrap();
    assert!(markdown.contains("Meridian Labs"));
    assert!(markdown.contains("## Meeting Patterns"));
}

#[tokio::test]
async fn individual_report_for_sample_employee() {
    let (engine, events) = sample_engine(42);
    let email = engine.organization().employees_sorted()[0].email.clone();
    let report = engine.analyze_individual(&email, events).await.unwrap();
    assert_eq!(report.email, email.to_lowercase());
    assert!(report.meeting_count > 0);
    assert!(report.total_hours > 0.0);
}
