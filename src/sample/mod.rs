//! Sample Data Generator
//!
//! Produces a synthetic organization and a matching calendar export for
//! demos and testing. Generation is seeded, so the same spec always
//! yields the same files. The output deliberately contains the patterns
//! the analyzers look for: weekly 1:1s (including one neglected report),
//! standups, a monthly all-hands, cross-functional syncs, external sales
//! calls, and a sprinkling of vaguely named meetings.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::types::error::Result;
use crate::types::{
    Attendee, AttendeeRole, CalendarEvent, Employee, JobFunction, JobLevel, RecurrencePattern,
    ResponseStatus,
};

const COMPANY: &str = "Meridian Labs";
const DOMAIN: &str = "meridianlabs.example";

const FIRST_NAMES: &[&str] = &[
    "Ava", "Noah", "Mia", "Liam", "Zoe", "Ethan", "Ivy", "Lucas", "Nora", "Owen", "Ruby",
    "Felix", "Iris", "Hugo", "Lena", "Marco", "Tara", "Dmitri", "Priya", "Sven",
];
const LAST_NAMES: &[&str] = &[
    "Chen", "Okafor", "Silva", "Novak", "Haas", "Ito", "Lindqvist", "Moreau", "Patel",
    "Kovacs", "Diaz", "Olsen", "Tanaka", "Weber", "Rossi", "Nakamura", "Fischer", "Costa",
];

#[derive(Debug, Clone, Copy)]
pub struct SampleSpec {
    pub employees: usize,
    pub weeks: u32,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            employees: 40,
            weeks: 8,
            seed: 42,
        }
    }
}

/// HRIS export shape, mirrored by `loaders::hris`.
#[derive(Debug, Serialize)]
pub struct HrisExport {
    pub company_name: String,
    pub domain: String,
    pub employees: Vec<Employee>,
}

#[derive(Debug)]
pub struct SampleData {
    pub hris: HrisExport,
    pub events: Vec<CalendarEvent>,
}

impl SampleData {
    /// Write `hris.json` and `events.json` into a directory.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let hris_path = dir.join("hris.json");
        let events_path = dir.join("events.json");
        std::fs::write(&hris_path, serde_json::to_string_pretty(&self.hris)?)?;
        std::fs::write(&events_path, serde_json::to_string_pretty(&self.events)?)?;
        info!(
            employees = self.hris.employees.len(),
            events = self.events.len(),
            dir = %dir.display(),
            "wrote sample data"
        );
        Ok(())
    }
}

pub fn generate(spec: SampleSpec) -> SampleData {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let employees = generate_employees(&mut rng, spec.employees.max(6));
    let events = generate_events(&mut rng, &employees, spec.weeks.max(1));
    SampleData {
        hris: HrisExport {
            company_name: COMPANY.to_string(),
            domain: DOMAIN.to_string(),
            employees,
        },
        events,
    }
}

// =============================================================================
// Organization
// =============================================================================

fn seeded_id(rng: &mut StdRng) -> String {
    Uuid::from_u128(rng.random()).to_string()
}

fn generate_employees(rng: &mut StdRng, count: usize) -> Vec<Employee> {
    let functions = [
        JobFunction::Engineering,
        JobFunction::Product,
        JobFunction::Design,
        JobFunction::Sales,
        JobFunction::CustomerSuccess,
        JobFunction::Operations,
    ];

    let mut employees = Vec::with_capacity(count);
    let ceo_email = email("Vera", "Armstrong");
    employees.push(person(
        rng,
        &ceo_email,
        "Vera Armstrong",
        "CEO",
        JobLevel::CLevel,
        JobFunction::Executive,
        "Leadership",
        None,
        true,
    ));

    // One manager per function, reporting to the CEO
    let mut managers: Vec<(String, JobFunction)> = Vec::new();
    for &function in &functions {
        let (first, last, addr) = loop {
            let (first, last) = pick_name(rng);
            let addr = email(first, last);
            if !employees.iter().any(|e| e.email == addr)
                && !managers.iter().any(|(m, _)| *m == addr)
            {
                break (first, last, addr);
            }
        };
        employees.push(person(
            rng,
            &addr,
            &format!("{first} {last}"),
            &format!("Head of {function}"),
            JobLevel::Director,
            function,
            &function.to_string(),
            Some(&ceo_email),
            true,
        ));
        managers.push((addr, function));
    }

    while employees.len() < count {
        let (first, last) = pick_name(rng);
        let mut addr = email(first, last);
        if employees.iter().any(|e| e.email == addr) {
            // Name pool exhausted or unlucky draw; disambiguate instead
            // of redrawing forever
            addr = format!(
                "{}.{}{}@{DOMAIN}",
                first.to_lowercase(),
                last.to_lowercase(),
                employees.len()
            );
        }
        let (manager, function) = managers[rng.random_range(0..managers.len())].clone();
        let level = if rng.random_bool(0.3) {
            JobLevel::SeniorIc
        } else {
            JobLevel::Ic
        };
        employees.push(person(
            rng,
            &addr,
            &format!("{first} {last}"),
            &format!("{function} Specialist"),
            level,
            function,
            &function.to_string(),
            Some(&manager),
            false,
        ));
    }
    employees
}

#[allow(clippy::too_many_arguments)]
fn person(
    rng: &mut StdRng,
    email: &str,
    name: &str,
    title: &str,
    level: JobLevel,
    function: JobFunction,
    team: &str,
    manager: Option<&str>,
    is_manager: bool,
) -> Employee {
    Employee {
        id: seeded_id(rng),
        email: email.to_string(),
        name: name.to_string(),
        job_title: title.to_string(),
        level,
        function,
        department: function.to_string(),
        team: team.to_string(),
        manager_email: manager.map(|m| m.to_string()),
        location: "Remote".to_string(),
        is_manager,
    }
}

fn pick_name(rng: &mut StdRng) -> (&'static str, &'static str) {
    (
        FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
        LAST_NAMES[rng.random_range(0..LAST_NAMES.len())],
    )
}

fn email(first: &str, last: &str) -> String {
    format!("{}.{}@{DOMAIN}", first.to_lowercase(), last.to_lowercase())
}

// =============================================================================
// Events
// =============================================================================

fn generate_events(rng: &mut StdRng, employees: &[Employee], weeks: u32) -> Vec<CalendarEvent> {
    // Monday, eight weeks before a fixed anchor
    let anchor = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).single();
    let Some(anchor) = anchor else {
        return Vec::new();
    };
    let start_of_data = anchor - Duration::weeks(i64::from(weeks));

    let managers: Vec<&Employee> = employees.iter().filter(|e| e.is_manager).collect();
    let mut events = Vec::new();

    for manager in &managers {
        let reports: Vec<&Employee> = employees
            .iter()
            .filter(|e| e.manager_email.as_deref() == Some(manager.email.as_str()))
            .collect();
        for (index, report) in reports.iter().enumerate() {
            // The last report of each manager gets no 1:1s at all, so the
            // at-risk detector has something to find
            if index + 1 == reports.len() && reports.len() > 1 {
                continue;
            }
            let series = seeded_id(rng);
            for week in 0..weeks {
                let start = start_of_data
                    + Duration::weeks(i64::from(week))
                    + Duration::days((index % 5) as i64)
                    + Duration::hours(10);
                events.push(meeting(
                    rng,
                    &format!("{} / {} 1:1", manager.name, report.name),
                    start,
                    30,
                    &manager.email,
                    &[report.email.as_str()],
                    Some(RecurrencePattern::Weekly),
                    Some(&series),
                ));
            }
        }

        // Daily standup, weekdays, whole team
        if !reports.is_empty() {
            let series = seeded_id(rng);
            let report_emails: Vec<&str> =
                reports.iter().map(|r| r.email.as_str()).collect();
            for week in 0..weeks {
                for day in 0..5 {
                    let start = start_of_data
                        + Duration::weeks(i64::from(week))
                        + Duration::days(day)
                        + Duration::hours(9);
                    events.push(meeting(
                        rng,
                        &format!("{} Standup", manager.function),
                        start,
                        15,
                        &manager.email,
                        &report_emails,
                        Some(RecurrencePattern::Daily),
                        Some(&series),
                    ));
                }
            }
        }
    }

    // Monthly all-hands, everyone invited
    let everyone: Vec<&str> = employees.iter().skip(1).map(|e| e.email.as_str()).collect();
    let series = seeded_id(rng);
    for month in 0..=(weeks / 4) {
        let start = start_of_data + Duration::weeks(i64::from(month * 4)) + Duration::hours(16);
        events.push(meeting(
            rng,
            "Company All Hands",
            start,
            60,
            &employees[0].email,
            &everyone,
            Some(RecurrencePattern::Monthly),
            Some(&series),
        ));
    }

    // Weekly cross-functional planning with a few vague stragglers
    for week in 0..weeks {
        let mut invited: Vec<&str> = Vec::new();
        for function in [JobFunction::Engineering, JobFunction::Product, JobFunction::Design] {
            let members: Vec<&Employee> = employees
                .iter()
                .filter(|e| e.function == function)
                .collect();
            if let Some(member) = members.get(rng.random_range(0..members.len().max(1))) {
                invited.push(member.email.as_str());
            }
        }
        if invited.len() < 2 {
            continue;
        }
        let organizer = invited[0].to_string();
        let subject = if week == 0 || rng.random_bool(0.25) {
            "Sync".to_string()
        } else {
            format!("Sprint Planning Week {}", week + 1)
        };
        let start = start_of_data
            + Duration::weeks(i64::from(week))
            + Duration::days(2)
            + Duration::hours(14);
        events.push(meeting(
            rng,
            &subject,
            start,
            60,
            &organizer,
            &invited[1..],
            None,
            None,
        ));
    }

    // External customer calls for sales and customer success
    let customer_facing: Vec<&Employee> = employees
        .iter()
        .filter(|e| {
            matches!(
                e.function,
                JobFunction::Sales | JobFunction::CustomerSuccess
            )
        })
        .collect();
    for (index, seller) in customer_facing.iter().enumerate() {
        for week in 0..weeks {
            if week > 0 && rng.random_bool(0.4) {
                continue;
            }
            let guest = format!("contact{index}@customer{}.example", week % 3);
            let start = start_of_data
                + Duration::weeks(i64::from(week))
                + Duration::days(i64::from(week % 5))
                + Duration::hours(15);
            events.push(meeting(
                rng,
                "Customer Check-In",
                start,
                45,
                &seller.email,
                &[guest.as_str()],
                None,
                None,
            ));
        }
    }

    events
}

#[allow(clippy::too_many_arguments)]
fn meeting(
    rng: &mut StdRng,
    subject: &str,
    start: DateTime<Utc>,
    minutes: i64,
    organizer: &str,
    invited: &[&str],
    recurrence: Option<RecurrencePattern>,
    series_id: Option<&str>,
) -> CalendarEvent {
    let attendees = invited
        .iter()
        .map(|addr| Attendee {
            email: addr.to_string(),
            name: String::new(),
            response: if rng.random_bool(0.8) {
                ResponseStatus::Accepted
            } else if rng.random_bool(0.5) {
                ResponseStatus::Tentative
            } else {
                ResponseStatus::NoResponse
            },
            role: AttendeeRole::Required,
        })
        .collect();
    CalendarEvent {
        id: seeded_id(rng),
        subject: subject.to_string(),
        body: None,
        start,
        end: start + Duration::minutes(minutes),
        all_day: false,
        cancelled: false,
        organizer_email: organizer.to_string(),
        attendees,
        recurrence,
        series_id: series_id.map(|s| s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_seeded() {
        let spec = SampleSpec::default();
        let first = generate(spec);
        let second = generate(spec);
        assert_eq!(
            serde_json::to_string(&first.events).unwrap(),
            serde_json::to_string(&second.events).unwrap()
        );
        assert_eq!(first.hris.employees.len(), second.hris.employees.len());
    }

    #[test]
    fn test_sample_contains_expected_patterns() {
        let data = generate(SampleSpec::default());
        assert_eq!(data.hris.employees.len(), 40);
        assert!(data.events.iter().any(|e| e.subject.contains("1:1")));
        assert!(data.events.iter().any(|e| e.subject == "Company All Hands"));
        assert!(data.events.iter().any(|e| e.subject == "Sync"));
        assert!(
            data.events
                .iter()
                .any(|e| e.attendees.iter().any(|a| !a.email.ends_with(DOMAIN)))
        );
    }

    #[test]
    fn test_written_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let data = generate(SampleSpec {
            employees: 12,
            weeks: 2,
            seed: 7,
        });
        data.write_to(dir.path()).unwrap();

        let org = crate::loaders::load_organization(&dir.path().join("hris.json")).unwrap();
        assert_eq!(org.employee_count(), 12);
        assert!(org.is_internal(&data.hris.employees[0].email));

        let load = crate::loaders::load_events(&dir.path().join("events.json")).unwrap();
        assert_eq!(load.events.len(), data.events.len());
        assert!(load.malformed.is_empty());
    }
}
