//! Calendar Loader
//!
//! Reads a calendar export as a JSON array of event records. The file
//! itself must parse; individual records that do not match the event
//! shape are tallied as malformed and skipped, keeping one bad record
//! from poisoning a whole export.

use std::path::Path;
use tracing::{info, warn};

use crate::types::error::{OrgLensError, Result};
use crate::types::{CalendarEvent, SkipReason, SkippedEvent};

#[derive(Debug, Default)]
pub struct CalendarLoad {
    pub events: Vec<CalendarEvent>,
    pub malformed: Vec<SkippedEvent>,
}

pub fn load_events(path: &Path) -> Result<CalendarLoad> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| OrgLensError::load(path.display().to_string(), e.to_string()))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|e| OrgLensError::load(path.display().to_string(), e.to_string()))?;

    let mut load = CalendarLoad::default();
    for record in records {
        let id = field(&record, "id");
        let subject = field(&record, "subject");
        match serde_json::from_value::<CalendarEvent>(record) {
            Ok(event) => load.events.push(event),
            Err(e) => {
                warn!(event = %id, error = %e, "skipping malformed event record");
                load.malformed.push(SkippedEvent {
                    id,
                    subject,
                    reason: SkipReason::Malformed,
                });
            }
        }
    }
    info!(
        path = %path.display(),
        events = load.events.len(),
        malformed = load.malformed.len(),
        "loaded calendar export"
    );
    Ok(load)
}

fn field(record: &serde_json::Value, name: &str) -> String {
    record
        .get(name)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"[
                {"id": "e1", "subject": "Planning",
                 "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T09:30:00Z",
                 "organizer_email": "a@acme.com",
                 "attendees": [{"email": "b@acme.com"}]},
                {"id": "e2", "subject": "No timestamps",
                 "organizer_email": "a@acme.com"}
            ]"#,
        )
        .unwrap();

        let load = load_events(&path).unwrap();
        assert_eq!(load.events.len(), 1);
        assert_eq!(load.events[0].id, "e1");
        assert_eq!(load.malformed.len(), 1);
        assert_eq!(load.malformed[0].id, "e2");
        assert_eq!(load.malformed[0].reason, SkipReason::Malformed);
    }

    #[test]
    fn test_unparseable_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_events(&path).unwrap_err(),
            OrgLensError::Load { .. }
        ));
    }
}
