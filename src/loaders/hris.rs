//! HRIS Loader
//!
//! Reads the employee directory export and builds the in-memory
//! `Organization`. The file is a single JSON document with the company
//! identity and a flat employee list; reporting lines are resolved from
//! `manager_email` during the build.

use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::types::error::{OrgLensError, Result};
use crate::types::{Employee, Organization};

#[derive(Debug, Deserialize)]
struct HrisFile {
    company_name: String,
    domain: String,
    employees: Vec<Employee>,
}

/// Load an organization from an HRIS JSON export. A file that does not
/// parse is a hard error; an unresolved `manager_email` inside it is not.
pub fn load_organization(path: &Path) -> Result<Organization> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| OrgLensError::load(path.display().to_string(), e.to_string()))?;
    let file: HrisFile = serde_json::from_str(&raw)
        .map_err(|e| OrgLensError::load(path.display().to_string(), e.to_string()))?;

    if file.employees.is_empty() {
        warn!(path = %path.display(), "HRIS export contains no employees");
    }
    let org = Organization::build(&file.company_name, &file.domain, file.employees);
    info!(
        company = %org.company_name,
        employees = org.employee_count(),
        "loaded organization"
    );
    Ok(org)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("hris.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_builds_reporting_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            r#"{
                "company_name": "Acme",
                "domain": "acme.com",
                "employees": [
                    {"id": "1", "email": "cto@acme.com", "name": "CTO",
                     "job_title": "CTO", "level": "C-Level", "function": "Engineering",
                     "department": "R&D", "team": "Leadership", "location": "NYC",
                     "is_manager": true},
                    {"id": "2", "email": "dev@acme.com", "name": "Dev",
                     "job_title": "Engineer", "level": "IC", "function": "Engineering",
                     "department": "R&D", "team": "Core", "location": "NYC",
                     "manager_email": "cto@acme.com", "is_manager": false}
                ]
            }"#,
        );
        let org = load_organization(&path).unwrap();
        assert_eq!(org.employee_count(), 2);
        assert_eq!(org.direct_reports("cto@acme.com"), ["dev@acme.com"]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_organization(Path::new("/nonexistent/hris.json")).unwrap_err();
        assert!(matches!(err, OrgLensError::Load { .. }));
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "{ not json");
        let err = load_organization(&path).unwrap_err();
        assert!(err.to_string().contains("hris.json"));
    }
}
