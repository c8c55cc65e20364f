//! Employee and Organization Domain Model
//!
//! The organization graph every analyzer reads: employees keyed by
//! case-insensitive email, manager edges, and function/team groupings.
//! Built once at load time and immutable afterwards; reporting-line
//! indexes (direct and skip-level) are precomputed here rather than
//! recomputed per query.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// =============================================================================
// Job Level & Function
// =============================================================================

/// Ordered job levels. Variant order is the seniority order, so `Ord`
/// and [`JobLevel::rank`] agree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum JobLevel {
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "IC")]
    Ic,
    #[serde(rename = "Senior IC")]
    SeniorIc,
    #[serde(rename = "Lead")]
    Lead,
    #[serde(rename = "Manager")]
    Manager,
    #[serde(rename = "Senior Manager")]
    SeniorManager,
    #[serde(rename = "Director")]
    Director,
    #[serde(rename = "VP")]
    Vp,
    #[serde(rename = "C-Level")]
    CLevel,
}

impl JobLevel {
    /// Numeric rank for comparisons and rate-table lookups (Unknown = 0).
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// All levels in seniority order, for breakdowns with stable ordering.
    pub fn all() -> &'static [JobLevel] {
        &[
            JobLevel::Ic,
            JobLevel::SeniorIc,
            JobLevel::Lead,
            JobLevel::Manager,
            JobLevel::SeniorManager,
            JobLevel::Director,
            JobLevel::Vp,
            JobLevel::CLevel,
            JobLevel::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobLevel::Unknown => "Unknown",
            JobLevel::Ic => "IC",
            JobLevel::SeniorIc => "Senior IC",
            JobLevel::Lead => "Lead",
            JobLevel::Manager => "Manager",
            JobLevel::SeniorManager => "Senior Manager",
            JobLevel::Director => "Director",
            JobLevel::Vp => "VP",
            JobLevel::CLevel => "C-Level",
        }
    }
}

impl std::fmt::Display for JobLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job function categories used for cross-functional grouping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum JobFunction {
    Engineering,
    Product,
    Design,
    #[serde(rename = "Data Science")]
    DataScience,
    Sales,
    Marketing,
    #[serde(rename = "Customer Success")]
    CustomerSuccess,
    Operations,
    #[serde(rename = "Human Resources")]
    HumanResources,
    Finance,
    Executive,
    #[default]
    Other,
}

impl JobFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFunction::Engineering => "Engineering",
            JobFunction::Product => "Product",
            JobFunction::Design => "Design",
            JobFunction::DataScience => "Data Science",
            JobFunction::Sales => "Sales",
            JobFunction::Marketing => "Marketing",
            JobFunction::CustomerSuccess => "Customer Success",
            JobFunction::Operations => "Operations",
            JobFunction::HumanResources => "Human Resources",
            JobFunction::Finance => "Finance",
            JobFunction::Executive => "Executive",
            JobFunction::Other => "Other",
        }
    }
}

impl std::fmt::Display for JobFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Employee
// =============================================================================

/// A single employee record from the HRIS source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub level: JobLevel,
    #[serde(default)]
    pub function: JobFunction,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub team: String,
    /// Manager reference by email. Absent = top of hierarchy. A reference
    /// that does not resolve inside the organization is treated as
    /// external/unknown, never an error.
    #[serde(default)]
    pub manager_email: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_manager: bool,
}

impl Employee {
    /// Canonical lookup key.
    pub fn email_key(&self) -> String {
        self.email.to_lowercase()
    }
}

// =============================================================================
// Organization
// =============================================================================

/// The organization graph. Construct with [`Organization::build`]; all
/// reporting-line and grouping indexes are derived there and the value is
/// read-only for the rest of its life.
#[derive(Debug, Clone)]
pub struct Organization {
    pub company_name: String,
    pub domain: String,
    employees: HashMap<String, Employee>,
    /// manager email -> direct report emails, sorted for determinism
    direct_reports: HashMap<String, Vec<String>>,
    /// manager email -> all report emails two or more levels below
    skip_level_reports: HashMap<String, Vec<String>>,
    by_function: BTreeMap<JobFunction, Vec<String>>,
    by_team: BTreeMap<String, Vec<String>>,
}

impl Organization {
    /// Build the organization graph from employee records.
    ///
    /// Emails are keyed case-insensitively; a duplicate email keeps the
    /// last record seen. Reporting-line traversal guards against manager
    /// cycles in dirty HRIS data.
    pub fn build(
        company_name: impl Into<String>,
        domain: impl Into<String>,
        records: Vec<Employee>,
    ) -> Self {
        let mut employees: HashMap<String, Employee> = HashMap::new();
        for employee in records {
            employees.insert(employee.email_key(), employee);
        }

        let mut direct_reports: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_function: BTreeMap<JobFunction, Vec<String>> = BTreeMap::new();
        let mut by_team: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (key, employee) in &employees {
            if let Some(manager) = &employee.manager_email {
                let manager_key = manager.to_lowercase();
                // Only index edges that resolve inside the org
                if employees.contains_key(&manager_key) {
                    direct_reports.entry(manager_key).or_default().push(key.clone());
                }
            }
            by_function.entry(employee.function).or_default().push(key.clone());
            if !employee.team.is_empty() {
                by_team.entry(employee.team.clone()).or_default().push(key.clone());
            }
        }

        for reports in direct_reports.values_mut() {
            reports.sort();
        }
        for members in by_function.values_mut() {
            members.sort();
        }
        for members in by_team.values_mut() {
            members.sort();
        }

        // Skip-level index: everything below each manager, minus their
        // direct line. Depth-first with a visited set to survive cycles.
        let mut skip_level_reports: HashMap<String, Vec<String>> = HashMap::new();
        for manager in direct_reports.keys() {
            let mut below: Vec<String> = Vec::new();
            let mut visited: HashSet<String> = HashSet::new();
            visited.insert(manager.clone());
            let mut stack: Vec<(String, usize)> = direct_reports
                .get(manager)
                .map(|reports| reports.iter().map(|r| (r.clone(), 1)).collect())
                .unwrap_or_default();

            while let Some((email, depth)) = stack.pop() {
                if !visited.insert(email.clone()) {
                    continue;
                }
                if depth >= 2 {
                    below.push(email.clone());
                }
                if let Some(next) = direct_reports.get(&email) {
                    for report in next {
                        stack.push((report.clone(), depth + 1));
                    }
                }
            }
            below.sort();
            skip_level_reports.insert(manager.clone(), below);
        }

        Self {
            company_name: company_name.into(),
            domain: domain.into().to_lowercase(),
            employees,
            direct_reports,
            skip_level_reports,
            by_function,
            by_team,
        }
    }

    /// Look up an employee by email (case-insensitive).
    pub fn employee(&self, email: &str) -> Option<&Employee> {
        self.employees.get(&email.to_lowercase())
    }

    /// Whether an email address belongs to the organization's domain.
    pub fn is_internal(&self, email: &str) -> bool {
        email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.eq_ignore_ascii_case(&self.domain))
    }

    /// Direct report emails of a manager, sorted. Empty for non-managers.
    pub fn direct_reports(&self, manager_email: &str) -> &[String] {
        self.direct_reports
            .get(&manager_email.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Report emails two or more levels below a manager, sorted.
    pub fn skip_level_reports(&self, manager_email: &str) -> &[String] {
        self.skip_level_reports
            .get(&manager_email.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All employees with at least one direct report, sorted by email.
    pub fn managers(&self) -> Vec<&Employee> {
        let mut keys: Vec<&String> = self.direct_reports.keys().collect();
        keys.sort();
        keys.iter().filter_map(|k| self.employees.get(*k)).collect()
    }

    /// Member emails of a function, sorted. Empty for unstaffed functions.
    pub fn function_members(&self, function: JobFunction) -> &[String] {
        self.by_function
            .get(&function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Functions with at least one employee, in stable order.
    pub fn active_functions(&self) -> Vec<JobFunction> {
        self.by_function
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(f, _)| *f)
            .collect()
    }

    /// Team name -> sorted member emails.
    pub fn teams(&self) -> &BTreeMap<String, Vec<String>> {
        &self.by_team
    }

    /// Iterate employees in deterministic (email) order.
    pub fn employees_sorted(&self) -> Vec<&Employee> {
        let mut all: Vec<&Employee> = self.employees.values().collect();
        all.sort_by(|a, b| a.email_key().cmp(&b.email_key()));
        all
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(email: &str, manager: Option<&str>, function: JobFunction) -> Employee {
        Employee {
            id: email.to_string(),
            email: email.to_string(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            job_title: String::new(),
            level: JobLevel::Ic,
            function,
            department: String::new(),
            team: String::new(),
            manager_email: manager.map(String::from),
            location: String::new(),
            is_manager: manager.is_none(),
        }
    }

    fn three_level_org() -> Organization {
        Organization::build(
            "Acme",
            "acme.com",
            vec![
                emp("vp@acme.com", None, JobFunction::Engineering),
                emp("mgr@acme.com", Some("vp@acme.com"), JobFunction::Engineering),
                emp("ic1@acme.com", Some("mgr@acme.com"), JobFunction::Engineering),
                emp("ic2@acme.com", Some("mgr@acme.com"), JobFunction::Product),
            ],
        )
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let org = three_level_org();
        assert!(org.employee("VP@Acme.Com").is_some());
        assert!(org.employee("missing@acme.com").is_none());
    }

    #[test]
    fn test_direct_and_skip_level_reports() {
        let org = three_level_org();
        assert_eq!(org.direct_reports("vp@acme.com"), ["mgr@acme.com"]);
        assert_eq!(
            org.skip_level_reports("vp@acme.com"),
            ["ic1@acme.com", "ic2@acme.com"]
        );
        // Direct reports are not skip-level reports
        assert!(org.skip_level_reports("mgr@acme.com").is_empty());
    }

    #[test]
    fn test_unresolved_manager_is_tolerated() {
        let org = Organization::build(
            "Acme",
            "acme.com",
            vec![emp("ic@acme.com", Some("ghost@other.com"), JobFunction::Sales)],
        );
        assert!(org.direct_reports("ghost@other.com").is_empty());
        assert_eq!(org.employee_count(), 1);
    }

    #[test]
    fn test_manager_cycle_does_not_hang() {
        let org = Organization::build(
            "Acme",
            "acme.com",
            vec![
                emp("a@acme.com", Some("b@acme.com"), JobFunction::Other),
                emp("b@acme.com", Some("a@acme.com"), JobFunction::Other),
            ],
        );
        // Both are "managers" of each other; traversal terminates
        assert_eq!(org.managers().len(), 2);
    }

    #[test]
    fn test_internal_domain_check() {
        let org = three_level_org();
        assert!(org.is_internal("anyone@ACME.com"));
        assert!(!org.is_internal("anyone@vendor.io"));
        assert!(!org.is_internal("not-an-email"));
    }

    #[test]
    fn test_function_members_sorted() {
        let org = three_level_org();
        assert_eq!(
            org.function_members(JobFunction::Engineering),
            ["ic1@acme.com", "mgr@acme.com", "vp@acme.com"]
        );
        assert!(org.function_members(JobFunction::Finance).is_empty());
    }
}
