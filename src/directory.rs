//! Source of employee records for payroll runs.
//!
//! Employee storage lives outside the engine. The [`EmployeeDirectory`] trait
//! is the seam through which runs and single-employee lookups obtain pay
//! inputs; [`InMemoryEmployeeDirectory`] backs tests and the HTTP server.

use crate::models::EmployeePayInput;

/// Supplies employee pay inputs to the engine.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee by identifier.
    fn find(&self, employee_id: &str) -> Option<EmployeePayInput>;

    /// Employees to include in a payroll run, in run order.
    fn active_for_payroll(&self) -> Vec<EmployeePayInput>;
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    input: EmployeePayInput,
    active: bool,
}

/// An [`EmployeeDirectory`] held in memory, preserving insertion order.
///
/// # Example
///
/// ```
/// use payroll_engine::directory::{EmployeeDirectory, InMemoryEmployeeDirectory};
/// use payroll_engine::models::EmployeePayInput;
/// use rust_decimal::Decimal;
///
/// let mut directory = InMemoryEmployeeDirectory::new();
/// directory.insert(EmployeePayInput {
///     employee_id: "emp_001".to_string(),
///     gross_pay: Decimal::from(2500),
///     tax_code: "1257L".to_string(),
///     ni_category: Some("A".to_string()),
///     student_loan_plan: None,
///     union_member: false,
/// });
///
/// assert!(directory.find("emp_001").is_some());
/// assert_eq!(directory.active_for_payroll().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeDirectory {
    entries: Vec<DirectoryEntry>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active employee, replacing any record with the same id.
    pub fn insert(&mut self, input: EmployeePayInput) {
        self.upsert(input, true);
    }

    /// Adds an employee who is excluded from payroll runs but can still be looked up.
    pub fn insert_inactive(&mut self, input: EmployeePayInput) {
        self.upsert(input, false);
    }

    /// Changes whether an employee is included in payroll runs.
    ///
    /// Returns false if the employee is unknown.
    pub fn set_active(&mut self, employee_id: &str, active: bool) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.input.employee_id == employee_id)
        {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Number of employees, active or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the directory holds no employees.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn upsert(&mut self, input: EmployeePayInput, active: bool) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.input.employee_id == input.employee_id)
        {
            Some(entry) => {
                entry.input = input;
                entry.active = active;
            }
            None => self.entries.push(DirectoryEntry { input, active }),
        }
    }
}

impl FromIterator<EmployeePayInput> for InMemoryEmployeeDirectory {
    fn from_iter<I: IntoIterator<Item = EmployeePayInput>>(iter: I) -> Self {
        let mut directory = Self::new();
        for input in iter {
            directory.insert(input);
        }
        directory
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn find(&self, employee_id: &str) -> Option<EmployeePayInput> {
        self.entries
            .iter()
            .find(|e| e.input.employee_id == employee_id)
            .map(|e| e.input.clone())
    }

    fn active_for_payroll(&self) -> Vec<EmployeePayInput> {
        self.entries
            .iter()
            .filter(|e| e.active)
            .map(|e| e.input.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(id: &str, gross: i64) -> EmployeePayInput {
        EmployeePayInput {
            employee_id: id.to_string(),
            gross_pay: Decimal::from(gross),
            tax_code: "1257L".to_string(),
            ni_category: Some("A".to_string()),
            student_loan_plan: None,
            union_member: false,
        }
    }

    #[test]
    fn test_active_employees_in_insertion_order() {
        let directory: InMemoryEmployeeDirectory =
            vec![input("b", 1), input("a", 2), input("c", 3)].into_iter().collect();

        let ids: Vec<String> = directory
            .active_for_payroll()
            .into_iter()
            .map(|e| e.employee_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_inactive_employees_excluded_from_runs_but_findable() {
        let mut directory = InMemoryEmployeeDirectory::new();
        directory.insert(input("emp_001", 1000));
        directory.insert_inactive(input("emp_002", 2000));

        assert_eq!(directory.active_for_payroll().len(), 1);
        assert!(directory.find("emp_002").is_some());
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_set_active() {
        let mut directory = InMemoryEmployeeDirectory::new();
        directory.insert(input("emp_001", 1000));

        assert!(directory.set_active("emp_001", false));
        assert!(directory.active_for_payroll().is_empty());
        assert!(!directory.set_active("missing", true));
    }

    #[test]
    fn test_insert_replaces_existing_record() {
        let mut directory = InMemoryEmployeeDirectory::new();
        directory.insert(input("emp_001", 1000));
        directory.insert(input("emp_001", 1500));

        assert_eq!(directory.len(), 1);
        assert_eq!(
            directory.find("emp_001").unwrap().gross_pay,
            Decimal::from(1500)
        );
    }

    #[test]
    fn test_find_unknown_employee() {
        assert!(InMemoryEmployeeDirectory::new().find("nobody").is_none());
    }
}
