//! Payroll run result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayslipResult;

/// Run-level sums over the successful payslips of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Total gross pay.
    pub gross_pay: Decimal,
    /// Total income tax.
    pub tax: Decimal,
    /// Total employee NI.
    pub employee_ni: Decimal,
    /// Total employer NI.
    pub employer_ni: Decimal,
    /// Total student-loan repayments.
    pub student_loan: Decimal,
    /// Total union fees.
    pub union_fee: Decimal,
    /// Total net pay.
    pub net_pay: Decimal,
}

impl RunTotals {
    fn add(&mut self, payslip: &PayslipResult) {
        self.gross_pay += payslip.gross_pay;
        self.tax += payslip.tax;
        self.employee_ni += payslip.employee_ni;
        self.employer_ni += payslip.employer_ni;
        self.student_loan += payslip.student_loan;
        self.union_fee += payslip.union_fee;
        self.net_pay += payslip.net_pay;
    }
}

/// Whether every employee of the run was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every employee has a payslip.
    Completed,
    /// The run stopped early; these employees were never started.
    Cancelled {
        /// Employee ids without a payslip, in input order.
        unprocessed: Vec<String>,
    },
}

/// The outcome of a payroll run.
///
/// Payslips appear in the same order as the employees were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunResult {
    /// One payslip per processed employee, in input order.
    pub payslips: Vec<PayslipResult>,
    /// Sums over `Success` payslips only.
    pub totals: RunTotals,
    /// Number of `Success` payslips.
    pub success_count: usize,
    /// Number of `Failed` payslips.
    pub failure_count: usize,
    /// Whether the run finished.
    pub status: RunStatus,
}

impl PayrollRunResult {
    /// Aggregates payslips into a run result.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{PayrollRunResult, RunStatus};
    ///
    /// let result = PayrollRunResult::from_payslips(vec![], RunStatus::Completed);
    /// assert_eq!(result.failure_count, 0);
    /// assert!(!result.has_failures());
    /// ```
    pub fn from_payslips(payslips: Vec<PayslipResult>, status: RunStatus) -> Self {
        let mut totals = RunTotals::default();
        let mut success_count = 0;

        for payslip in payslips.iter().filter(|p| p.is_success()) {
            totals.add(payslip);
            success_count += 1;
        }

        let failure_count = payslips.len() - success_count;

        Self {
            payslips,
            totals,
            success_count,
            failure_count,
            status,
        }
    }

    /// Returns true if any employee failed.
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    /// Returns true if the run was cancelled before every employee was processed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, RunStatus::Cancelled { .. })
    }

    /// Finds the payslip for an employee.
    pub fn payslip(&self, employee_id: &str) -> Option<&PayslipResult> {
        self.payslips.iter().find(|p| p.employee_id == employee_id)
    }
}
