//! Payslip result models.
//!
//! A [`PayslipResult`] is the computed breakdown of one employee's pay for one
//! period, together with the audit trace of how each figure was derived.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the rule-set section the step applied.
    pub rule_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a payslip.
///
/// Contains no timing data so that repeated computations serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Outcome of one employee's computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PayslipStatus {
    /// Every figure was computed.
    Success,
    /// The computation was abandoned for this employee.
    Failed {
        /// Which part of the taxonomy the failure belongs to.
        kind: ErrorKind,
        /// The error message.
        reason: String,
    },
}

/// The computed payslip for one employee and one pay period.
///
/// For a `Success` payslip,
/// `net_pay == gross_pay - tax - employee_ni - student_loan - union_fee`.
/// A `Failed` payslip carries zero deductions and zero net pay.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use payroll_engine::models::{PayslipResult, PayslipStatus};
/// use rust_decimal::Decimal;
///
/// let failed = PayslipResult::failed(
///     "E001",
///     Decimal::new(100000, 2),
///     &EngineError::UnknownNiCategory { code: "Q".to_string() },
/// );
/// assert!(!failed.is_success());
/// assert_eq!(failed.net_pay, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipResult {
    /// The employee this payslip belongs to.
    pub employee_id: String,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Tax-free allowance for the period derived from the tax code.
    pub personal_allowance: Decimal,
    /// Pay subject to income tax.
    pub taxable_pay: Decimal,
    /// Income tax deducted.
    pub tax: Decimal,
    /// Employee National Insurance contribution.
    pub employee_ni: Decimal,
    /// Employer National Insurance contribution (not deducted from pay).
    pub employer_ni: Decimal,
    /// Student-loan repayment.
    pub student_loan: Decimal,
    /// Union fee.
    pub union_fee: Decimal,
    /// Pay after deductions.
    pub net_pay: Decimal,
    /// Whether the computation succeeded.
    pub status: PayslipStatus,
    /// How each figure was derived.
    pub audit_trace: AuditTrace,
}

impl PayslipResult {
    /// Builds the `Failed` payslip for an employee whose computation errored.
    pub fn failed(employee_id: &str, gross_pay: Decimal, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            gross_pay,
            personal_allowance: Decimal::ZERO,
            taxable_pay: Decimal::ZERO,
            tax: Decimal::ZERO,
            employee_ni: Decimal::ZERO,
            employer_ni: Decimal::ZERO,
            student_loan: Decimal::ZERO,
            union_fee: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            status: PayslipStatus::Failed {
                kind: error.kind(),
                reason: error.to_string(),
            },
            audit_trace: AuditTrace::default(),
        }
    }

    /// Returns true if every figure was computed.
    pub fn is_success(&self) -> bool {
        self.status == PayslipStatus::Success
    }

    /// Sum of the deductions taken from gross pay.
    pub fn total_deductions(&self) -> Decimal {
        self.tax + self.employee_ni + self.student_loan + self.union_fee
    }
}
