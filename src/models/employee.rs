//! Employee pay input and related types.
//!
//! An [`EmployeePayInput`] is the per-period snapshot of one employee that the
//! payroll engine computes a payslip from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};

use super::TaxCode;

/// Largest gross pay accepted for one period, in pence (one trillion pounds).
pub const MAX_GROSS_PAY_PENCE: i64 = 100_000_000_000_000;

/// A student-loan repayment scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudentLoanPlan {
    /// Plan 1 (pre-2012 England/Wales, Northern Ireland).
    #[serde(rename = "plan_1")]
    Plan1,
    /// Plan 2 (post-2012 England/Wales).
    #[serde(rename = "plan_2")]
    Plan2,
    /// Plan 4 (Scotland).
    #[serde(rename = "plan_4")]
    Plan4,
    /// Plan 5 (post-2023 England).
    #[serde(rename = "plan_5")]
    Plan5,
    /// Postgraduate loan.
    #[serde(rename = "postgraduate")]
    Postgraduate,
}

impl StudentLoanPlan {
    /// Returns the configuration key for this plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentLoanPlan::Plan1 => "plan_1",
            StudentLoanPlan::Plan2 => "plan_2",
            StudentLoanPlan::Plan4 => "plan_4",
            StudentLoanPlan::Plan5 => "plan_5",
            StudentLoanPlan::Postgraduate => "postgraduate",
        }
    }
}

impl fmt::Display for StudentLoanPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pay-period snapshot of one employee.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeePayInput, StudentLoanPlan};
/// use rust_decimal::Decimal;
///
/// let input = EmployeePayInput {
///     employee_id: "E001".to_string(),
///     gross_pay: Decimal::new(250000, 2),
///     tax_code: "1257L".to_string(),
///     ni_category: Some("A".to_string()),
///     student_loan_plan: Some(StudentLoanPlan::Plan2),
///     union_member: false,
/// };
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayInput {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Gross earnings for the pay period.
    pub gross_pay: Decimal,
    /// The PAYE tax code (e.g. "1257L").
    pub tax_code: String,
    /// National Insurance category letter (e.g. "A").
    #[serde(default)]
    pub ni_category: Option<String>,
    /// Student-loan plan, if the employee is repaying one.
    #[serde(default)]
    pub student_loan_plan: Option<StudentLoanPlan>,
    /// Whether the employee pays union fees.
    #[serde(default)]
    pub union_member: bool,
}

/// Attributes of an [`EmployeePayInput`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayInput<'a> {
    /// The parsed tax code.
    pub tax_code: TaxCode,
    /// The trimmed NI category code.
    pub ni_category: &'a str,
}

impl EmployeePayInput {
    /// Checks the mandatory attributes before any calculator runs.
    ///
    /// Gross pay must be non-negative, no larger than [`MAX_GROSS_PAY_PENCE`] and
    /// expressed in whole pence. The tax code must parse and an NI category must
    /// be supplied.
    pub fn validate(&self) -> EngineResult<ValidatedPayInput<'_>> {
        if self.employee_id.trim().is_empty() {
            return Err(self.invalid("employee_id", "must not be empty"));
        }

        if self.gross_pay.is_sign_negative() && !self.gross_pay.is_zero() {
            return Err(self.invalid(
                "gross_pay",
                format!("must not be negative (got {})", self.gross_pay),
            ));
        }

        let max_gross_pay = Decimal::new(MAX_GROSS_PAY_PENCE, 2);
        if self.gross_pay > max_gross_pay {
            return Err(self.invalid(
                "gross_pay",
                format!("must not exceed {} (got {})", max_gross_pay, self.gross_pay),
            ));
        }

        if self.gross_pay.normalize().scale() > 2 {
            return Err(self.invalid(
                "gross_pay",
                format!("must have at most 2 decimal places (got {})", self.gross_pay),
            ));
        }

        let ni_category = match self.ni_category.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => return Err(self.invalid("ni_category", "is required")),
        };

        let tax_code = self.tax_code.parse::<TaxCode>()?;

        Ok(ValidatedPayInput {
            tax_code,
            ni_category,
        })
    }

    fn invalid(&self, field: &str, message: impl Into<String>) -> EngineError {
        EngineError::InvalidEmployee {
            employee_id: self.employee_id.clone(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}
