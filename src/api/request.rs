//! Request types for the payroll engine API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::NegativeNetPayPolicy;
use crate::models::{EmployeePayInput, StudentLoanPlan};

/// Request body for `POST /payslips`, and one entry of a payroll run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePayRequest {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// PAYE tax code (e.g. "1257L").
    pub tax_code: String,
    /// National Insurance category letter.
    #[serde(default)]
    pub ni_category: Option<String>,
    /// Student loan plan, if any.
    #[serde(default)]
    pub student_loan_plan: Option<StudentLoanPlan>,
    /// Whether union fees are deducted.
    #[serde(default)]
    pub union_member: bool,
}

impl From<EmployeePayRequest> for EmployeePayInput {
    fn from(req: EmployeePayRequest) -> Self {
        EmployeePayInput {
            employee_id: req.employee_id,
            gross_pay: req.gross_pay,
            tax_code: req.tax_code,
            ni_category: req.ni_category,
            student_loan_plan: req.student_loan_plan,
            union_member: req.union_member,
        }
    }
}

/// Request body for `POST /payroll-runs`.
///
/// When `employees` is absent the directory's active employees are paid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// Explicit employees to pay, in run order.
    #[serde(default)]
    pub employees: Option<Vec<EmployeePayRequest>>,
    /// Overrides the server's negative net pay policy for this run.
    #[serde(default)]
    pub negative_net_pay: Option<NegativeNetPayPolicy>,
}

/// Query string for `GET /employees/{id}/student-loan-repayment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLoanRepaymentQuery {
    /// Pay to compute the repayment against.
    pub total_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_employee_request_conversion() {
        let json = r#"{
            "employee_id": "emp_001",
            "gross_pay": "2500.00",
            "tax_code": "1257L",
            "ni_category": "A",
            "student_loan_plan": "plan_2",
            "union_member": true
        }"#;

        let req: EmployeePayRequest = serde_json::from_str(json).unwrap();
        let input: EmployeePayInput = req.into();

        assert_eq!(input.employee_id, "emp_001");
        assert_eq!(input.gross_pay, Decimal::from_str("2500.00").unwrap());
        assert_eq!(input.student_loan_plan, Some(StudentLoanPlan::Plan2));
        assert!(input.union_member);
    }

    #[test]
    fn test_run_request_defaults() {
        let req: PayrollRunRequest = serde_json::from_str("{}").unwrap();
        assert!(req.employees.is_none());
        assert!(req.negative_net_pay.is_none());
    }

    #[test]
    fn test_run_request_with_policy() {
        let req: PayrollRunRequest =
            serde_json::from_str(r#"{"negative_net_pay": "clamp_with_warning"}"#).unwrap();
        assert_eq!(
            req.negative_net_pay,
            Some(NegativeNetPayPolicy::ClampWithWarning)
        );
    }
}
