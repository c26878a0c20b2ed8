//! Single-employee deduction queries.
//!
//! These answer "how much would this employee repay / pay in fees" without
//! computing a full payslip.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::{calculate_student_loan, calculate_union_fee};
use crate::config::RuleConfiguration;
use crate::directory::EmployeeDirectory;
use crate::error::{EngineError, EngineResult};
use crate::models::EmployeePayInput;

/// Student loan repayment due from `total_amount` of pay under the employee's plan.
///
/// Employees without a plan repay nothing.
///
/// # Errors
///
/// * `EmployeeNotFound` if the directory has no such employee
/// * `InvalidEmployee` if `total_amount` is negative
/// * `UnknownStudentLoanPlan` if the employee's plan is not configured
pub fn student_loan_repayment_amount<D: EmployeeDirectory + ?Sized>(
    directory: &D,
    employee_id: &str,
    total_amount: Decimal,
    config: &RuleConfiguration,
) -> EngineResult<Decimal> {
    let employee = find_employee(directory, employee_id)?;

    if total_amount < Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            employee_id: employee_id.to_string(),
            field: "total_amount".to_string(),
            message: format!("must not be negative (got {})", total_amount),
        });
    }

    let result = calculate_student_loan(
        total_amount,
        employee.student_loan_plan,
        config.student_loans(),
        config.pay_frequency(),
        1,
    )?;

    debug!(
        employee_id = %employee_id,
        total_amount = %total_amount,
        repayment = %result.repayment,
        "Student loan repayment looked up"
    );

    Ok(result.repayment)
}

/// Union fee for the employee's current gross pay.
///
/// # Errors
///
/// * `EmployeeNotFound` if the directory has no such employee
pub fn union_fees<D: EmployeeDirectory + ?Sized>(
    directory: &D,
    employee_id: &str,
    config: &RuleConfiguration,
) -> EngineResult<Decimal> {
    let employee = find_employee(directory, employee_id)?;

    let result = calculate_union_fee(
        employee.union_member,
        employee.gross_pay,
        config.union_fees(),
        1,
    )?;

    Ok(result.fee)
}

fn find_employee<D: EmployeeDirectory + ?Sized>(
    directory: &D,
    employee_id: &str,
) -> EngineResult<EmployeePayInput> {
    directory
        .find(employee_id)
        .ok_or_else(|| EngineError::EmployeeNotFound {
            employee_id: employee_id.to_string(),
        })
}
