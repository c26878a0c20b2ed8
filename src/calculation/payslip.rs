//! Payslip computation for a single employee.
//!
//! Composes the income tax, National Insurance, student loan and union fee
//! calculators. Every deduction is computed against the same gross pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RuleConfiguration;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, AuditWarning, EmployeePayInput, PayslipResult, PayslipStatus};

use super::income_tax::calculate_income_tax;
use super::money::round_money;
use super::national_insurance::calculate_national_insurance;
use super::student_loan::calculate_student_loan;
use super::union_fee::calculate_union_fee;

/// Warning code attached when negative net pay is clamped to zero.
pub const NEGATIVE_NET_PAY_WARNING: &str = "NEGATIVE_NET_PAY_CLAMPED";

/// Warning code attached for `W1`/`M1`/`X` tax codes.
pub const NON_CUMULATIVE_CODE_WARNING: &str = "NON_CUMULATIVE_TAX_CODE";

/// What to do when deductions exceed gross pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeNetPayPolicy {
    /// Fail the payslip with a `NegativeNetPay` error.
    #[default]
    Reject,
    /// Pay zero and record the shortfall as a warning.
    ClampWithWarning,
}

/// Computes one employee's payslip, rejecting negative net pay.
///
/// Never fails: any error is captured as a `Failed` payslip.
pub fn compute_payslip(input: &EmployeePayInput, config: &RuleConfiguration) -> PayslipResult {
    compute_payslip_with_policy(input, config, NegativeNetPayPolicy::default())
}

/// Computes one employee's payslip under the given negative net pay policy.
///
/// Errors become a `Failed` payslip with every figure zeroed.
pub fn compute_payslip_with_policy(
    input: &EmployeePayInput,
    config: &RuleConfiguration,
    policy: NegativeNetPayPolicy,
) -> PayslipResult {
    match try_compute_payslip(input, config, policy) {
        Ok(payslip) => {
            debug!(
                employee_id = %payslip.employee_id,
                gross_pay = %payslip.gross_pay,
                net_pay = %payslip.net_pay,
                warnings = payslip.audit_trace.warnings.len(),
                "Payslip computed"
            );
            payslip
        }
        Err(err) => {
            warn!(
                employee_id = %input.employee_id,
                kind = ?err.kind(),
                error = %err,
                "Payslip computation failed"
            );
            PayslipResult::failed(&input.employee_id, input.gross_pay, &err)
        }
    }
}

/// Computes one employee's payslip, returning the first error encountered.
///
/// # Errors
///
/// * Validation errors for malformed input (empty id, negative gross pay,
///   bad tax code, missing NI category)
/// * Configuration errors for an unknown NI category or student loan plan
/// * `NegativeNetPay` when deductions exceed gross pay under
///   [`NegativeNetPayPolicy::Reject`]
pub fn try_compute_payslip(
    input: &EmployeePayInput,
    config: &RuleConfiguration,
    policy: NegativeNetPayPolicy,
) -> EngineResult<PayslipResult> {
    let validated = input.validate()?;
    let gross_pay = round_money(input.gross_pay);
    let frequency = config.pay_frequency();

    let mut trace = AuditTrace::default();

    let tax = calculate_income_tax(gross_pay, &validated.tax_code, config.tax(), frequency, 1)?;
    trace.steps.push(tax.audit_step);
    if let Some(warning) = tax.warning {
        trace.warnings.push(warning);
    }
    if validated.tax_code.is_non_cumulative() {
        trace.warnings.push(AuditWarning {
            code: NON_CUMULATIVE_CODE_WARNING.to_string(),
            message: format!(
                "Tax code {} is non-cumulative; tax computed on this period's pay only",
                validated.tax_code
            ),
            severity: "low".to_string(),
        });
    }

    let ni = calculate_national_insurance(
        gross_pay,
        validated.ni_category,
        config.national_insurance(),
        2,
    )?;
    trace.steps.push(ni.audit_step);

    let student_loan = calculate_student_loan(
        gross_pay,
        input.student_loan_plan,
        config.student_loans(),
        frequency,
        3,
    )?;
    trace.steps.push(student_loan.audit_step);

    let union_fee = calculate_union_fee(input.union_member, gross_pay, config.union_fees(), 4)?;
    trace.steps.push(union_fee.audit_step);

    let mut net_pay =
        gross_pay - tax.tax - ni.employee_ni - student_loan.repayment - union_fee.fee;

    if net_pay < Decimal::ZERO {
        match policy {
            NegativeNetPayPolicy::Reject => {
                return Err(EngineError::NegativeNetPay {
                    employee_id: input.employee_id.clone(),
                    net_pay,
                });
            }
            NegativeNetPayPolicy::ClampWithWarning => {
                trace.warnings.push(AuditWarning {
                    code: NEGATIVE_NET_PAY_WARNING.to_string(),
                    message: format!(
                        "Deductions exceed gross pay by £{}; net pay set to zero",
                        -net_pay
                    ),
                    severity: "high".to_string(),
                });
                net_pay = round_money(Decimal::ZERO);
            }
        }
    }

    Ok(PayslipResult {
        employee_id: input.employee_id.clone(),
        gross_pay,
        personal_allowance: tax.personal_allowance,
        taxable_pay: tax.taxable_pay,
        tax: tax.tax,
        employee_ni: ni.employee_ni,
        employer_ni: ni.employer_ni,
        student_loan: student_loan.repayment,
        union_fee: union_fee.fee,
        net_pay,
        status: PayslipStatus::Success,
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::error::ErrorKind;
    use crate::models::StudentLoanPlan;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn uk_config() -> RuleConfiguration {
        ConfigLoader::load_tax_year("./config", "2025-26")
            .unwrap()
            .into_config()
    }

    fn input(id: &str, gross: &str, tax_code: &str) -> EmployeePayInput {
        EmployeePayInput {
            employee_id: id.to_string(),
            gross_pay: dec(gross),
            tax_code: tax_code.to_string(),
            ni_category: Some("A".to_string()),
            student_loan_plan: None,
            union_member: false,
        }
    }

    /// PS-001: full payslip with every deduction
    #[test]
    fn test_full_payslip() {
        let mut employee = input("emp_001", "3000.00", "1257L");
        employee.student_loan_plan = Some(StudentLoanPlan::Plan2);
        employee.union_member = true;

        let payslip = compute_payslip(&employee, &uk_config());

        assert!(payslip.is_success());
        assert_eq!(payslip.tax, dec("390.50"));
        assert_eq!(payslip.employee_ni, dec("156.16"));
        assert_eq!(payslip.employer_ni, dec("387.45"));
        assert_eq!(payslip.student_loan, dec("56.00"));
        assert_eq!(payslip.union_fee, dec("19.50"));
        assert_eq!(payslip.net_pay, dec("2377.84"));
    }

    #[test]
    fn test_net_pay_identity() {
        let mut employee = input("emp_001", "4321.09", "1100L");
        employee.student_loan_plan = Some(StudentLoanPlan::Postgraduate);
        employee.union_member = true;

        let payslip = compute_payslip(&employee, &uk_config());

        assert_eq!(
            payslip.net_pay,
            payslip.gross_pay
                - payslip.tax
                - payslip.employee_ni
                - payslip.student_loan
                - payslip.union_fee
        );
    }

    #[test]
    fn test_audit_steps_in_invocation_order() {
        let payslip = compute_payslip(&input("emp_001", "2000.00", "1257L"), &uk_config());

        let rule_ids: Vec<&str> = payslip
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rule_ids,
            vec!["income_tax", "national_insurance", "student_loan", "union_fee"]
        );
        let numbers: Vec<u32> = payslip
            .audit_trace
            .steps
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_deductions_do_not_cascade() {
        // the union fee tier is chosen from gross pay, not pay after tax
        let mut employee = input("emp_001", "3000.00", "1257L");
        employee.union_member = true;
        let payslip = compute_payslip(&employee, &uk_config());
        assert_eq!(payslip.union_fee, dec("19.50"));
    }

    #[test]
    fn test_validation_failure_becomes_failed_payslip() {
        let mut employee = input("emp_001", "3000.00", "1257L");
        employee.ni_category = None;

        let payslip = compute_payslip(&employee, &uk_config());

        match &payslip.status {
            PayslipStatus::Failed { kind, reason } => {
                assert_eq!(*kind, ErrorKind::Validation);
                assert!(reason.contains("ni_category"), "reason: {}", reason);
            }
            other => panic!("Expected Failed status, got {:?}", other),
        }
        assert_eq!(payslip.net_pay, Decimal::ZERO);
        assert!(payslip.audit_trace.steps.is_empty());
    }

    #[test]
    fn test_unknown_ni_category_is_configuration_failure() {
        let mut employee = input("emp_001", "3000.00", "1257L");
        employee.ni_category = Some("Q".to_string());

        let err =
            try_compute_payslip(&employee, &uk_config(), NegativeNetPayPolicy::Reject).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_negative_net_pay_rejected_by_default() {
        // K6000 tax capped at 50% of 10.00 = 5.00; union fee 8.50
        let mut employee = input("emp_neg", "10.00", "K6000");
        employee.union_member = true;

        let err =
            try_compute_payslip(&employee, &uk_config(), NegativeNetPayPolicy::Reject).unwrap_err();
        match err {
            EngineError::NegativeNetPay {
                employee_id,
                net_pay,
            } => {
                assert_eq!(employee_id, "emp_neg");
                assert_eq!(net_pay, dec("-3.50"));
            }
            other => panic!("Expected NegativeNetPay, got {:?}", other),
        }

        let payslip = compute_payslip(&employee, &uk_config());
        assert!(matches!(
            payslip.status,
            PayslipStatus::Failed {
                kind: ErrorKind::Computation,
                ..
            }
        ));
    }

    #[test]
    fn test_negative_net_pay_clamped_with_warning() {
        let mut employee = input("emp_neg", "10.00", "K6000");
        employee.union_member = true;

        let payslip = compute_payslip_with_policy(
            &employee,
            &uk_config(),
            NegativeNetPayPolicy::ClampWithWarning,
        );

        assert!(payslip.is_success());
        assert_eq!(payslip.net_pay, Decimal::ZERO);
        let codes: Vec<&str> = payslip
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert!(codes.contains(&NEGATIVE_NET_PAY_WARNING));
        assert!(codes.contains(&super::super::income_tax::K_CODE_LIMIT_WARNING));
    }

    #[test]
    fn test_emergency_code_records_warning() {
        let payslip = compute_payslip(&input("emp_001", "3000.00", "1257L M1"), &uk_config());

        assert!(payslip.is_success());
        assert_eq!(payslip.tax, dec("390.50"));
        assert_eq!(payslip.audit_trace.warnings[0].code, NON_CUMULATIVE_CODE_WARNING);
    }

    #[test]
    fn test_identical_inputs_serialize_identically() {
        let config = uk_config();
        let employee = input("emp_001", "2750.25", "1257L");

        let first = serde_json::to_string(&compute_payslip(&employee, &config)).unwrap();
        let second = serde_json::to_string(&compute_payslip(&employee, &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&NegativeNetPayPolicy::ClampWithWarning).unwrap(),
            "\"clamp_with_warning\""
        );
    }
}
