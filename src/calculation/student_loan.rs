//! Student loan repayment calculation.

use rust_decimal::Decimal;

use crate::config::{PayFrequency, RepaymentRounding, StudentLoanRules, ThresholdBasis};
use crate::error::EngineResult;
use crate::models::{AuditStep, StudentLoanPlan};

use super::money::{round_money, truncate_whole_units};

/// The result of a student loan repayment calculation.
#[derive(Debug, Clone)]
pub struct StudentLoanResult {
    /// Repayment deducted this period.
    pub repayment: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the student loan repayment for one pay period.
///
/// Repayment is `rate x max(0, gross_pay - threshold)`, rounded according to
/// the configured [`RepaymentRounding`]. Annual thresholds are spread over the
/// periods of `frequency`.
///
/// # Errors
///
/// Returns `UnknownStudentLoanPlan` if `plan` has no configured rule.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_student_loan;
/// use payroll_engine::config::{
///     PayFrequency, RepaymentRounding, StudentLoanPlanRule, StudentLoanRules, ThresholdBasis,
/// };
/// use payroll_engine::models::StudentLoanPlan;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
/// use std::str::FromStr;
///
/// let mut plans = BTreeMap::new();
/// plans.insert(
///     StudentLoanPlan::Plan1,
///     StudentLoanPlanRule {
///         threshold: Decimal::from(1800),
///         basis: ThresholdBasis::PerPeriod,
///         rate: Decimal::from_str("0.09").unwrap(),
///     },
/// );
/// let rules = StudentLoanRules { rounding: RepaymentRounding::TruncateWholeUnits, plans };
///
/// let result = calculate_student_loan(
///     Decimal::from(2000),
///     Some(StudentLoanPlan::Plan1),
///     &rules,
///     PayFrequency::Monthly,
///     3,
/// )
/// .unwrap();
/// assert_eq!(result.repayment, Decimal::from(18));
/// ```
pub fn calculate_student_loan(
    gross_pay: Decimal,
    plan: Option<StudentLoanPlan>,
    rules: &StudentLoanRules,
    frequency: PayFrequency,
    step_number: u32,
) -> EngineResult<StudentLoanResult> {
    let Some(plan) = plan else {
        let repayment = round_money(Decimal::ZERO);
        return Ok(StudentLoanResult {
            repayment,
            audit_step: AuditStep {
                step_number,
                rule_id: "student_loan".to_string(),
                rule_name: "Student Loan Repayment".to_string(),
                rule_ref: "student_loans".to_string(),
                input: serde_json::json!({
                    "gross_pay": gross_pay.to_string(),
                    "plan": null
                }),
                output: serde_json::json!({
                    "repayment": repayment.to_string()
                }),
                reasoning: "No student loan plan: nothing to repay".to_string(),
            },
        });
    };

    let rule = rules.plan(plan)?;

    let threshold = match rule.basis {
        ThresholdBasis::PerPeriod => rule.threshold,
        ThresholdBasis::Annual => frequency.per_period(rule.threshold),
    };

    let excess = (gross_pay - threshold).max(Decimal::ZERO);
    let raw = excess * rule.rate;
    let repayment = match rules.rounding {
        RepaymentRounding::TruncateWholeUnits => truncate_whole_units(raw),
        RepaymentRounding::NearestPenny => round_money(raw),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "student_loan".to_string(),
        rule_name: "Student Loan Repayment".to_string(),
        rule_ref: format!("student_loans.plans.{}", plan.as_str()),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "plan": plan.as_str(),
            "threshold": threshold.to_string(),
            "rate": rule.rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "excess": excess.to_string(),
            "raw_repayment": raw.to_string(),
            "rounding": rules.rounding,
            "repayment": repayment.to_string()
        }),
        reasoning: format!(
            "{}: (£{} - £{}) x {} = £{}, rounded to £{}",
            plan,
            gross_pay,
            threshold.round_dp(4),
            rule.rate.normalize(),
            raw.round_dp(4),
            repayment
        ),
    };

    Ok(StudentLoanResult {
        repayment,
        audit_step,
    })
}
