//! National Insurance calculation.
//!
//! Employee contributions are charged on pay between the primary threshold and
//! the upper earnings limit (UEL), with an optional reduced rate above the UEL.
//! Employer contributions are charged on all pay above the secondary threshold.

use rust_decimal::Decimal;

use crate::config::NationalInsuranceRules;
use crate::error::EngineResult;
use crate::models::AuditStep;

use super::money::{portion_within, round_money};

/// The result of a National Insurance calculation.
#[derive(Debug, Clone)]
pub struct NationalInsuranceResult {
    /// Employee contribution, deducted from pay.
    pub employee_ni: Decimal,
    /// Employer contribution, reported but not deducted.
    pub employer_ni: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates employee and employer NI for one pay period.
///
/// # Errors
///
/// Returns `UnknownNiCategory` if `category` is not configured.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_national_insurance;
/// use payroll_engine::config::{NationalInsuranceRules, NiCategoryRates};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rules = NationalInsuranceRules {
///     categories: vec![NiCategoryRates {
///         code: "A".to_string(),
///         description: String::new(),
///         primary_threshold: Decimal::from(800),
///         upper_earnings_limit: Decimal::from(4000),
///         employee_rate: Decimal::from_str("0.08").unwrap(),
///         employee_rate_above_uel: None,
///         secondary_threshold: Decimal::from(800),
///         employer_rate: Decimal::from_str("0.15").unwrap(),
///     }],
/// };
///
/// let result = calculate_national_insurance(Decimal::from(700), "A", &rules, 2).unwrap();
/// assert_eq!(result.employee_ni, Decimal::ZERO);
/// ```
pub fn calculate_national_insurance(
    gross_pay: Decimal,
    category: &str,
    rules: &NationalInsuranceRules,
    step_number: u32,
) -> EngineResult<NationalInsuranceResult> {
    let rates = rules.category(category)?;

    let main_portion = portion_within(
        gross_pay,
        rates.primary_threshold,
        Some(rates.upper_earnings_limit),
    );
    let above_uel = portion_within(gross_pay, rates.upper_earnings_limit, None);
    let rate_above_uel = rates.employee_rate_above_uel.unwrap_or(Decimal::ZERO);

    let employee_ni = round_money(main_portion * rates.employee_rate + above_uel * rate_above_uel);

    let employer_portion = portion_within(gross_pay, rates.secondary_threshold, None);
    let employer_ni = round_money(employer_portion * rates.employer_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "national_insurance".to_string(),
        rule_name: "National Insurance".to_string(),
        rule_ref: format!("national_insurance.categories.{}", rates.code),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "category": rates.code,
            "primary_threshold": rates.primary_threshold.to_string(),
            "upper_earnings_limit": rates.upper_earnings_limit.to_string(),
            "secondary_threshold": rates.secondary_threshold.to_string()
        }),
        output: serde_json::json!({
            "main_portion": main_portion.to_string(),
            "above_uel_portion": above_uel.to_string(),
            "employer_portion": employer_portion.to_string(),
            "employee_ni": employee_ni.to_string(),
            "employer_ni": employer_ni.to_string()
        }),
        reasoning: format!(
            "Category {}: employee £{} x {} + £{} x {} = £{}; employer £{} x {} = £{}",
            rates.code,
            main_portion,
            rates.employee_rate.normalize(),
            above_uel,
            rate_above_uel.normalize(),
            employee_ni,
            employer_portion,
            rates.employer_rate.normalize(),
            employer_ni
        ),
    };

    Ok(NationalInsuranceResult {
        employee_ni,
        employer_ni,
        audit_step,
    })
}
