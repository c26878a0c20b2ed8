//! Income tax calculation.
//!
//! Tax is computed per period: the tax code's annual allowance (or K-code
//! addition) is spread evenly over the periods of the year, and the resulting
//! taxable pay is walked through the configured bands.

use rust_decimal::Decimal;

use crate::config::{PayFrequency, TaxRules};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, TaxCode, TaxCodeBasis};

use super::money::{portion_within, round_money};

/// Warning code attached when the K-code overriding limit caps the tax.
pub const K_CODE_LIMIT_WARNING: &str = "K_CODE_LIMIT_APPLIED";

/// The result of an income tax calculation.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Tax-free allowance for the period (zero for K, flat-rate and NT codes).
    pub personal_allowance: Decimal,
    /// Pay subject to tax, rounded to pence.
    pub taxable_pay: Decimal,
    /// Tax due, rounded to pence half up.
    pub tax: Decimal,
    /// Set when the K-code overriding limit reduced the tax.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates income tax for one pay period.
///
/// # Arguments
///
/// * `gross_pay` - Gross pay for the period
/// * `tax_code` - The employee's parsed tax code
/// * `rules` - Tax bands (per-period amounts)
/// * `frequency` - Pay frequency used to spread annual allowances
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// * `InvalidConfiguration` if the bands are missing, not contiguous or do not start at zero
/// * `TaxBandNotConfigured` if a `BR`/`D0`/`D1` code names a band that does not exist
/// * `CalculationError` if a K-code addition overflows the decimal range
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax;
/// use payroll_engine::config::{PayFrequency, TaxBand, TaxRules};
/// use payroll_engine::models::TaxCode;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rules = TaxRules {
///     bands: vec![TaxBand {
///         name: "basic".to_string(),
///         lower: Decimal::ZERO,
///         upper: None,
///         rate: Decimal::from_str("0.20").unwrap(),
///     }],
///     k_code_overriding_limit: None,
/// };
/// let code: TaxCode = "100L".parse().unwrap();
///
/// let result = calculate_income_tax(
///     Decimal::from_str("3000.00").unwrap(),
///     &code,
///     &rules,
///     PayFrequency::Annual,
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.tax, Decimal::from_str("400.00").unwrap());
/// ```
pub fn calculate_income_tax(
    gross_pay: Decimal,
    tax_code: &TaxCode,
    rules: &TaxRules,
    frequency: PayFrequency,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    rules.validate()?;

    match tax_code.basis() {
        TaxCodeBasis::NoTax => Ok(no_tax(gross_pay, tax_code, step_number)),
        TaxCodeBasis::FlatRate { band_index } => {
            flat_rate(gross_pay, tax_code, rules, band_index, step_number)
        }
        TaxCodeBasis::Allowance { annual } => {
            let allowance = frequency.per_period(annual);
            let taxable = (gross_pay - allowance).max(Decimal::ZERO);
            Ok(banded(
                gross_pay, tax_code, rules, allowance, taxable, None, step_number,
            ))
        }
        TaxCodeBasis::Additional { annual } => {
            let addition = frequency.per_period(annual);
            let taxable = gross_pay.checked_add(addition).ok_or_else(|| {
                EngineError::CalculationError {
                    message: format!(
                        "taxable pay overflowed adding {} to gross pay {} under code {}",
                        addition, gross_pay, tax_code
                    ),
                }
            })?;
            let limit = rules
                .k_code_overriding_limit
                .map(|fraction| gross_pay * fraction);
            Ok(banded(
                gross_pay,
                tax_code,
                rules,
                Decimal::ZERO,
                taxable,
                limit,
                step_number,
            ))
        }
    }
}

fn banded(
    gross_pay: Decimal,
    tax_code: &TaxCode,
    rules: &TaxRules,
    allowance: Decimal,
    taxable: Decimal,
    overriding_limit: Option<Decimal>,
    step_number: u32,
) -> IncomeTaxResult {
    let mut raw_tax = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for band in &rules.bands {
        let portion = portion_within(taxable, band.lower, band.upper);
        if portion.is_zero() {
            continue;
        }
        let band_tax = portion * band.rate;
        raw_tax += band_tax;
        breakdown.push(serde_json::json!({
            "band": band.name,
            "portion": portion.normalize().to_string(),
            "rate": band.rate.normalize().to_string(),
            "tax": band_tax.normalize().to_string()
        }));
    }

    let mut warning = None;
    if let Some(limit) = overriding_limit {
        if raw_tax > limit {
            warning = Some(AuditWarning {
                code: K_CODE_LIMIT_WARNING.to_string(),
                message: format!(
                    "Tax of {} under code {} capped at the overriding limit of {}",
                    round_money(raw_tax),
                    tax_code,
                    round_money(limit)
                ),
                severity: "medium".to_string(),
            });
            raw_tax = limit;
        }
    }

    let tax = round_money(raw_tax);
    let taxable_pay = round_money(taxable);
    let personal_allowance = round_money(allowance);

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax".to_string(),
        rule_ref: "income_tax.bands".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax_code": tax_code.raw(),
            "personal_allowance": personal_allowance.to_string()
        }),
        output: serde_json::json!({
            "taxable_pay": taxable_pay.to_string(),
            "bands": breakdown,
            "limit_applied": warning.is_some(),
            "tax": tax.to_string()
        }),
        reasoning: format!(
            "Code {}: taxable pay £{} across {} band(s) = £{}",
            tax_code,
            taxable_pay,
            breakdown.len(),
            tax
        ),
    };

    IncomeTaxResult {
        personal_allowance,
        taxable_pay,
        tax,
        warning,
        audit_step,
    }
}

fn flat_rate(
    gross_pay: Decimal,
    tax_code: &TaxCode,
    rules: &TaxRules,
    band_index: usize,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    let band = rules
        .bands
        .get(band_index)
        .ok_or_else(|| EngineError::TaxBandNotConfigured {
            code: tax_code.raw().to_string(),
            band_index,
        })?;

    let tax = round_money(gross_pay * band.rate);
    let taxable_pay = round_money(gross_pay);

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax".to_string(),
        rule_ref: "income_tax.flat_rate".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax_code": tax_code.raw()
        }),
        output: serde_json::json!({
            "band": band.name,
            "rate": band.rate.normalize().to_string(),
            "tax": tax.to_string()
        }),
        reasoning: format!(
            "Code {}: all pay at the {} rate, £{} x {} = £{}",
            tax_code,
            band.name,
            taxable_pay,
            band.rate.normalize(),
            tax
        ),
    };

    Ok(IncomeTaxResult {
        personal_allowance: round_money(Decimal::ZERO),
        taxable_pay,
        tax,
        warning: None,
        audit_step,
    })
}

fn no_tax(gross_pay: Decimal, tax_code: &TaxCode, step_number: u32) -> IncomeTaxResult {
    let zero = round_money(Decimal::ZERO);

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax".to_string(),
        rule_ref: "income_tax.no_tax".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax_code": tax_code.raw()
        }),
        output: serde_json::json!({
            "tax": zero.to_string()
        }),
        reasoning: format!("Code {}: no tax deducted", tax_code),
    };

    IncomeTaxResult {
        personal_allowance: zero,
        taxable_pay: zero,
        tax: zero,
        warning: None,
        audit_step,
    }
}
