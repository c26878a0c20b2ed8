//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed rule structures deserialized from
//! the YAML files of one tax year, and the immutable [`RuleConfiguration`]
//! that aggregates and validates them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::StudentLoanPlan;

/// How often employees covered by a rule set are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// 52 periods per year.
    Weekly,
    /// 26 periods per year.
    Fortnightly,
    /// 13 periods per year.
    FourWeekly,
    /// 12 periods per year.
    Monthly,
    /// One period per year.
    Annual,
}

impl PayFrequency {
    /// Number of pay periods in a tax year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Fortnightly => 26,
            PayFrequency::FourWeekly => 13,
            PayFrequency::Monthly => 12,
            PayFrequency::Annual => 1,
        }
    }

    /// Converts an annual amount to its per-period share.
    pub fn per_period(&self, annual: Decimal) -> Decimal {
        annual / Decimal::from(self.periods_per_year())
    }
}

/// Identifying information about a rule set (`ruleset.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetMetadata {
    /// Tax year label (e.g. "2025-26").
    pub tax_year: String,
    /// Human-readable name of the rule set.
    pub name: String,
    /// First day the rules apply.
    pub effective_from: NaiveDate,
    /// Last day the rules apply.
    pub effective_to: NaiveDate,
    /// Pay frequency the per-period thresholds are expressed in.
    pub pay_frequency: PayFrequency,
    /// Where the figures were published.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// A range of taxable pay taxed at one marginal rate.
///
/// Bands are half-open: `[lower, upper)`, with `upper = None` for the top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    /// Band name (e.g. "basic").
    pub name: String,
    /// Inclusive lower bound of taxable pay for the period.
    pub lower: Decimal,
    /// Exclusive upper bound, or `None` for the unbounded top band.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Marginal rate as a fraction (0.20 for 20%).
    pub rate: Decimal,
}

/// Income tax rules (`income_tax.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRules {
    /// Ordered, contiguous tax bands starting at zero.
    pub bands: Vec<TaxBand>,
    /// Maximum fraction of gross pay that may be deducted under a K code.
    #[serde(default)]
    pub k_code_overriding_limit: Option<Decimal>,
}

impl TaxRules {
    /// Checks the bands are contiguous, start at zero and end unbounded.
    pub fn validate(&self) -> EngineResult<()> {
        const SECTION: &str = "income_tax";

        if self.bands.is_empty() {
            return Err(EngineError::invalid_config(SECTION, "no tax bands configured"));
        }

        let bounds: Vec<(Decimal, Option<Decimal>)> =
            self.bands.iter().map(|b| (b.lower, b.upper)).collect();
        check_contiguous(SECTION, "tax band", &bounds)?;

        for band in &self.bands {
            check_rate(SECTION, &format!("band '{}' rate", band.name), band.rate)?;
        }

        if let Some(limit) = self.k_code_overriding_limit {
            if limit <= Decimal::ZERO || limit > Decimal::ONE {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!("k_code_overriding_limit must be in (0, 1] (got {})", limit),
                ));
            }
        }

        Ok(())
    }
}

/// NI thresholds and rates for one category letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiCategoryRates {
    /// Category letter (e.g. "A").
    pub code: String,
    /// Description of who the category covers.
    #[serde(default)]
    pub description: String,
    /// Employee contributions start at this level of pay.
    pub primary_threshold: Decimal,
    /// Above this level the reduced employee rate applies.
    pub upper_earnings_limit: Decimal,
    /// Employee rate between the primary threshold and the UEL.
    pub employee_rate: Decimal,
    /// Employee rate above the UEL; zero when absent.
    #[serde(default)]
    pub employee_rate_above_uel: Option<Decimal>,
    /// Employer contributions start at this level of pay.
    pub secondary_threshold: Decimal,
    /// Employer rate above the secondary threshold.
    pub employer_rate: Decimal,
}

/// National Insurance rules (`national_insurance.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalInsuranceRules {
    /// One record per category letter.
    pub categories: Vec<NiCategoryRates>,
}

impl NationalInsuranceRules {
    /// Checks thresholds are ordered, rates are fractions and codes are unique.
    pub fn validate(&self) -> EngineResult<()> {
        const SECTION: &str = "national_insurance";

        if self.categories.is_empty() {
            return Err(EngineError::invalid_config(SECTION, "no NI categories configured"));
        }

        for (i, category) in self.categories.iter().enumerate() {
            let code = category.code.trim();
            if code.is_empty() {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!("category #{} has an empty code", i + 1),
                ));
            }

            if self.categories[..i]
                .iter()
                .any(|c| c.code.trim().eq_ignore_ascii_case(code))
            {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!("category '{}' is defined more than once", code),
                ));
            }

            if category.primary_threshold < Decimal::ZERO
                || category.secondary_threshold < Decimal::ZERO
            {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!("category '{}' has a negative threshold", code),
                ));
            }

            if category.primary_threshold > category.upper_earnings_limit {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!(
                        "category '{}' primary threshold {} exceeds upper earnings limit {}",
                        code, category.primary_threshold, category.upper_earnings_limit
                    ),
                ));
            }

            check_rate(
                SECTION,
                &format!("category '{}' employee rate", code),
                category.employee_rate,
            )?;
            check_rate(
                SECTION,
                &format!("category '{}' employer rate", code),
                category.employer_rate,
            )?;
            if let Some(rate) = category.employee_rate_above_uel {
                check_rate(SECTION, &format!("category '{}' rate above UEL", code), rate)?;
            }
        }

        Ok(())
    }

    /// Looks up a category by letter, ignoring case.
    pub fn category(&self, code: &str) -> EngineResult<&NiCategoryRates> {
        let code = code.trim();
        self.categories
            .iter()
            .find(|c| c.code.trim().eq_ignore_ascii_case(code))
            .ok_or_else(|| EngineError::UnknownNiCategory {
                code: code.to_string(),
            })
    }
}

/// Whether a student-loan threshold is stated per year or per pay period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBasis {
    /// The threshold applies to each pay period as written.
    #[default]
    PerPeriod,
    /// The threshold is annual and is divided by the periods per year.
    Annual,
}

/// Threshold and rate for one student-loan plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanPlanRule {
    /// Pay above this threshold is subject to repayment.
    pub threshold: Decimal,
    /// Whether `threshold` is annual or per period.
    #[serde(default)]
    pub basis: ThresholdBasis,
    /// Repayment rate as a fraction.
    pub rate: Decimal,
}

/// How the raw repayment is rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentRounding {
    /// Round down to the whole currency unit.
    #[default]
    TruncateWholeUnits,
    /// Round to 2 decimal places, half up.
    NearestPenny,
}

/// Student-loan rules (`student_loans.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanRules {
    /// Rounding applied to every plan's repayment.
    #[serde(default)]
    pub rounding: RepaymentRounding,
    /// Threshold and rate per plan.
    pub plans: BTreeMap<StudentLoanPlan, StudentLoanPlanRule>,
}

impl StudentLoanRules {
    /// Checks every plan has a non-negative threshold and a fractional rate.
    pub fn validate(&self) -> EngineResult<()> {
        const SECTION: &str = "student_loans";

        for (plan, rule) in &self.plans {
            if rule.threshold < Decimal::ZERO {
                return Err(EngineError::invalid_config(
                    SECTION,
                    format!("{} threshold must not be negative", plan),
                ));
            }
            check_rate(SECTION, &format!("{} rate", plan), rule.rate)?;
        }

        Ok(())
    }

    /// Looks up the rule for a plan.
    pub fn plan(&self, plan: StudentLoanPlan) -> EngineResult<&StudentLoanPlanRule> {
        self.plans
            .get(&plan)
            .ok_or_else(|| EngineError::UnknownStudentLoanPlan {
                plan: plan.to_string(),
            })
    }
}

/// One tier of a tiered union fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionFeeTier {
    /// Inclusive lower bound of gross pay.
    pub lower: Decimal,
    /// Exclusive upper bound, or `None` for the top tier.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Fee charged to members whose pay falls in the tier.
    pub fee: Decimal,
}

/// Union fee schedule (`union_fees.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnionFeeSchedule {
    /// Every member pays the same amount.
    Flat {
        /// The fee per period.
        amount: Decimal,
    },
    /// The fee depends on the tier containing gross pay.
    Tiered {
        /// Contiguous tiers starting at zero.
        tiers: Vec<UnionFeeTier>,
    },
}

impl UnionFeeSchedule {
    /// Checks fees are non-negative and tiers are contiguous.
    pub fn validate(&self) -> EngineResult<()> {
        const SECTION: &str = "union_fees";

        match self {
            UnionFeeSchedule::Flat { amount } => {
                if *amount < Decimal::ZERO {
                    return Err(EngineError::invalid_config(
                        SECTION,
                        "flat fee must not be negative",
                    ));
                }
            }
            UnionFeeSchedule::Tiered { tiers } => {
                if tiers.is_empty() {
                    return Err(EngineError::invalid_config(SECTION, "no fee tiers configured"));
                }
                let bounds: Vec<(Decimal, Option<Decimal>)> =
                    tiers.iter().map(|t| (t.lower, t.upper)).collect();
                check_contiguous(SECTION, "fee tier", &bounds)?;
                if tiers.iter().any(|t| t.fee < Decimal::ZERO) {
                    return Err(EngineError::invalid_config(
                        SECTION,
                        "tier fees must not be negative",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// The complete, validated rule set for one tax year and pay frequency.
///
/// Fields are private so a `RuleConfiguration` can only exist once validated;
/// it is never mutated afterwards and is shared read-only across a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleConfiguration {
    metadata: RuleSetMetadata,
    tax: TaxRules,
    national_insurance: NationalInsuranceRules,
    student_loans: StudentLoanRules,
    union_fees: UnionFeeSchedule,
}

impl RuleConfiguration {
    /// Creates a rule configuration, validating every section.
    pub fn new(
        metadata: RuleSetMetadata,
        tax: TaxRules,
        national_insurance: NationalInsuranceRules,
        student_loans: StudentLoanRules,
        union_fees: UnionFeeSchedule,
    ) -> EngineResult<Self> {
        let config = Self {
            metadata,
            tax,
            national_insurance,
            student_loans,
            union_fees,
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-checks every section.
    pub fn validate(&self) -> EngineResult<()> {
        if self.metadata.tax_year.trim().is_empty() {
            return Err(EngineError::invalid_config("ruleset", "tax_year must not be empty"));
        }
        if self.metadata.effective_from > self.metadata.effective_to {
            return Err(EngineError::invalid_config(
                "ruleset",
                format!(
                    "effective_from {} is after effective_to {}",
                    self.metadata.effective_from, self.metadata.effective_to
                ),
            ));
        }
        self.tax.validate()?;
        self.national_insurance.validate()?;
        self.student_loans.validate()?;
        self.union_fees.validate()
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &RuleSetMetadata {
        &self.metadata
    }

    /// Returns the pay frequency thresholds are expressed in.
    pub fn pay_frequency(&self) -> PayFrequency {
        self.metadata.pay_frequency
    }

    /// Returns the income tax rules.
    pub fn tax(&self) -> &TaxRules {
        &self.tax
    }

    /// Returns the National Insurance rules.
    pub fn national_insurance(&self) -> &NationalInsuranceRules {
        &self.national_insurance
    }

    /// Returns the student-loan rules.
    pub fn student_loans(&self) -> &StudentLoanRules {
        &self.student_loans
    }

    /// Returns the union fee schedule.
    pub fn union_fees(&self) -> &UnionFeeSchedule {
        &self.union_fees
    }
}

fn check_contiguous(
    section: &str,
    label: &str,
    bounds: &[(Decimal, Option<Decimal>)],
) -> EngineResult<()> {
    let Some((first_lower, _)) = bounds.first() else {
        return Ok(());
    };
    if !first_lower.is_zero() {
        return Err(EngineError::invalid_config(
            section,
            format!("first {} must start at 0 (starts at {})", label, first_lower),
        ));
    }

    for (i, (lower, upper)) in bounds.iter().enumerate() {
        let is_last = i + 1 == bounds.len();
        match (upper, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(EngineError::invalid_config(
                    section,
                    format!("only the last {} may be unbounded (#{} is)", label, i + 1),
                ));
            }
            (Some(_), true) => {
                return Err(EngineError::invalid_config(
                    section,
                    format!("last {} must be unbounded above", label),
                ));
            }
            (Some(upper), false) => {
                if upper <= lower {
                    return Err(EngineError::invalid_config(
                        section,
                        format!(
                            "{} #{} is not increasing ({} to {})",
                            label,
                            i + 1,
                            lower,
                            upper
                        ),
                    ));
                }
                let next_lower = bounds[i + 1].0;
                if next_lower != *upper {
                    return Err(EngineError::invalid_config(
                        section,
                        format!(
                            "{} #{} ends at {} but #{} starts at {}",
                            label,
                            i + 1,
                            upper,
                            i + 2,
                            next_lower
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn check_rate(section: &str, label: &str, rate: Decimal) -> EngineResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(EngineError::invalid_config(
            section,
            format!("{} must be between 0 and 1 (got {})", label, rate),
        ));
    }
    Ok(())
}
