//! Union fee calculation.

use rust_decimal::Decimal;

use crate::config::UnionFeeSchedule;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::money::{in_range, round_money};

/// The result of a union fee calculation.
#[derive(Debug, Clone)]
pub struct UnionFeeResult {
    /// Fee deducted this period.
    pub fee: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the union fee for one pay period.
///
/// Non-members pay nothing. Members pay the flat amount, or the fee of the
/// tier whose `[lower, upper)` range contains `gross_pay`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if no tier covers `gross_pay`, which only
/// happens for a schedule that bypassed validation.
pub fn calculate_union_fee(
    is_member: bool,
    gross_pay: Decimal,
    schedule: &UnionFeeSchedule,
    step_number: u32,
) -> EngineResult<UnionFeeResult> {
    let (fee, rule_ref, reasoning) = if !is_member {
        (
            Decimal::ZERO,
            "union_fees".to_string(),
            "Not a union member: no fee".to_string(),
        )
    } else {
        match schedule {
            UnionFeeSchedule::Flat { amount } => (
                *amount,
                "union_fees.flat".to_string(),
                format!("Flat union fee of £{}", round_money(*amount)),
            ),
            UnionFeeSchedule::Tiered { tiers } => {
                let (index, tier) = tiers
                    .iter()
                    .enumerate()
                    .find(|(_, tier)| in_range(gross_pay, tier.lower, tier.upper))
                    .ok_or_else(|| {
                        EngineError::invalid_config(
                            "union_fees",
                            format!("no tier covers gross pay {}", gross_pay),
                        )
                    })?;
                let upper = tier
                    .upper
                    .map(|u| format!("£{}", u))
                    .unwrap_or_else(|| "and above".to_string());
                (
                    tier.fee,
                    format!("union_fees.tiers.{}", index),
                    format!(
                        "Gross pay £{} falls in tier £{} {}: fee £{}",
                        gross_pay,
                        tier.lower,
                        upper,
                        round_money(tier.fee)
                    ),
                )
            }
        }
    };

    let fee = round_money(fee);

    let audit_step = AuditStep {
        step_number,
        rule_id: "union_fee".to_string(),
        rule_name: "Union Fee".to_string(),
        rule_ref,
        input: serde_json::json!({
            "union_member": is_member,
            "gross_pay": gross_pay.to_string()
        }),
        output: serde_json::json!({
            "fee": fee.to_string()
        }),
        reasoning,
    };

    Ok(UnionFeeResult { fee, audit_step })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnionFeeTier;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tiered() -> UnionFeeSchedule {
        UnionFeeSchedule::Tiered {
            tiers: vec![
                UnionFeeTier {
                    lower: dec("0"),
                    upper: Some(dec("1500")),
                    fee: dec("8.50"),
                },
                UnionFeeTier {
                    lower: dec("1500"),
                    upper: Some(dec("3000")),
                    fee: dec("14.00"),
                },
                UnionFeeTier {
                    lower: dec("3000"),
                    upper: None,
                    fee: dec("19.50"),
                },
            ],
        }
    }

    #[test]
    fn test_non_member_pays_nothing() {
        let result = calculate_union_fee(false, dec("2500.00"), &tiered(), 4).unwrap();
        assert_eq!(result.fee, Decimal::ZERO);
        assert_eq!(result.audit_step.rule_ref, "union_fees");
    }

    #[test]
    fn test_flat_fee() {
        let schedule = UnionFeeSchedule::Flat { amount: dec("12") };
        let result = calculate_union_fee(true, dec("2500.00"), &schedule, 4).unwrap();
        assert_eq!(result.fee.to_string(), "12.00");
    }

    #[test]
    fn test_tier_selected_by_gross_pay() {
        let result = calculate_union_fee(true, dec("2500.00"), &tiered(), 4).unwrap();
        assert_eq!(result.fee, dec("14.00"));
        assert_eq!(result.audit_step.rule_ref, "union_fees.tiers.1");
    }

    #[test]
    fn test_tier_boundary_belongs_to_upper_tier() {
        let result = calculate_union_fee(true, dec("1500.00"), &tiered(), 4).unwrap();
        assert_eq!(result.fee, dec("14.00"));

        let top = calculate_union_fee(true, dec("3000.00"), &tiered(), 4).unwrap();
        assert_eq!(top.fee, dec("19.50"));
    }

    #[test]
    fn test_gap_in_unvalidated_tiers_is_configuration_error() {
        let schedule = UnionFeeSchedule::Tiered {
            tiers: vec![UnionFeeTier {
                lower: dec("0"),
                upper: Some(dec("1000")),
                fee: dec("5"),
            }],
        };
        let err = calculate_union_fee(true, dec("2000.00"), &schedule, 4).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
