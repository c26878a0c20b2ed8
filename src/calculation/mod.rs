//! Calculation logic for the payroll engine.
//!
//! Each statutory deduction has its own stateless calculator that takes gross
//! pay and the relevant section of the rule configuration, and returns the
//! amount together with an audit step. The payslip orchestrator composes them
//! for one employee.

mod income_tax;
mod money;
mod national_insurance;
mod payslip;
mod student_loan;
mod union_fee;

pub use income_tax::{IncomeTaxResult, K_CODE_LIMIT_WARNING, calculate_income_tax};
pub use money::{MONEY_DP, in_range, portion_within, round_money, truncate_whole_units};
pub use national_insurance::{NationalInsuranceResult, calculate_national_insurance};
pub use payslip::{
    NEGATIVE_NET_PAY_WARNING, NON_CUMULATIVE_CODE_WARNING, NegativeNetPayPolicy, compute_payslip,
    compute_payslip_with_policy, try_compute_payslip,
};
pub use student_loan::{StudentLoanResult, calculate_student_loan};
pub use union_fee::{UnionFeeResult, calculate_union_fee};
