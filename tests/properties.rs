//! Property tests for the payroll calculators.

use std::sync::OnceLock;

use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;

use payroll_engine::batch::{Parallelism, RunOptions, run_payroll_with_options};
use payroll_engine::calculation::{
    calculate_income_tax, calculate_national_insurance, compute_payslip,
};
use payroll_engine::config::{ConfigLoader, RuleConfiguration};
use payroll_engine::models::{EmployeePayInput, StudentLoanPlan, TaxCode};

fn uk_config() -> &'static RuleConfiguration {
    static CONFIG: OnceLock<RuleConfiguration> = OnceLock::new();
    CONFIG.get_or_init(|| {
        ConfigLoader::load_tax_year("./config", "2025-26")
            .expect("rule set")
            .into_config()
    })
}

fn pence(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

fn tax_code_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["1257L", "0T", "500T", "BR", "D0", "D1", "K100", "K6000", "NT"])
}

fn ni_category_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["A", "C", "H", "M", "X"])
}

fn plan_strategy() -> impl Strategy<Value = Option<StudentLoanPlan>> {
    prop::sample::select(vec![
        None,
        Some(StudentLoanPlan::Plan1),
        Some(StudentLoanPlan::Plan2),
        Some(StudentLoanPlan::Plan4),
        Some(StudentLoanPlan::Plan5),
        Some(StudentLoanPlan::Postgraduate),
    ])
}

prop_compose! {
    fn employee_strategy()(
        id in 0_u32..10_000,
        gross in 0_i64..2_000_000,
        tax_code in tax_code_strategy(),
        ni in ni_category_strategy(),
        plan in plan_strategy(),
        union_member in any::<bool>()
    ) -> EmployeePayInput {
        EmployeePayInput {
            employee_id: format!("emp_{id:05}"),
            gross_pay: pence(gross),
            tax_code: tax_code.to_string(),
            ni_category: Some(ni.to_string()),
            student_loan_plan: plan,
            union_member,
        }
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn tax_is_monotonic_in_gross_pay(
        low in 0_i64..2_000_000,
        step in 0_i64..500_000,
        code in tax_code_strategy()
    ) {
        let config = uk_config();
        let code: TaxCode = code.parse().expect("tax code");
        let tax = |gross: Decimal| {
            calculate_income_tax(gross, &code, config.tax(), config.pay_frequency(), 1)
                .expect("tax")
                .tax
        };
        prop_assert!(tax(pence(low)) <= tax(pence(low + step)));
    }

    #[test]
    fn ni_is_monotonic_in_gross_pay(
        low in 0_i64..2_000_000,
        step in 0_i64..500_000,
        category in ni_category_strategy()
    ) {
        let rules = uk_config().national_insurance();
        let first = calculate_national_insurance(pence(low), category, rules, 2).expect("ni");
        let second =
            calculate_national_insurance(pence(low + step), category, rules, 2).expect("ni");
        prop_assert!(first.employee_ni <= second.employee_ni);
        prop_assert!(first.employer_ni <= second.employer_ni);
    }

    #[test]
    fn no_tax_below_personal_allowance(gross in 0_i64..=104_750) {
        let config = uk_config();
        let code: TaxCode = "1257L".parse().expect("tax code");
        let result =
            calculate_income_tax(pence(gross), &code, config.tax(), config.pay_frequency(), 1)
                .expect("tax");
        prop_assert_eq!(result.tax, Decimal::ZERO);
    }

    #[test]
    fn net_pay_identity_holds(employee in employee_strategy()) {
        let payslip = compute_payslip(&employee, uk_config());
        if payslip.is_success() {
            prop_assert_eq!(
                payslip.net_pay,
                payslip.gross_pay
                    - payslip.tax
                    - payslip.employee_ni
                    - payslip.student_loan
                    - payslip.union_fee
            );
            prop_assert!(payslip.net_pay >= Decimal::ZERO);
        }
    }

    #[test]
    fn payslips_are_idempotent(employee in employee_strategy()) {
        let first = serde_json::to_string(&compute_payslip(&employee, uk_config())).expect("json");
        let second = serde_json::to_string(&compute_payslip(&employee, uk_config())).expect("json");
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #![proptest_config(Config::with_cases(32))]

    #[test]
    fn parallel_runs_match_sequential_runs(
        employees in prop::collection::vec(employee_strategy(), 0..40)
    ) {
        let config = uk_config();
        let sequential = run_payroll_with_options(
            &employees,
            config,
            &RunOptions { parallelism: Parallelism::Sequential, ..RunOptions::default() },
        )
        .expect("sequential run");
        let parallel = run_payroll_with_options(
            &employees,
            config,
            &RunOptions { parallelism: Parallelism::Threads(4), ..RunOptions::default() },
        )
        .expect("parallel run");

        prop_assert_eq!(sequential.payslips.len(), employees.len());
        prop_assert_eq!(sequential, parallel);
    }
}
