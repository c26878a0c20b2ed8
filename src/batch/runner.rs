//! Payroll run execution.
//!
//! A run fans the payslip orchestrator out over every employee with rayon and
//! collects the payslips back in input order. A failing employee produces a
//! `Failed` payslip and never affects the others.

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use crate::calculation::{NegativeNetPayPolicy, compute_payslip_with_policy};
use crate::config::RuleConfiguration;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeePayInput, PayrollRunResult, PayslipResult, RunStatus};

use super::cancellation::CancellationToken;

/// How employees are distributed across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// Compute on the calling thread.
    Sequential,
    /// Use rayon's global thread pool.
    #[default]
    Global,
    /// Use a dedicated pool of this many threads (0 lets rayon choose).
    Threads(usize),
}

/// Options controlling a payroll run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Thread distribution.
    pub parallelism: Parallelism,
    /// Stops dispatching further employees once cancelled.
    pub cancellation: Option<CancellationToken>,
    /// Stops dispatching further employees once passed.
    pub deadline: Option<Instant>,
    /// Handling of deductions that exceed gross pay.
    pub negative_net_pay: NegativeNetPayPolicy,
}

impl RunOptions {
    fn should_stop(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Runs payroll for every employee with the default options.
///
/// # Errors
///
/// Returns a configuration error if `config` fails validation. Per-employee
/// failures are reported as `Failed` payslips, not errors.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::batch::run_payroll;
/// use payroll_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load_tax_year("./config", "2025-26").unwrap().into_config();
/// let result = run_payroll(&[], &config).unwrap();
/// assert_eq!(result.success_count, 0);
/// ```
pub fn run_payroll(
    employees: &[EmployeePayInput],
    config: &RuleConfiguration,
) -> EngineResult<PayrollRunResult> {
    run_payroll_with_options(employees, config, &RunOptions::default())
}

/// Runs payroll for every employee.
///
/// Cancellation and the deadline are checked before each employee starts.
/// Employees that never started are listed in [`RunStatus::Cancelled`].
///
/// # Errors
///
/// * Configuration errors if `config` fails validation
/// * `WorkerPool` if a dedicated thread pool cannot be built
pub fn run_payroll_with_options(
    employees: &[EmployeePayInput],
    config: &RuleConfiguration,
    options: &RunOptions,
) -> EngineResult<PayrollRunResult> {
    let start_time = Instant::now();

    config.validate()?;
    warn_on_duplicate_ids(employees);

    let process = |employee: &EmployeePayInput| -> Option<PayslipResult> {
        if options.should_stop() {
            return None;
        }
        Some(compute_payslip_with_policy(
            employee,
            config,
            options.negative_net_pay,
        ))
    };

    let slots: Vec<Option<PayslipResult>> = match options.parallelism {
        Parallelism::Sequential => employees.iter().map(process).collect(),
        Parallelism::Global => employees.par_iter().map(process).collect(),
        Parallelism::Threads(threads) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("payroll-worker-{}", i))
                .build()
                .map_err(|e| EngineError::WorkerPool {
                    message: e.to_string(),
                })?;
            pool.install(|| employees.par_iter().map(process).collect())
        }
    };

    let result = assemble(employees, slots);

    info!(
        tax_year = %config.metadata().tax_year,
        employees = employees.len(),
        success_count = result.success_count,
        failure_count = result.failure_count,
        cancelled = result.is_cancelled(),
        net_pay = %result.totals.net_pay,
        duration_ms = start_time.elapsed().as_millis(),
        "Payroll run finished"
    );

    Ok(result)
}

/// Pairs each employee with its slot, in input order.
fn assemble(employees: &[EmployeePayInput], slots: Vec<Option<PayslipResult>>) -> PayrollRunResult {
    let mut payslips = Vec::with_capacity(slots.len());
    let mut unprocessed = Vec::new();

    for (employee, slot) in employees.iter().zip(slots) {
        match slot {
            Some(payslip) => payslips.push(payslip),
            None => unprocessed.push(employee.employee_id.clone()),
        }
    }

    let status = if unprocessed.is_empty() {
        RunStatus::Completed
    } else {
        warn!(
            unprocessed = unprocessed.len(),
            "Payroll run stopped before every employee was processed"
        );
        RunStatus::Cancelled { unprocessed }
    };

    PayrollRunResult::from_payslips(payslips, status)
}

fn warn_on_duplicate_ids(employees: &[EmployeePayInput]) {
    let mut seen = HashSet::with_capacity(employees.len());
    for employee in employees {
        if !seen.insert(employee.employee_id.as_str()) {
            warn!(
                employee_id = %employee.employee_id,
                "Employee appears more than once in payroll run"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::compute_payslip;
    use crate::config::ConfigLoader;
    use crate::error::ErrorKind;
    use crate::models::{PayslipStatus, StudentLoanPlan};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::time::Duration;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn uk_config() -> RuleConfiguration {
        ConfigLoader::load_tax_year("./config", "2025-26")
            .unwrap()
            .into_config()
    }

    fn employee(id: &str, gross: &str, category: &str) -> EmployeePayInput {
        EmployeePayInput {
            employee_id: id.to_string(),
            gross_pay: dec(gross),
            tax_code: "1257L".to_string(),
            ni_category: Some(category.to_string()),
            student_loan_plan: None,
            union_member: false,
        }
    }

    fn five_employees() -> Vec<EmployeePayInput> {
        let mut with_loan = employee("emp_004", "3500.00", "A");
        with_loan.student_loan_plan = Some(StudentLoanPlan::Plan1);
        with_loan.union_member = true;

        vec![
            employee("emp_001", "2000.00", "A"),
            employee("emp_002", "3000.00", "A"),
            employee("emp_003", "2500.00", "Q"),
            with_loan,
            employee("emp_005", "5000.00", "C"),
        ]
    }

    /// BR-001: one bad employee among five
    #[test]
    fn test_failure_is_isolated() {
        let config = uk_config();
        let employees = five_employees();

        let result = run_payroll(&employees, &config).unwrap();

        assert_eq!(result.success_count, 4);
        assert_eq!(result.failure_count, 1);
        assert!(result.has_failures());
        assert_eq!(result.status, RunStatus::Completed);

        let failed = result.payslip("emp_003").unwrap();
        assert!(matches!(failed.status, PayslipStatus::Failed { .. }));

        for employee in employees.iter().filter(|e| e.employee_id != "emp_003") {
            assert_eq!(
                result.payslip(&employee.employee_id).unwrap(),
                &compute_payslip(employee, &config)
            );
        }
    }

    #[test]
    fn test_totals_exclude_failures() {
        let result = run_payroll(&five_employees(), &uk_config()).unwrap();

        assert_eq!(result.totals.gross_pay, dec("13500.00"));
        let net: Decimal = result
            .payslips
            .iter()
            .filter(|p| p.is_success())
            .map(|p| p.net_pay)
            .sum();
        assert_eq!(result.totals.net_pay, net);
    }

    #[test]
    fn test_oversized_gross_pay_fails_only_that_employee() {
        let mut huge = employee("emp_huge", "0", "A");
        huge.gross_pay = Decimal::MAX;
        huge.tax_code = "K100".to_string();
        let employees = vec![huge, employee("emp_ok", "3000.00", "A")];

        let result = run_payroll(&employees, &uk_config()).unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 1);
        assert!(matches!(
            result.payslip("emp_huge").unwrap().status,
            PayslipStatus::Failed { kind: ErrorKind::Validation, .. }
        ));
        assert_eq!(result.totals.gross_pay, dec("3000.00"));
    }

    #[test]
    fn test_large_gross_pays_do_not_overflow_totals() {
        let mut first = employee("emp_a", "0", "A");
        first.gross_pay = dec("50000000000000000000000000000");
        let mut second = first.clone();
        second.employee_id = "emp_b".to_string();

        let result = run_payroll(&[first, second], &uk_config()).unwrap();

        assert_eq!(result.failure_count, 2);
        assert_eq!(result.totals.gross_pay, Decimal::ZERO);
    }

    #[test]
    fn test_output_order_matches_input_order() {
        let employees: Vec<EmployeePayInput> = (0..200)
            .map(|i| employee(&format!("emp_{:03}", i), "2400.00", "A"))
            .collect();

        let result = run_payroll(&employees, &uk_config()).unwrap();

        let ids: Vec<&str> = result.payslips.iter().map(|p| p.employee_id.as_str()).collect();
        let expected: Vec<&str> = employees.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_parallel_and_sequential_runs_agree() {
        let config = uk_config();
        let employees = five_employees();

        let sequential = run_payroll_with_options(
            &employees,
            &config,
            &RunOptions {
                parallelism: Parallelism::Sequential,
                ..RunOptions::default()
            },
        )
        .unwrap();
        let pooled = run_payroll_with_options(
            &employees,
            &config,
            &RunOptions {
                parallelism: Parallelism::Threads(2),
                ..RunOptions::default()
            },
        )
        .unwrap();
        let global = run_payroll(&employees, &config).unwrap();

        assert_eq!(sequential, pooled);
        assert_eq!(sequential, global);
    }

    #[test]
    fn test_cancelled_before_start_processes_nobody() {
        let token = CancellationToken::new();
        token.cancel();

        let result = run_payroll_with_options(
            &five_employees(),
            &uk_config(),
            &RunOptions {
                cancellation: Some(token),
                ..RunOptions::default()
            },
        )
        .unwrap();

        assert!(result.payslips.is_empty());
        assert_eq!(result.totals.net_pay, Decimal::ZERO);
        match result.status {
            RunStatus::Cancelled { unprocessed } => assert_eq!(unprocessed.len(), 5),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_deadline_stops_dispatch() {
        let deadline = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);

        let result = run_payroll_with_options(
            &five_employees(),
            &uk_config(),
            &RunOptions {
                parallelism: Parallelism::Sequential,
                deadline: Some(deadline),
                ..RunOptions::default()
            },
        )
        .unwrap();

        assert!(result.is_cancelled());
        assert_eq!(result.success_count, 0);
    }

    #[test]
    fn test_partial_run_keeps_completed_payslips_in_order() {
        let config = uk_config();
        let employees = five_employees();
        let slots = employees
            .iter()
            .enumerate()
            .map(|(i, e)| (i % 2 == 0).then(|| compute_payslip(e, &config)))
            .collect();

        let result = assemble(&employees, slots);

        let ids: Vec<&str> = result.payslips.iter().map(|p| p.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_001", "emp_003", "emp_005"]);
        assert_eq!(
            result.status,
            RunStatus::Cancelled {
                unprocessed: vec!["emp_002".to_string(), "emp_004".to_string()]
            }
        );
    }

    #[test]
    fn test_empty_run_completes() {
        let result = run_payroll(&[], &uk_config()).unwrap();
        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.success_count, 0);
    }
}
