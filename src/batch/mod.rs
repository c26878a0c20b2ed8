//! Payroll runs over many employees.
//!
//! The runner validates the rule configuration once, computes every payslip
//! (in parallel by default) and aggregates the run report.

mod cancellation;
mod runner;

pub use cancellation::CancellationToken;
pub use runner::{Parallelism, RunOptions, run_payroll, run_payroll_with_options};
