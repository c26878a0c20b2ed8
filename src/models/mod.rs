//! Core data models for the payroll engine.
//!
//! This module contains the employee input, tax code, payslip and payroll run
//! types used throughout the engine.

mod employee;
mod payroll_run;
mod payslip;
mod tax_code;

pub use employee::{EmployeePayInput, MAX_GROSS_PAY_PENCE, StudentLoanPlan, ValidatedPayInput};
pub use payroll_run::{PayrollRunResult, RunStatus, RunTotals};
pub use payslip::{AuditStep, AuditTrace, AuditWarning, PayslipResult, PayslipStatus};
pub use tax_code::{TaxCode, TaxCodeBasis};
