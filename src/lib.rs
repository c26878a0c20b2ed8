//! Payroll Computation Engine for UK PAYE deductions
//!
//! This crate computes income tax, National Insurance, student loan
//! repayments, union fees and net pay for one employee or a whole payroll run,
//! from a versioned rule set loaded per tax year. Every figure carries an
//! audit trace explaining how it was derived.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod directory;
pub mod error;
pub mod lookup;
pub mod models;
