//! Error types for the payroll engine.
//!
//! Every failure is classified into one of three [`ErrorKind`]s so that the
//! payslip orchestrator can turn it into a `Failed` payslip without losing the
//! distinction between bad employee data, bad rules, and broken invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing employee attribute.
    Validation,
    /// Rule configuration is inconsistent or lacks an entry the employee needs.
    Configuration,
    /// A derived figure violated an invariant.
    Computation,
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::UnknownNiCategory {
///     code: "Q".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown National Insurance category: Q");
/// assert_eq!(error.kind(), ErrorKind::Configuration);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A section of the rule configuration is internally inconsistent.
    #[error("Invalid {section} configuration: {message}")]
    InvalidConfiguration {
        /// The configuration section (e.g. "income_tax").
        section: String,
        /// What is wrong with it.
        message: String,
    },

    /// The employee's NI category has no threshold record.
    #[error("Unknown National Insurance category: {code}")]
    UnknownNiCategory {
        /// The category code that was not found.
        code: String,
    },

    /// The employee's student-loan plan has no threshold record.
    #[error("No student loan threshold configured for {plan}")]
    UnknownStudentLoanPlan {
        /// The plan that was not found.
        plan: String,
    },

    /// A flat-rate tax code refers to a band the rule set does not define.
    #[error("Tax code '{code}' requires tax band {band_index}, which is not configured")]
    TaxBandNotConfigured {
        /// The tax code.
        code: String,
        /// Zero-based index of the missing band.
        band_index: usize,
    },

    /// The tax code could not be parsed.
    #[error("Invalid tax code '{code}': {message}")]
    InvalidTaxCode {
        /// The raw tax code.
        code: String,
        /// Why it was rejected.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}' field '{field}': {message}")]
    InvalidEmployee {
        /// The employee the record belongs to.
        employee_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The employee directory has no record for the identifier.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The identifier that was looked up.
        employee_id: String,
    },

    /// Deductions exceed gross pay.
    #[error("Net pay for employee '{employee_id}' would be negative: {net_pay}")]
    NegativeNetPay {
        /// The employee concerned.
        employee_id: String,
        /// The would-be net pay.
        net_pay: Decimal,
    },

    /// An intermediate figure fell outside the decimal range.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The worker pool for a payroll run could not be created.
    #[error("Failed to start payroll worker pool: {message}")]
    WorkerPool {
        /// The underlying failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidTaxCode { .. }
            | EngineError::InvalidEmployee { .. }
            | EngineError::EmployeeNotFound { .. } => ErrorKind::Validation,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfiguration { .. }
            | EngineError::UnknownNiCategory { .. }
            | EngineError::UnknownStudentLoanPlan { .. }
            | EngineError::TaxBandNotConfigured { .. } => ErrorKind::Configuration,
            EngineError::NegativeNetPay { .. }
            | EngineError::CalculationError { .. }
            | EngineError::WorkerPool { .. } => ErrorKind::Computation,
        }
    }

    pub(crate) fn invalid_config(section: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            section: section.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
