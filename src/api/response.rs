//! Response types for the payroll engine API.
//!
//! Successful responses wrap engine results in an envelope carrying a
//! correlation id, timestamp, engine version and tax year. Engine errors map
//! to an [`ApiError`] body and a status code chosen by error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, ErrorKind};
use crate::models::{PayrollRunResult, PayslipResult};

/// Envelope returned by `POST /payslips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipResponse {
    /// Correlation id for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub generated_at: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Tax year of the rule set used.
    pub tax_year: String,
    /// The computed payslip.
    pub payslip: PayslipResult,
}

/// Envelope returned by `POST /payroll-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunResponse {
    /// Correlation id for this run.
    pub run_id: Uuid,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Tax year of the rule set used.
    pub tax_year: String,
    /// The run report.
    pub run: PayrollRunResult,
}

/// Body returned by the single-employee lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionLookupResponse {
    /// The employee looked up.
    pub employee_id: String,
    /// The deduction amount.
    pub amount: Decimal,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Taxonomy bucket of an engine error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: None,
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a malformed query string error response.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new("INVALID_QUERY", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status code.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let kind = error.kind();
        let (status, code) = match &error {
            EngineError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            EngineError::InvalidTaxCode { .. } => (StatusCode::BAD_REQUEST, "INVALID_TAX_CODE"),
            EngineError::InvalidEmployee { .. } => (StatusCode::BAD_REQUEST, "INVALID_EMPLOYEE"),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            EngineError::UnknownNiCategory { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_NI_CATEGORY")
            }
            EngineError::UnknownStudentLoanPlan { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_STUDENT_LOAN_PLAN")
            }
            EngineError::TaxBandNotConfigured { .. } | EngineError::InvalidConfiguration { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CONFIGURATION_ERROR")
            }
            EngineError::NegativeNetPay { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NEGATIVE_NET_PAY")
            }
            EngineError::CalculationError { .. } | EngineError::WorkerPool { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CALCULATION_ERROR")
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                code: code.to_string(),
                message: error.to_string(),
                kind: Some(kind),
            },
        }
    }
}
