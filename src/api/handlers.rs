//! HTTP request handlers for the payroll engine API.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{RunOptions, run_payroll_with_options};
use crate::calculation::try_compute_payslip;
use crate::error::EngineError;
use crate::lookup;
use crate::models::EmployeePayInput;

use super::request::{EmployeePayRequest, PayrollRunRequest, StudentLoanRepaymentQuery};
use super::response::{
    ApiError, ApiErrorResponse, DeductionLookupResponse, PayrollRunResponse, PayslipResponse,
};
use super::state::AppState;

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payslips", post(payslip_handler))
        .route("/payroll-runs", post(payroll_run_handler))
        .route(
            "/employees/:employee_id/student-loan-repayment",
            get(student_loan_repayment_handler),
        )
        .route("/employees/:employee_id/union-fees", get(union_fees_handler))
        .with_state(state)
}

/// Handler for POST /payslips.
///
/// Computes one payslip. Any engine error is returned as an error response
/// rather than a `Failed` payslip.
async fn payslip_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeePayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payslip request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let input: EmployeePayInput = request.into();
    let config = state.config();

    let start_time = Instant::now();
    match try_compute_payslip(&input, config, state.negative_net_pay()) {
        Ok(payslip) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %payslip.employee_id,
                gross_pay = %payslip.gross_pay,
                net_pay = %payslip.net_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Payslip computed successfully"
            );
            json_response(
                StatusCode::OK,
                PayslipResponse {
                    calculation_id: correlation_id,
                    generated_at: Utc::now(),
                    engine_version: ENGINE_VERSION.to_string(),
                    tax_year: config.metadata().tax_year.clone(),
                    payslip,
                },
            )
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll-runs.
///
/// Runs payroll on tokio's blocking pool so the rayon fan-out does not stall
/// the async workers.
async fn payroll_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> Response {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, "Processing payroll run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(run_id, rejection),
    };

    let employees: Vec<EmployeePayInput> = match request.employees {
        Some(employees) => employees.into_iter().map(Into::into).collect(),
        None => state.directory().active_for_payroll(),
    };
    let options = RunOptions {
        negative_net_pay: request
            .negative_net_pay
            .unwrap_or_else(|| state.negative_net_pay()),
        ..RunOptions::default()
    };

    let config = state.shared_config();
    let tax_year = config.metadata().tax_year.clone();
    let employee_count = employees.len();

    let start_time = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        run_payroll_with_options(&employees, &config, &options)
    })
    .await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => return engine_error_response(run_id, err),
        Err(join_error) => {
            return engine_error_response(
                run_id,
                EngineError::WorkerPool {
                    message: join_error.to_string(),
                },
            );
        }
    };

    info!(
        run_id = %run_id,
        employees = employee_count,
        success_count = result.success_count,
        failure_count = result.failure_count,
        duration_ms = start_time.elapsed().as_millis(),
        "Payroll run completed"
    );

    json_response(
        StatusCode::OK,
        PayrollRunResponse {
            run_id,
            generated_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            tax_year,
            run: result,
        },
    )
}

/// Handler for GET /employees/{id}/student-loan-repayment?total_amount=...
async fn student_loan_repayment_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<StudentLoanRepaymentQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Invalid query string"
            );
            return ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::invalid_query(rejection.body_text()),
            )
            .into_response();
        }
    };

    match lookup::student_loan_repayment_amount(
        state.directory(),
        &employee_id,
        query.total_amount,
        state.config(),
    ) {
        Ok(amount) => json_response(
            StatusCode::OK,
            DeductionLookupResponse {
                employee_id,
                amount,
            },
        ),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/{id}/union-fees
async fn union_fees_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    match lookup::union_fees(state.directory(), &employee_id, state.config()) {
        Ok(amount) => json_response(
            StatusCode::OK,
            DeductionLookupResponse {
                employee_id,
                amount,
            },
        ),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        kind = ?err.kind(),
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}
