//! HTTP API module for the payroll engine.
//!
//! Exposes single payslips, payroll runs and the single-employee deduction
//! lookups as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{EmployeePayRequest, PayrollRunRequest, StudentLoanRepaymentQuery};
pub use response::{
    ApiError, ApiErrorResponse, DeductionLookupResponse, PayrollRunResponse, PayslipResponse,
};
pub use state::AppState;
