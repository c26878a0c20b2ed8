//! Rule configuration for the payroll engine.
//!
//! This module loads the statutory parameters of one tax year (tax bands, NI
//! thresholds, student-loan plans and the union fee schedule) from YAML files
//! and validates them into an immutable [`RuleConfiguration`].
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load_tax_year("./config", "2025-26").unwrap();
//! println!("Loaded rules for {}", loader.config().metadata().tax_year);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    NationalInsuranceRules, NiCategoryRates, PayFrequency, RepaymentRounding, RuleConfiguration,
    RuleSetMetadata, StudentLoanPlanRule, StudentLoanRules, TaxBand, TaxRules, ThresholdBasis,
    UnionFeeSchedule, UnionFeeTier,
};
