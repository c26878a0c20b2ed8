//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll rule
//! sets from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    NationalInsuranceRules, RuleConfiguration, RuleSetMetadata, StudentLoanRules, TaxRules,
    UnionFeeSchedule,
};

/// Loads and provides access to a payroll rule set.
///
/// # Directory Structure
///
/// Each tax year lives in its own directory:
/// ```text
/// config/2025-26/
/// ├── ruleset.yaml             # Tax year, pay frequency, effective dates
/// ├── income_tax.yaml          # Tax bands
/// ├── national_insurance.yaml  # NI categories
/// ├── student_loans.yaml       # Plan thresholds and rates
/// └── union_fees.yaml          # Flat or tiered fee schedule
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load_tax_year("./config", "2025-26").unwrap();
/// println!("Loaded rule set: {}", loader.config().metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: RuleConfiguration,
}

impl ConfigLoader {
    /// Loads and validates the rule set in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The rules are inconsistent (`InvalidConfiguration`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<RuleSetMetadata>(&path.join("ruleset.yaml"))?;
        let tax = Self::load_yaml::<TaxRules>(&path.join("income_tax.yaml"))?;
        let national_insurance =
            Self::load_yaml::<NationalInsuranceRules>(&path.join("national_insurance.yaml"))?;
        let student_loans = Self::load_yaml::<StudentLoanRules>(&path.join("student_loans.yaml"))?;
        let union_fees = Self::load_yaml::<UnionFeeSchedule>(&path.join("union_fees.yaml"))?;

        let config =
            RuleConfiguration::new(metadata, tax, national_insurance, student_loans, union_fees)?;

        info!(
            tax_year = %config.metadata().tax_year,
            path = %path.display(),
            tax_bands = config.tax().bands.len(),
            ni_categories = config.national_insurance().categories.len(),
            "Loaded payroll rule set"
        );

        Ok(Self { config })
    }

    /// Loads the rule set for a tax year from `root/<tax_year>`.
    pub fn load_tax_year<P: AsRef<Path>>(root: P, tax_year: &str) -> EngineResult<Self> {
        let loader = Self::load(root.as_ref().join(tax_year))?;

        let declared = &loader.config.metadata().tax_year;
        if declared != tax_year {
            return Err(EngineError::invalid_config(
                "ruleset",
                format!(
                    "directory '{}' declares tax year '{}'",
                    tax_year, declared
                ),
            ));
        }

        Ok(loader)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the validated rule configuration.
    pub fn config(&self) -> &RuleConfiguration {
        &self.config
    }

    /// Consumes the loader, returning the rule configuration.
    pub fn into_config(self) -> RuleConfiguration {
        self.config
    }
}
