//! Application state for the payroll engine API.

use std::sync::Arc;

use crate::calculation::NegativeNetPayPolicy;
use crate::config::RuleConfiguration;
use crate::directory::EmployeeDirectory;

/// Shared application state.
///
/// Holds the rule configuration and the employee directory, both shared
/// read-only across handlers and payroll runs.
#[derive(Clone)]
pub struct AppState {
    config: Arc<RuleConfiguration>,
    directory: Arc<dyn EmployeeDirectory>,
    negative_net_pay: NegativeNetPayPolicy,
}

impl AppState {
    /// Creates the state with the default (rejecting) negative net pay policy.
    pub fn new<D: EmployeeDirectory + 'static>(config: RuleConfiguration, directory: D) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
            negative_net_pay: NegativeNetPayPolicy::default(),
        }
    }

    /// Sets the negative net pay policy used unless a request overrides it.
    pub fn with_negative_net_pay_policy(mut self, policy: NegativeNetPayPolicy) -> Self {
        self.negative_net_pay = policy;
        self
    }

    /// Returns the rule configuration.
    pub fn config(&self) -> &RuleConfiguration {
        &self.config
    }

    /// Returns a shared handle to the rule configuration.
    pub fn shared_config(&self) -> Arc<RuleConfiguration> {
        Arc::clone(&self.config)
    }

    /// Returns the employee directory.
    pub fn directory(&self) -> &dyn EmployeeDirectory {
        self.directory.as_ref()
    }

    /// Returns the server-wide negative net pay policy.
    pub fn negative_net_pay(&self) -> NegativeNetPayPolicy {
        self.negative_net_pay
    }
}
