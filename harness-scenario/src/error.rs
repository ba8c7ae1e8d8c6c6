//! Scenario errors.

use harness_config::ConfigError;
use harness_sdk::SdkError;
use thiserror::Error;

/// Why a step or a scenario setup failed.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// A check did not hold.
    #[error("{context}: expected {expected}, got {actual}")]
    Assertion {
        /// What was being checked.
        context: String,
        /// Expected outcome, rendered.
        expected: String,
        /// Observed outcome, rendered.
        actual: String,
    },

    /// A scenario stopped at a failing step.
    #[error("Scenario '{scenario}' failed at step '{step}': {message}")]
    StepFailed {
        /// Scenario name.
        scenario: String,
        /// First failing step.
        step: String,
        /// Failure message of that step.
        message: String,
    },

    /// An SDK operation failed unexpectedly.
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// Configuration could not produce the actors.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScenarioError {
    /// Create an assertion failure.
    pub fn assertion<C, E, A>(context: C, expected: E, actual: A) -> Self
    where
        C: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self::Assertion {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type for scenario steps.
pub type ScenarioResult<T> = std::result::Result<T, ScenarioError>;
