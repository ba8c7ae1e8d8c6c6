//! Ordered execution of named async steps.

use crate::error::{ScenarioError, ScenarioResult};
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    /// The step's error message.
    Failed(String),
    /// Not run because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// Outcome of a whole scenario, one entry per registered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// Whether every step passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.outcome == StepOutcome::Passed)
    }

    /// Number of passed steps.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome == StepOutcome::Passed)
            .count()
    }

    /// The step the scenario stopped at.
    #[must_use]
    pub fn failure(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|step| matches!(step.outcome, StepOutcome::Failed(_)))
    }

    /// `Ok(self)` when every step passed.
    ///
    /// # Errors
    ///
    /// `ScenarioError::StepFailed` naming the first failing step.
    pub fn into_result(self) -> ScenarioResult<Self> {
        let Some(failed) = self.failure() else {
            return Ok(self);
        };
        let message = match &failed.outcome {
            StepOutcome::Failed(message) => message.clone(),
            _ => String::new(),
        };
        Err(ScenarioError::StepFailed {
            scenario: self.name.clone(),
            step: failed.name.clone(),
            message,
        })
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}/{} steps passed",
            self.name,
            self.passed(),
            self.steps.len()
        )?;
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Passed => writeln!(f, "  [pass] {}", step.name)?,
                StepOutcome::Failed(message) => writeln!(f, "  [FAIL] {}: {message}", step.name)?,
                StepOutcome::Skipped => writeln!(f, "  [skip] {}", step.name)?,
            }
        }
        Ok(())
    }
}

/// Named steps run strictly in registration order.
///
/// Steps are futures, so nothing runs before [`ScenarioRunner::run`]. The
/// first failing step stops the scenario; later steps are reported as
/// skipped.
pub struct ScenarioRunner<'a> {
    name: String,
    steps: Vec<(String, LocalBoxFuture<'a, ScenarioResult<()>>)>,
}

impl fmt::Debug for ScenarioRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<'a> ScenarioRunner<'a> {
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Registers a step.
    #[must_use]
    pub fn step<S, F>(mut self, name: S, step: F) -> Self
    where
        S: Into<String>,
        F: Future<Output = ScenarioResult<()>> + 'a,
    {
        self.steps.push((name.into(), step.boxed_local()));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order until one fails.
    pub async fn run(self) -> ScenarioReport {
        let scenario = self.name;
        let mut reports = Vec::with_capacity(self.steps.len());
        let mut failed = false;

        for (name, step) in self.steps {
            if failed {
                reports.push(StepReport {
                    name,
                    outcome: StepOutcome::Skipped,
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            let started = Instant::now();
            let result = step.await;
            let elapsed = started.elapsed();
            let outcome = match result {
                Ok(()) => {
                    info!(
                        target: "harness_scenario",
                        scenario = %scenario,
                        step = %name,
                        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                        "step passed"
                    );
                    StepOutcome::Passed
                }
                Err(err) => {
                    warn!(
                        target: "harness_scenario",
                        scenario = %scenario,
                        step = %name,
                        error = %err,
                        "step failed"
                    );
                    failed = true;
                    StepOutcome::Failed(err.to_string())
                }
            };
            reports.push(StepReport {
                name,
                outcome,
                elapsed,
            });
        }

        let report = ScenarioReport {
            name: scenario,
            steps: reports,
        };
        info!(
            target: "harness_scenario",
            scenario = %report.name,
            passed = report.passed(),
            total = report.steps.len(),
            "scenario finished"
        );
        report
    }
}
