//! Report types for a reconciliation pass

use std::fmt;

use serde::Serialize;

use crate::diff::ConsistencyError;
use crate::error::{Error, Result};
use crate::operation::OperationKind;

pub const ERRORS_HEADER: &str = "This configuration cannot be applied against the current reality:";
pub const FORCED_SIMULATION_BANNER: &str =
    "We will not execute anything due to errors, but this what we would've done:";
pub const SIMULATION_BANNER: &str =
    "In dry run mode so taking no action, but this is what we would've done:";
pub const EXECUTION_BANNER: &str = "Applying changes:";
pub const NOTHING_TO_DO: &str = "Nothing to do.";
pub const APPLIED: &str = "Applied.";

/// Whether operations are performed or only described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Simulate,
    Execute,
}

impl RunMode {
    pub fn from_simulate(simulate_only: bool) -> Self {
        if simulate_only {
            RunMode::Simulate
        } else {
            RunMode::Execute
        }
    }

    pub fn is_simulate(self) -> bool {
        self == RunMode::Simulate
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Simulate => f.write_str("simulate"),
            RunMode::Execute => f.write_str("execute"),
        }
    }
}

/// What happened to a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    /// Described only
    Planned,
    /// Performed successfully
    Applied,
    /// Performed and failed; later steps still ran
    Failed { error: String },
}

/// One operation of the pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// 1-based position in the plan
    pub index: usize,
    pub kind: OperationKind,
    pub channel: String,
    pub description: String,
    pub outcome: StepOutcome,
}

impl Step {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }
}

/// Overall status of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    /// No consistency errors and every performed step succeeded
    Clean,
    /// Some performed steps failed
    ExecutionFailures,
    /// Remote channels are missing from the configuration
    ConfigurationErrors,
}

/// Report from one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub requested_mode: RunMode,
    /// Forced to [`RunMode::Simulate`] when there are consistency errors
    pub effective_mode: RunMode,
    pub errors: Vec<ConsistencyError>,
    pub steps: Vec<Step>,
}

impl ReconcileReport {
    pub fn new(requested_mode: RunMode, errors: Vec<ConsistencyError>) -> Self {
        let effective_mode = if errors.is_empty() {
            requested_mode
        } else {
            RunMode::Simulate
        };
        Self {
            requested_mode,
            effective_mode,
            errors,
            steps: Vec::new(),
        }
    }

    pub fn status(&self) -> ReportStatus {
        if !self.errors.is_empty() {
            ReportStatus::ConfigurationErrors
        } else if self.steps.iter().any(Step::is_failed) {
            ReportStatus::ExecutionFailures
        } else {
            ReportStatus::Clean
        }
    }

    /// Execution was requested but the consistency errors prevented it
    pub fn is_forced_simulation(&self) -> bool {
        self.requested_mode != self.effective_mode
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.is_failed())
    }

    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Mode banner preceding the steps
    pub fn banner(&self) -> &'static str {
        if self.is_forced_simulation() {
            FORCED_SIMULATION_BANNER
        } else if self.effective_mode.is_simulate() {
            SIMULATION_BANNER
        } else {
            EXECUTION_BANNER
        }
    }

    /// Plain-text rendering, one entry per log line
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push(ERRORS_HEADER.to_string());
            for (i, error) in self.errors.iter().enumerate() {
                lines.push(format!("Error {}: {}.", i + 1, error));
            }
        }

        lines.push(self.banner().to_string());

        for step in &self.steps {
            lines.push(format!("Step {}: {}.", step.index, step.description));
            match &step.outcome {
                StepOutcome::Planned => {}
                StepOutcome::Applied => lines.push(APPLIED.to_string()),
                StepOutcome::Failed { error } => lines.push(format!("Failed: {}.", error)),
            }
        }

        if self.steps.is_empty() {
            lines.push(NOTHING_TO_DO.to_string());
        }

        lines
    }

    /// Turn consistency errors into an error; execution failures pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConsistencyErrors`] when the status is
    /// [`ReportStatus::ConfigurationErrors`].
    pub fn into_result(self) -> Result<Self> {
        match self.status() {
            ReportStatus::ConfigurationErrors => Err(Error::ConsistencyErrors {
                count: self.errors.len(),
            }),
            ReportStatus::Clean | ReportStatus::ExecutionFailures => Ok(self),
        }
    }
}
