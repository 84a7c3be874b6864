//! Reconciliation pass
//!
//! Load the observed index, diff it against the configuration, report the
//! consistency errors, then describe and (unless simulating) perform every
//! operation in order.

use chansync_gateway::ChannelGateway;
use chansync_meta::ChannelConfig;

use crate::diff::diff;
use crate::error::Result;
use crate::index::ObservedIndex;
use crate::report::{
    APPLIED, ERRORS_HEADER, NOTHING_TO_DO, ReconcileReport, RunMode, Step, StepOutcome,
};

/// Options for a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Describe operations without performing them
    pub simulate_only: bool,
    /// Leave the platform's default channels out of the observed state
    pub ignore_default_channels: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            simulate_only: true,
            ignore_default_channels: true,
        }
    }
}

impl RunOptions {
    pub fn execute() -> Self {
        Self {
            simulate_only: false,
            ..Self::default()
        }
    }
}

/// Runs reconciliation passes against one gateway
pub struct Reconciler<'g> {
    gateway: &'g dyn ChannelGateway,
    config: ChannelConfig,
    index: ObservedIndex,
}

impl<'g> Reconciler<'g> {
    pub fn new(gateway: &'g dyn ChannelGateway, config: ChannelConfig) -> Self {
        Self {
            gateway,
            config,
            index: ObservedIndex::new(),
        }
    }

    /// Observed state as of the end of the last pass
    pub fn index(&self) -> &ObservedIndex {
        &self.index
    }

    /// Run one pass.
    ///
    /// Consistency errors force simulation. Failed operations are recorded
    /// in the report and do not stop the pass; use
    /// [`ReconcileReport::into_result`] to turn consistency errors into an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RemoteLoad`] if the remote state cannot be
    /// fetched. No operation is described or performed in that case.
    pub fn reconcile(&mut self, options: RunOptions) -> Result<ReconcileReport> {
        tracing::debug!(
            gateway = self.gateway.name(),
            simulate_only = options.simulate_only,
            ignore_default_channels = options.ignore_default_channels,
            "Starting reconciliation pass"
        );

        self.index = ObservedIndex::load(self.gateway, options.ignore_default_channels)?;
        tracing::debug!(observed = self.index.len(), "Loaded observed channels");

        let plan = diff(&self.config.channels, &self.index);
        let requested = RunMode::from_simulate(options.simulate_only);
        let mut report = ReconcileReport::new(requested, plan.errors);

        if !report.errors.is_empty() {
            tracing::info!("{}", ERRORS_HEADER);
            for (i, error) in report.errors.iter().enumerate() {
                tracing::info!("Error {}: {}.", i + 1, error);
            }
        }

        tracing::info!("{}", report.banner());

        let execute = report.effective_mode == RunMode::Execute;
        for (i, operation) in plan.operations.iter().enumerate() {
            let description = operation.describe();
            tracing::info!("Step {}: {}.", i + 1, description);

            let outcome = if execute {
                match operation.perform(self.gateway, &mut self.index) {
                    Ok(()) => {
                        tracing::info!("{}", APPLIED);
                        StepOutcome::Applied
                    }
                    Err(e) => {
                        tracing::error!("Failed: {}.", e);
                        StepOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            } else {
                StepOutcome::Planned
            };

            report.steps.push(Step {
                index: i + 1,
                kind: operation.kind(),
                channel: operation.channel_name().to_string(),
                description,
                outcome,
            });
        }

        if report.steps.is_empty() {
            tracing::info!("{}", NOTHING_TO_DO);
        }

        Ok(report)
    }
}
