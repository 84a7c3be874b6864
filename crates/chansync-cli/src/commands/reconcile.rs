//! Plan and apply command implementations
//!
//! Both run one reconciliation pass against the server; `plan` only
//! describes the operations, `apply` performs them.

use colored::Colorize;

use chansync_core::{ReconcileReport, Reconciler, RunMode, RunOptions, Step, StepOutcome};
use chansync_gateway::{ClientOptions, MattermostClient};
use chansync_meta::{AuthConfig, ChannelConfig};

use super::require_config;
use crate::cli::PassArgs;
use crate::error::Result;

/// Run a reconciliation pass
///
/// Consistency errors fail the command after the report is printed.
/// Failed operations are reported but do not.
pub fn run_pass(args: &PassArgs, simulate_only: bool) -> Result<()> {
    require_config(&args.config)?;
    let config = ChannelConfig::load(&args.config)?;
    let auth = AuthConfig::resolve(&args.auth)?;

    let options = ClientOptions {
        allow_insecure_tls: args.insecure_tls_version,
        ..ClientOptions::default()
    };
    let client = MattermostClient::new(&auth, options)?;
    let version = client.connect()?;
    tracing::debug!(url = %auth.instance_url, version = %version, "Connected");

    if !args.json {
        println!(
            "{} Reconciling {} channel(s) against {} (server {})",
            "=>".blue().bold(),
            config.channels.len(),
            auth.instance_url.cyan(),
            version
        );
    }

    let mut reconciler = Reconciler::new(&client, config);
    let report = reconciler.reconcile(RunOptions {
        simulate_only,
        ignore_default_channels: !args.include_default_channels,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    report.into_result()?;
    Ok(())
}

/// Print human-readable report output
fn print_report(report: &ReconcileReport) {
    if !report.errors.is_empty() {
        println!(
            "{} This configuration cannot be applied against the current reality:",
            "ERRORS".red().bold()
        );
        for (i, error) in report.errors.iter().enumerate() {
            println!("   {} Error {}: {}.", "!".red(), i + 1, error);
        }
        println!();
    }

    let banner = match report.effective_mode {
        RunMode::Simulate => report.banner().yellow(),
        RunMode::Execute => report.banner().green(),
    };
    println!("{}", banner);

    if report.is_noop() {
        println!("{} Nothing to do.", "OK".green().bold());
        return;
    }

    for step in &report.steps {
        print_step(step);
    }

    let failed = report.failed_steps().count();
    if failed > 0 {
        println!();
        println!(
            "{} {} of {} step(s) failed",
            "FAILED".red().bold(),
            failed,
            report.steps.len()
        );
    }
}

fn print_step(step: &Step) {
    let marker = match &step.outcome {
        StepOutcome::Planned => "~".yellow(),
        StepOutcome::Applied => "+".green(),
        StepOutcome::Failed { .. } => "x".red(),
    };
    println!(
        "   {} Step {}: {}. {}",
        marker,
        step.index,
        step.description,
        format!("({})", step.kind).dimmed()
    );
    if let StepOutcome::Failed { error } = &step.outcome {
        println!("     {} {}.", "Failed:".red(), error);
    }
}
