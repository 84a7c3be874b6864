//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// chansync - Keep chat server channels in line with a config file
#[derive(Parser, Debug)]
#[command(name = "chansync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what a reconciliation pass would change, without changing it
    Plan(PassArgs),

    /// Reconcile the server's channels with the config file
    ///
    /// Nothing is applied if the server has channels the config file does
    /// not mention; the pass is then reported as a plan.
    Apply(PassArgs),

    /// Check a channel config file without contacting the server
    Validate {
        /// Channel config file (.yaml, .yml, .json or .toml)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   chansync completions bash > ~/.local/share/bash-completion/completions/chansync
    ///   chansync completions zsh > ~/.zfunc/_chansync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by `plan` and `apply`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PassArgs {
    /// Channel config file (.yaml, .yml, .json or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Server credentials file
    #[arg(short, long, env = "CHANSYNC_AUTH", default_value = "auth.json")]
    pub auth: PathBuf,

    /// Treat town-square and off-topic like any other channel
    #[arg(long)]
    pub include_default_channels: bool,

    /// Output the report as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Allow TLS 1.0 and 1.1 when talking to the server
    #[arg(long)]
    pub insecure_tls_version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plan_defaults() {
        let cli = Cli::parse_from(["chansync", "plan", "--config", "channels.yaml"]);
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.config, PathBuf::from("channels.yaml"));
                assert!(!args.include_default_channels);
                assert!(!args.json);
                assert!(!args.insecure_tls_version);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parse_apply_with_flags() {
        let cli = Cli::parse_from([
            "chansync",
            "-v",
            "apply",
            "-c",
            "channels.toml",
            "--auth",
            "creds.json",
            "--include-default-channels",
            "--json",
            "--insecure-tls-version",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.auth, PathBuf::from("creds.json"));
                assert!(args.include_default_channels);
                assert!(args.json);
                assert!(args.insecure_tls_version);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::parse_from(["chansync", "validate", "--config", "c.json"]);
        assert_eq!(
            cli.command,
            Commands::Validate {
                config: PathBuf::from("c.json")
            }
        );
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["chansync", "completions", "bash"]);
        assert!(matches!(cli.command, Commands::Completions { .. }));
    }

    #[test]
    fn plan_requires_config() {
        assert!(Cli::try_parse_from(["chansync", "plan"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
