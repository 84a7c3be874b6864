//! Command implementations for chansync-cli

pub mod completions;
pub mod reconcile;
pub mod validate;

use std::path::Path;

use crate::error::{CliError, Result};

pub use completions::run_completions;
pub use reconcile::run_pass;
pub use validate::run_validate;

/// Fail early with a readable message when the config file is missing
fn require_config(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CliError::user(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(())
}
