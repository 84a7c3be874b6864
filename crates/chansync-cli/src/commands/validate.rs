//! Validate command implementation

use std::path::Path;

use colored::Colorize;

use chansync_meta::ChannelConfig;

use super::require_config;
use crate::error::Result;

/// Run the validate command
///
/// Loads and checks the channel config without contacting the server.
pub fn run_validate(config: &Path) -> Result<()> {
    require_config(config)?;
    let config = ChannelConfig::load(config)?;

    let private = config.channels.iter().filter(|c| c.private).count();
    let archived = config.channels.iter().filter(|c| c.archive).count();

    println!(
        "{} {} channel(s) defined ({} private, {} archived)",
        "OK".green().bold(),
        config.channels.len(),
        private,
        archived
    );
    Ok(())
}
