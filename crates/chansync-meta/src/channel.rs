//! Channel configuration types
//!
//! The declarative document is a list of channels, each keyed by a unique
//! name:
//!
//! ```yaml
//! channels:
//!   - name: release-announcements
//!     display_name: Release Announcements
//!     team_id: 8ue3o3fi9tbwzrqh7bb7hebzbc
//!     private: false
//!     archive: false
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::ConfigStore;
use crate::{Error, Result};

/// Channel visibility on the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Open channel, anyone on the team can join.
    Public,
    /// Invite-only channel.
    Private,
}

impl Visibility {
    pub fn from_private(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "Public"),
            Visibility::Private => write!(f, "Private"),
        }
    }
}

/// A single channel, either as desired by the config file or as observed
/// on the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelSpec {
    /// Unique channel handle (URL slug)
    pub name: String,
    pub display_name: String,
    pub header: String,
    pub purpose: String,
    pub private: bool,
    /// Whether the channel should be archived (soft-deleted)
    #[serde(alias = "archived")]
    pub archive: bool,
    pub team_id: String,
    /// Server-assigned identifier; empty until the channel exists remotely
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel_id: String,
}

impl ChannelSpec {
    /// Create a public, unarchived channel with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_private(self.private)
    }
}

/// The decoded channel configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
}

impl ChannelConfig {
    pub fn new(channels: Vec<ChannelSpec>) -> Self {
        Self { channels }
    }

    /// Load a configuration file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or if
    /// [`ChannelConfig::validate`] rejects it.
    pub fn load(path: &Path) -> Result<Self> {
        let config: ChannelConfig = ConfigStore::new().load(path)?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            channels = config.channels.len(),
            "Loaded channel configuration"
        );
        Ok(config)
    }

    /// Pre-flight checks that must pass before any remote contact.
    ///
    /// Every channel needs a non-empty name, and names must be unique
    /// because the name is the key used to match remote channels.
    ///
    /// # Errors
    ///
    /// Returns the first empty or duplicate name found, in document order.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, channel) in self.channels.iter().enumerate() {
            if channel.name.trim().is_empty() {
                return Err(Error::EmptyChannelName {
                    position: index + 1,
                });
            }
            if !seen.insert(channel.name.as_str()) {
                return Err(Error::DuplicateChannel {
                    name: channel.name.clone(),
                });
            }
        }
        Ok(())
    }
}
