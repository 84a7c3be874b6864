//! Observed remote state, indexed by channel name

use std::collections::BTreeMap;

use chansync_gateway::ChannelGateway;
use chansync_meta::ChannelSpec;

use crate::{Error, Result};

/// Number of channels requested per listing page.
pub const PAGE_SIZE: u32 = 50;

/// Channels every team gets from the platform, skipped when asked to.
pub const DEFAULT_CHANNELS: [&str; 2] = ["town-square", "off-topic"];

pub fn is_default_channel(name: &str) -> bool {
    DEFAULT_CHANNELS.contains(&name)
}

/// Snapshot of remote channels keyed by name.
///
/// Loaded once per pass. Afterwards only successful `create` and
/// `update-metadata` operations write to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedIndex {
    by_name: BTreeMap<String, ChannelSpec>,
}

impl ObservedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page through every channel on the server, archived ones included.
    ///
    /// Stops at the first empty page. Any failed page aborts the load and
    /// nothing fetched so far is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteLoad`] with the page that failed.
    pub fn load(gateway: &dyn ChannelGateway, ignore_default_channels: bool) -> Result<Self> {
        let mut index = Self::new();
        let mut page = 0u32;

        loop {
            let channels = gateway
                .list_channels(page, PAGE_SIZE, true)
                .map_err(|source| Error::RemoteLoad { page, source })?;
            if channels.is_empty() {
                break;
            }
            tracing::debug!(page, count = channels.len(), "Fetched channel page");

            for channel in &channels {
                if ignore_default_channels && is_default_channel(&channel.name) {
                    tracing::debug!(name = %channel.name, "Skipping default channel");
                    continue;
                }
                if index.insert(channel.to_spec()).is_some() {
                    tracing::warn!(
                        name = %channel.name,
                        "Channel name observed more than once, keeping the last record"
                    );
                }
            }
            page += 1;
        }

        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<&ChannelSpec> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Insert keyed by the channel's own name, returning any replaced entry.
    pub fn insert(&mut self, channel: ChannelSpec) -> Option<ChannelSpec> {
        self.by_name.insert(channel.name.clone(), channel)
    }

    /// Insert under an explicit key.
    pub fn insert_as(&mut self, name: impl Into<String>, channel: ChannelSpec) {
        self.by_name.insert(name.into(), channel);
    }

    /// Replace the entry stored under `old_name`, moving it if the channel
    /// was renamed.
    pub fn replace(&mut self, old_name: &str, channel: ChannelSpec) {
        if old_name != channel.name {
            self.by_name.remove(old_name);
        }
        self.by_name.insert(channel.name.clone(), channel);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Channel names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

impl FromIterator<ChannelSpec> for ObservedIndex {
    fn from_iter<I: IntoIterator<Item = ChannelSpec>>(iter: I) -> Self {
        let mut index = Self::new();
        for channel in iter {
            index.insert(channel);
        }
        index
    }
}
